//! Game configuration.
use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, lighting::LightBlend};

/// Tunables for one run.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    /// Chance for each interior cell to become a wall.
    pub wall_density: f32,
    pub key_count: usize,
    /// Size of the shared light pool (player ember plus torches).
    pub light_count: u32,
    pub ambient_radius: i32,
    pub torch_radius: i32,
    /// Per (source, cell, turn) chance of losing one intensity step.
    pub flicker_chance: f32,
    pub light_blend: LightBlend,
    pub victory_delay_ms: u64,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 10,
            wall_density: 0.1,
            key_count: 3,
            light_count: 3,
            ambient_radius: 3,
            torch_radius: 3,
            flicker_chance: 0.2,
            light_blend: LightBlend::Max,
            victory_delay_ms: 1500,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 3 {
            return Err(invalid("width", format!("{} is below the minimum of 3", self.width)));
        }
        if self.height < 3 {
            return Err(invalid("height", format!("{} is below the minimum of 3", self.height)));
        }
        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(invalid("wall_density", format!("{} is outside [0, 1]", self.wall_density)));
        }
        if !(0.0..=1.0).contains(&self.flicker_chance) {
            return Err(invalid(
                "flicker_chance",
                format!("{} is outside [0, 1]", self.flicker_chance),
            ));
        }
        if self.key_count == 0 {
            return Err(invalid("key_count", "at least one key is required".to_string()));
        }
        if self.ambient_radius < 0 || self.torch_radius < 0 {
            return Err(invalid("radius", "light radii must not be negative".to_string()));
        }
        // player + keys + exit on distinct interior cells
        let interior = ((self.width - 2) * (self.height - 2)) as usize;
        let needed = self.key_count + 2;
        if needed > interior {
            return Err(invalid(
                "key_count",
                format!("{needed} distinct cells needed but the interior holds {interior}"),
            ));
        }
        Ok(())
    }

    pub fn victory_delay(&self) -> Duration {
        Duration::from_millis(self.victory_delay_ms)
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.light_count, 3);
        assert_eq!(config.ambient_radius, config.torch_radius);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "light_count": 0, "seed": 7, "light_blend": "sum" }}"#).unwrap();

        let config = GameConfig::from_file(file.path()).unwrap();
        assert_eq!(config.light_count, 0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.light_blend, LightBlend::Sum);
        assert_eq!(config.width, 20);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "torches": 4 }}"#).unwrap();
        assert!(matches!(
            GameConfig::from_file(file.path()),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = GameConfig::from_file("/nonexistent/ashlight.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ashlight.json"));
    }

    #[test]
    fn test_validate_rejects_crowded_grid() {
        let config = GameConfig {
            width: 3,
            height: 3,
            key_count: 1,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "key_count", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_probabilities() {
        let config = GameConfig {
            flicker_chance: 1.5,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            wall_density: -0.1,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
