pub mod sources;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    config::GameConfig,
    map::{Grid, roll_chance},
};

pub use sources::{LightSource, LightSources};

/// How contributions from overlapping sources combine on one cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightBlend {
    /// Brightest source wins; overlapping lights never stack.
    #[default]
    Max,
    Sum,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightingParams {
    pub ambient_radius: i32,
    pub torch_radius: i32,
    pub flicker_chance: f32,
    pub blend: LightBlend,
}

impl LightingParams {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            ambient_radius: config.ambient_radius,
            torch_radius: config.torch_radius,
            flicker_chance: config.flicker_chance,
            blend: config.light_blend,
        }
    }

    fn radius_of(&self, source: &LightSource) -> i32 {
        match source {
            LightSource::PlayerAmbient => self.ambient_radius,
            LightSource::Placed(_) => self.torch_radius,
        }
    }
}

/// What is lit this turn and how brightly. Rebuilt from scratch every turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityField {
    width: i32,
    height: i32,
    lit: Vec<bool>,
    intensity: Vec<u32>,
}

impl VisibilityField {
    pub fn dark(width: i32, height: i32) -> Self {
        let size = (width * height).max(0) as usize;
        Self {
            width,
            height,
            lit: vec![false; size],
            intensity: vec![0; size],
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn is_lit(&self, point: Point) -> bool {
        self.idx(point).is_some_and(|idx| self.lit[idx])
    }

    pub fn intensity_at(&self, point: Point) -> u32 {
        self.idx(point).map_or(0, |idx| self.intensity[idx])
    }

    pub fn lit_count(&self) -> usize {
        self.lit.iter().filter(|lit| **lit).count()
    }
}

/// Cells that have been lit at least once. Only ever grows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryField {
    width: i32,
    height: i32,
    seen: Vec<bool>,
}

impl MemoryField {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            seen: vec![false; (width * height).max(0) as usize],
        }
    }

    pub fn ever_seen(&self, point: Point) -> bool {
        if point.x < 0 || point.x >= self.width || point.y < 0 || point.y >= self.height {
            return false;
        }
        self.seen[(point.y * self.width + point.x) as usize]
    }

    pub fn seen_count(&self) -> usize {
        self.seen.iter().filter(|seen| **seen).count()
    }

    fn absorb(&mut self, field: &VisibilityField) {
        for (seen, lit) in self.seen.iter_mut().zip(&field.lit) {
            *seen |= *lit;
        }
    }
}

/// Recomputes the light field once per turn. Owns the flicker RNG so that a
/// seeded run replays the same flicker.
pub struct LightingEngine {
    params: LightingParams,
    rng: RandomNumberGenerator,
}

impl LightingEngine {
    pub fn new(params: LightingParams, rng: RandomNumberGenerator) -> Self {
        Self { params, rng }
    }

    /// Lights every cell within Manhattan range of each active source and
    /// records the result in `memory`.
    ///
    /// Contribution is `radius - distance`, lowered by one on an independent
    /// flicker roll per (source, cell). No occlusion: walls do not block.
    pub fn recompute(
        &mut self,
        grid: &Grid,
        sources: &LightSources,
        player: Point,
        memory: &mut MemoryField,
    ) -> VisibilityField {
        let mut field = VisibilityField::dark(grid.width, grid.height);
        for source in sources.iter() {
            let center = match source {
                LightSource::PlayerAmbient => player,
                LightSource::Placed(point) => *point,
            };
            let radius = self.params.radius_of(source);
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let point = Point::new(center.x + dx, center.y + dy);
                    let Some(idx) = field.idx(point) else {
                        continue;
                    };
                    let distance = DistanceAlg::Manhattan.distance2d(center, point) as i32;
                    if distance > radius {
                        continue;
                    }
                    let mut contribution = (radius - distance).max(0) as u32;
                    if roll_chance(&mut self.rng, self.params.flicker_chance) {
                        contribution = contribution.saturating_sub(1);
                    }
                    field.lit[idx] = true;
                    field.intensity[idx] = match self.params.blend {
                        LightBlend::Max => field.intensity[idx].max(contribution),
                        LightBlend::Sum => field.intensity[idx] + contribution,
                    };
                }
            }
        }

        memory.absorb(&field);
        trace!(lit = field.lit_count(), seen = memory.seen_count(), "light recomputed");
        field
    }
}
