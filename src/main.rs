mod config;
mod data;
mod error;
mod game;
mod input;
mod lighting;
mod map;
mod render;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bracket_random::prelude::RandomNumberGenerator;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::GameConfig;
use game::GameState;
use input::{CancelToken, InputSource, ScriptedInput, TerminalInput};
use lighting::{LightingEngine, LightingParams};
use map::Dungeon;
use render::terminal::{TerminalGuard, TerminalSink};
use session::{Outcome, Session};

#[derive(Parser, Debug)]
#[command(name = "ashlight", version, about = "Find the keys by torchlight and escape")]
struct Cli {
    /// JSON config file. Unset fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the layout and the flicker.
    #[arg(long)]
    seed: Option<u64>,

    /// Size of the light pool.
    #[arg(long)]
    lights: Option<u32>,

    #[arg(long)]
    keys: Option<usize>,

    /// Replay key presses from a file instead of reading the keyboard.
    #[arg(long)]
    script: Option<PathBuf>,

    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = setup_logging(cli.log_dir.clone())?;

    let config = load_config(&cli)?;
    let seed = config
        .seed
        .unwrap_or_else(|| RandomNumberGenerator::new().next_u64());
    info!(seed, ?config, "starting run");

    let mut rng = RandomNumberGenerator::seeded(seed);
    let dungeon = Dungeon::generate(&config, &mut rng).context("failed to build a dungeon")?;
    let state = GameState::new(dungeon, config.light_count);
    // flicker gets its own stream so replays stay stable if placement changes
    let lighting = LightingEngine::new(
        LightingParams::from_config(&config),
        RandomNumberGenerator::seeded(seed.wrapping_add(1)),
    );

    let cancel = CancelToken::new();
    let outcome = match cli.script.as_deref() {
        Some(path) => {
            let script = ScriptedInput::from_file(path)?;
            info!(steps = script.remaining(), path = %path.display(), "replaying script");
            play(state, lighting, script, cancel, &config)?
        }
        None => {
            let _terminal = TerminalGuard::acquire().context("failed to enter raw mode")?;
            play(state, lighting, TerminalInput::new(), cancel, &config)?
        }
    };

    match outcome {
        Outcome::Escaped => {}
        Outcome::Quit => println!("{}", data::FAREWELL),
        Outcome::Interrupted => println!("{}", data::GAME_OVER),
    }
    Ok(())
}

fn play<I: InputSource>(
    state: GameState,
    lighting: LightingEngine,
    input: I,
    cancel: CancelToken,
    config: &GameConfig,
) -> Result<Outcome> {
    let mut session = Session::new(
        state,
        lighting,
        input,
        TerminalSink::new(),
        cancel,
        config.victory_delay(),
    );
    let outcome = session.run()?;
    info!(
        ?outcome,
        turns = session.turn(),
        keys = session.state().collected_count(),
        seen = session.memory().seen_count(),
        "run finished"
    );
    Ok(outcome)
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(lights) = cli.lights {
        config.light_count = lights;
    }
    if let Some(keys) = cli.keys {
        config.key_count = keys;
    }
    config.validate()?;
    Ok(config)
}

/// File-only logging; anything on stderr would tear the map.
fn setup_logging(log_dir: Option<PathBuf>) -> Result<WorkerGuard> {
    let log_dir = log_dir.unwrap_or_else(default_log_directory);
    let session_id = chrono::Local::now()
        .format("session_%Y%m%d_%H%M%S")
        .to_string();
    let session_log_dir = log_dir.join(&session_id);
    std::fs::create_dir_all(&session_log_dir)
        .with_context(|| format!("failed to create {}", session_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "ashlight.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    info!(session = %session_id, dir = %session_log_dir.display(), "logging initialized");
    Ok(guard)
}

fn default_log_directory() -> PathBuf {
    if let Some(xdg_cache) = std::env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache).join("ashlight").join("logs");
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".cache").join("ashlight").join("logs");
    }
    std::env::temp_dir().join("ashlight").join("logs")
}
