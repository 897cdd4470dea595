use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, ensure, Result};
use clap::Parser;
use simplelog::LevelFilter;

use crate::grid::{Grid, DEFAULT_GRID_SIZE};

const MIN_GRID_SIZE: i32 = 8;
const MAX_GRID_SIZE: i32 = 60;
const MIN_TICK_MS: u64 = 20;
const MAX_TICK_MS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(name = "snake")]
#[command(version, about = "Classic snake in the terminal")]
pub struct Cli {
    /// Board width and height in cells
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    pub size: i32,

    /// Milliseconds between game steps
    #[arg(long, default_value_t = 100)]
    pub tick_ms: u64,

    /// File the high score is kept in
    #[arg(long, default_value = ".snake_high_score.json")]
    pub high_score_file: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    pub no_save: bool,

    /// Seed for food placement (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use the terminal's own colours instead of the green palette
    #[arg(long)]
    pub mono: bool,

    /// Log file (the screen is taken by the game)
    #[arg(long, default_value = "snake.log")]
    pub log_file: PathBuf,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub grid: Grid,
    pub tick: Duration,
    pub high_score_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub mono: bool,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            grid: Grid::default(),
            tick: Duration::from_millis(100),
            high_score_file: None,
            seed: None,
            mono: false,
            log_file: PathBuf::from("snake.log"),
            log_level: LevelFilter::Info,
        }
    }
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        ensure!(
            (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&cli.size),
            "board size must be between {} and {}, got {}",
            MIN_GRID_SIZE,
            MAX_GRID_SIZE,
            cli.size
        );
        ensure!(
            (MIN_TICK_MS..=MAX_TICK_MS).contains(&cli.tick_ms),
            "tick must be between {} and {} ms, got {}",
            MIN_TICK_MS,
            MAX_TICK_MS,
            cli.tick_ms
        );

        let log_level = cli
            .log_level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("unknown log level {:?}", cli.log_level))?;

        Ok(Settings {
            grid: Grid::square(cli.size),
            tick: Duration::from_millis(cli.tick_ms),
            high_score_file: if cli.no_save { None } else { Some(cli.high_score_file) },
            seed: cli.seed,
            mono: cli.mono,
            log_file: cli.log_file,
            log_level,
        })
    }
}
