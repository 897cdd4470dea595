use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::{Config, WriteLogger};

use snake::config::{Cli, Settings};
use snake::game::GameSession;
use snake::input::{self, Command};
use snake::storage::{FileStore, HighScoreStore, MemoryStore};
use snake::term::{TermManager, Theme};

// How long to wait for a key when no game is running.
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let settings = Settings::from_cli(Cli::parse())?;

    // Set up logging before anything else; the terminal belongs to the game
    WriteLogger::init(
        settings.log_level,
        Config::default(),
        File::create(&settings.log_file)
            .with_context(|| format!("creating log file {}", settings.log_file.display()))?,
    )
    .context("initializing logger")?;
    info!("Starting snake with {:?}", settings);

    let store: Box<dyn HighScoreStore> = match &settings.high_score_file {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::default()),
    };
    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let theme = if settings.mono { Theme::mono() } else { Theme::lcd() };

    let mut term = TermManager::new(settings.grid, theme)?;
    if let Err(e) = term.setup() {
        // setup may fail after raw mode is already on
        let restored = term.restore();
        return finish(Err(e), restored);
    }

    let mut session = GameSession::new(&settings, term, store, rng);
    let result = session.show_title().and_then(|_| run(&mut session));
    info!("Bye, high score {}", session.high_score());

    // Always give the terminal back, even if the game loop failed
    let restored = session.frontend_mut().restore();
    finish(result, restored)
}

/// Logs both outcomes; the game's own error wins over a failed restore.
fn finish(result: Result<()>, restored: Result<()>) -> Result<()> {
    if let Err(e) = &result {
        error!("Exiting with error: {:#}", e);
    }
    if let Err(e) = &restored {
        error!("Could not restore the terminal: {:#}", e);
    }
    result.and(restored)
}

fn run(session: &mut GameSession<TermManager, StdRng>) -> Result<()> {
    loop {
        let timeout = session.time_until_tick(Instant::now()).unwrap_or(IDLE_POLL);

        if let Some(key) = input::poll_key(timeout)? {
            if input::is_quit(&key) {
                return Ok(());
            }
            if let Some(command) = Command::from_key(&key) {
                session.handle_command(command)?;
            }
        }

        session.poll_tick(Instant::now())?;
    }
}
