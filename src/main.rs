mod config;
mod game;
mod input;
mod render;
mod round;
mod snake;
mod term;

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{Config, WriteLogger};

use config::{CliArgs, Settings};
use game::{FrameClock, SessionController};
use term::{TermInput, TermManager};

pub type TermInt = u16;
pub type GridInt = i32;

fn main() -> Result<()> {
    let settings = Settings::from_args(CliArgs::parse()).context("invalid configuration")?;

    // The terminal belongs to the game, so logs go to a file
    if let Some(log_file) = open_log_file(&settings.log_file) {
        WriteLogger::init(settings.log_level, Config::default(), log_file).context("failed to initialize logger")?;
    }

    info!("Starting Wormy: {}x{} grid, {} fps, {} fps idle, seed {:?}",
          settings.grid.width, settings.grid.height, settings.fps, settings.start_fps, settings.seed);

    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let term = TermManager::begin(&settings).context("could not set up the terminal")?;
    let input = TermInput::new(term.reports_key_releases());

    // Dropping the session hands the terminal back, whichever way it ends
    let mut session = SessionController::new(settings, term, input, FrameClock::new(), rng);
    session.run().context("terminal I/O failed")?;

    info!("Quit");
    Ok(())
}

/// The log file, or `None` when it cannot be created. The game runs without
/// logging in that case.
fn open_log_file(path: &Path) -> Option<File> {
    match File::create(path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("wormy: logging disabled, could not create {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_log_directory_disables_logging() {
        let path = std::env::temp_dir().join("wormy-no-such-dir").join("wormy.log");
        assert!(open_log_file(&path).is_none());
    }

    #[test]
    fn log_file_is_created() {
        let path = std::env::temp_dir().join(format!("wormy-log-{}.log", std::process::id()));
        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
        fs::remove_file(&path).unwrap();
    }
}
