//! scrabbot - a crossword tile game against a virtual player in the terminal
//!
//! Type `!place h8h word` to play, `!help` for the rest.

mod app;
mod config;
mod game;
mod logging;
mod player;
mod tui;

use app::App;
use config::{ConfigError, GameConfig};
use game::dictionary::{Dictionary, DictionaryError};
use player::TurnError;
use std::io;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error("could not deal the opening racks: {0}")]
    Deal(#[from] TurnError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "startup failed");
            eprintln!("scrabbot: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let config = GameConfig::load()?;

    // Logging is best effort; the game runs without a log file.
    match logging::init(&config.log_level) {
        Ok(path) => info!(path = %path.display(), "logging to file"),
        Err(e) => eprintln!("scrabbot: logging disabled: {}", e),
    }

    let custom;
    let dictionary: &Dictionary = match &config.dictionary_path {
        Some(path) => {
            custom = Dictionary::from_file(path)?;
            &custom
        }
        None => Dictionary::embedded(),
    };
    info!(words = dictionary.len(), "dictionary ready");

    let mut app = App::new(&config, dictionary)?;
    tui::run(&mut app)?;

    // Terminal cleanup happens in tui::run and Tui::drop
    Ok(())
}
