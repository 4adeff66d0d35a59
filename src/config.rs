//! Startup configuration: ~/.snake/config.json overlaid with command-line flags.

use crate::core::constants::{BOARD_HEIGHT, BOARD_WIDTH, CONFIG_FILENAME};
use crate::core::session::{Board, SessionError};
use crate::core::types::Difficulty;
use crate::utils::persistence::{load_json_at_or_default, load_json_or_default};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: i16,
    pub height: i16,
    pub difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            difficulty: Difficulty::default(),
        }
    }
}

impl GameConfig {
    /// Read ~/.snake/config.json, or defaults if it is missing, malformed or
    /// describes a board that cannot be played.
    pub fn load() -> Self {
        load_json_or_default::<Self>(CONFIG_FILENAME).or_default_if_invalid()
    }

    pub fn load_at(path: &Path) -> Self {
        load_json_at_or_default::<Self>(path).or_default_if_invalid()
    }

    fn or_default_if_invalid(self) -> Self {
        match self.board() {
            Ok(_) => self,
            Err(e) => {
                warn!(error = %e, "ignoring stored config");
                Self::default()
            }
        }
    }

    /// Validate the dimensions into a [`Board`].
    pub fn board(&self) -> Result<Board, ConfigError> {
        Ok(Board::new(self.width, self.height)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("{0} needs a value")]
    MissingValue(&'static str),
    #[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
    InvalidDifficulty(String),
    #[error("{flag} expects a number, got '{value}'")]
    InvalidNumber { flag: &'static str, value: String },
    #[error(transparent)]
    Board(#[from] SessionError),
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play { config: GameConfig, log: bool },
    Version,
    Help,
}

pub const USAGE: &str = "\
Snake - terminal snake game

Usage: snake [options]

Options:
  --difficulty <easy|medium|hard>  Starting difficulty
  --width <n>                      Board width in cells
  --height <n>                     Board height in cells
  --log                            Write a log to ~/.snake/snake.log
  --version                        Show version information
  --help                           Show this help message

Keys: arrows/WASD turn, space pause, Enter start, r restart,
      1/2/3 difficulty, m mute, q quit";

/// Apply command-line arguments (without the program name) on top of `base`.
pub fn parse_args<I, S>(args: I, base: GameConfig) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut config = base;
    let mut log = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_ref() {
            "--version" | "-v" => return Ok(Command::Version),
            "--help" | "-h" => return Ok(Command::Help),
            "--log" => log = true,
            "--difficulty" | "-d" => {
                let value = next_value(&mut args, "--difficulty")?;
                config.difficulty = Difficulty::from_key(&value)
                    .ok_or(ConfigError::InvalidDifficulty(value))?;
            }
            "--width" => config.width = parse_number(&mut args, "--width")?,
            "--height" => config.height = parse_number(&mut args, "--height")?,
            other => return Err(ConfigError::UnknownArgument(other.to_string())),
        }
    }

    config.board()?;
    Ok(Command::Play { config, log })
}

fn next_value<I, S>(args: &mut I, flag: &'static str) -> Result<String, ConfigError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    args.next()
        .map(|s| s.as_ref().to_string())
        .ok_or(ConfigError::MissingValue(flag))
}

fn parse_number<I, S>(args: &mut I, flag: &'static str) -> Result<i16, ConfigError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let value = next_value(args, flag)?;
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { flag, value })
}
