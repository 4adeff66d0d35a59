//! File-backed tracing subscriber. The terminal belongs to the UI, so log
//! output only ever goes to ~/.snake/snake.log.

use super::persistence::save_path;
use crate::core::constants::LOG_FILENAME;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `snake=debug`.
pub const LOG_ENV: &str = "SNAKE_LOG";
const DEFAULT_DIRECTIVE: &str = "snake=info";

/// Install the global subscriber when `--log` was passed or `SNAKE_LOG` is set.
///
/// Returns the log file path when logging was enabled.
pub fn init_logging(requested: bool) -> io::Result<Option<PathBuf>> {
    let from_env = std::env::var_os(LOG_ENV).is_some();
    if !requested && !from_env {
        return Ok(None);
    }

    let path = save_path(LOG_FILENAME)?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(Some(path))
}
