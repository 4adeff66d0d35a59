//! Snake - terminal snake game library
//!
//! The simulation, tick engine, persistence, and rendering are exposed here
//! for the binary and for integration tests.

pub mod build_info;
pub mod config;
pub mod core;
pub mod input;
pub mod preferences;
pub mod scores;
pub mod store;
pub mod ui;
pub mod utils;

pub use crate::config::{Command, ConfigError, GameConfig};
pub use crate::core::{
    Board, Cell, Difficulty, Direction, EngineState, GameOverReason, Snapshot, TickEngine,
    TickEvent,
};
pub use crate::input::{InputEvent, InputSender, KeyAction};
pub use crate::preferences::Preferences;
pub use crate::scores::{HighScoreTable, ScoreTracker};
pub use crate::store::{JsonFileStore, KeyValueStore, LocalStore, MemoryStore, StoreError};
