//! Core game state and logic.

pub mod collision;
pub mod constants;
pub mod engine;
pub mod food;
pub mod scheduler;
pub mod session;
pub mod types;

pub use collision::{check_collision, CollisionKind};
pub use engine::{EngineState, RunSummary, Snapshot, TickEngine, TickEvent};
pub use food::place_food;
pub use scheduler::{Scheduler, SystemScheduler, TimerHandle, VirtualClock};
pub use session::{
    AdvanceOutcome, Board, GameOverReason, GameSession, SessionError, SimulationState,
};
pub use types::{Cell, Difficulty, DifficultyProfile, Direction};
