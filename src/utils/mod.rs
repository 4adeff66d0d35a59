//! Utility modules: JSON persistence helpers and logging setup.

pub mod logging;
pub mod persistence;

pub use logging::init_logging;
