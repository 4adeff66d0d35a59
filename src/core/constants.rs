// Board
pub const BOARD_WIDTH: i16 = 20;
pub const BOARD_HEIGHT: i16 = 20;
pub const MIN_BOARD_WIDTH: i16 = 5;
pub const MIN_BOARD_HEIGHT: i16 = 3;
pub const MAX_BOARD_SIDE: i16 = 200;

// Snake
pub const INITIAL_SNAKE_LENGTH: usize = 3;

// Timing
pub const MIN_SPEED_MS: u64 = 50;
/// Delay used when a run starts or resumes: the next tick fires on the next pump.
pub const IMMEDIATE_TICK_MS: u64 = 0;

// Persistence keys
pub const HIGH_SCORES_KEY: &str = "high_scores";
pub const LEGACY_HIGH_SCORE_KEY: &str = "high_score";
pub const MUTED_KEY: &str = "muted";
pub const STORE_FILENAME: &str = "store.json";
pub const CONFIG_FILENAME: &str = "config.json";
pub const LOG_FILENAME: &str = "snake.log";
