//! Authoritative game state and the per-tick transition.

use super::collision::{check_collision, CollisionKind};
use super::constants::{
    BOARD_HEIGHT, BOARD_WIDTH, INITIAL_SNAKE_LENGTH, MAX_BOARD_SIDE, MIN_BOARD_HEIGHT,
    MIN_BOARD_WIDTH,
};
use super::food::place_food;
use super::types::{Cell, Difficulty, Direction};
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;
use tracing::debug;

/// Rejected board or layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("board {width}x{height} is outside the supported range")]
    BoardSize { width: i16, height: i16 },
    #[error("snake needs at least {min} cells, got {actual}")]
    SnakeTooShort { min: usize, actual: usize },
    #[error("snake cell ({x}, {y}) is off the board")]
    SnakeOutOfBounds { x: i16, y: i16 },
    #[error("snake occupies ({x}, {y}) more than once")]
    DuplicateCell { x: i16, y: i16 },
    #[error("food at ({x}, {y}) is off the board")]
    FoodOutOfBounds { x: i16, y: i16 },
    #[error("food at ({x}, {y}) overlaps the snake")]
    FoodOnSnake { x: i16, y: i16 },
}

/// Validated board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    width: i16,
    height: i16,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
        }
    }
}

impl Board {
    /// A board must hold the starting snake with room to spare for food.
    pub fn new(width: i16, height: i16) -> Result<Self, SessionError> {
        let fits = (MIN_BOARD_WIDTH..=MAX_BOARD_SIDE).contains(&width)
            && (MIN_BOARD_HEIGHT..=MAX_BOARD_SIDE).contains(&height);
        if !fits {
            return Err(SessionError::BoardSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.in_bounds(self.width, self.height)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    Wall,
    SelfCollision,
    /// The snake fills the board and no food can be placed.
    BoardFull,
}

impl From<CollisionKind> for GameOverReason {
    fn from(kind: CollisionKind) -> Self {
        match kind {
            CollisionKind::Wall => Self::Wall,
            CollisionKind::SelfCollision => Self::SelfCollision,
        }
    }
}

impl GameOverReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Wall => "hit the wall",
            Self::SelfCollision => "bit its own tail",
            Self::BoardFull => "filled the whole board",
        }
    }
}

/// What one call to [`SimulationState::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Length-preserving move.
    Moved,
    /// Grew by one; new score and tick interval.
    Ate { score: u32, speed_ms: u64 },
    /// The run is over.
    Terminal(GameOverReason),
    /// Session is paused or already over; nothing changed.
    Halted,
}

/// Mutable aggregate for one run.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub difficulty: Difficulty,
    pub board: Board,

    /// Head at the front (index 0).
    pub snake: VecDeque<Cell>,
    /// `None` only after a board-full stalemate.
    pub food: Option<Cell>,
    pub direction: Direction,
    /// Applied at the start of the next tick.
    pub pending_direction: Direction,

    pub score: u32,
    /// Current tick interval in milliseconds.
    pub speed_ms: u64,

    pub running: bool,
    pub paused: bool,
    pub game_over: Option<GameOverReason>,
    pub tick_count: u64,
}

impl GameSession {
    /// Fresh running session: snake centered, three cells long, heading right.
    pub fn new<R: Rng + ?Sized>(difficulty: Difficulty, board: Board, rng: &mut R) -> Self {
        let center = Cell::new(board.width() / 2, board.height() / 2);
        let snake: VecDeque<Cell> = (0..INITIAL_SNAKE_LENGTH as i16)
            .map(|i| Cell::new(center.x - i, center.y))
            .collect();
        let food = place_food(&snake, board.width(), board.height(), rng);

        Self {
            difficulty,
            board,
            snake,
            food,
            direction: Direction::Right,
            pending_direction: Direction::Right,
            score: 0,
            speed_ms: difficulty.profile().base_speed_ms,
            running: true,
            paused: false,
            game_over: None,
            tick_count: 0,
        }
    }

    /// Running session with an explicit layout (head first).
    pub fn with_layout(
        difficulty: Difficulty,
        board: Board,
        snake: Vec<Cell>,
        direction: Direction,
        food: Cell,
    ) -> Result<Self, SessionError> {
        if snake.len() < INITIAL_SNAKE_LENGTH {
            return Err(SessionError::SnakeTooShort {
                min: INITIAL_SNAKE_LENGTH,
                actual: snake.len(),
            });
        }
        let mut seen = HashSet::with_capacity(snake.len());
        for &cell in &snake {
            if !board.contains(cell) {
                return Err(SessionError::SnakeOutOfBounds {
                    x: cell.x,
                    y: cell.y,
                });
            }
            if !seen.insert(cell) {
                return Err(SessionError::DuplicateCell {
                    x: cell.x,
                    y: cell.y,
                });
            }
        }
        if !board.contains(food) {
            return Err(SessionError::FoodOutOfBounds {
                x: food.x,
                y: food.y,
            });
        }
        if seen.contains(&food) {
            return Err(SessionError::FoodOnSnake {
                x: food.x,
                y: food.y,
            });
        }

        Ok(Self {
            difficulty,
            board,
            snake: snake.into(),
            food: Some(food),
            direction,
            pending_direction: direction,
            score: 0,
            speed_ms: difficulty.profile().base_speed_ms,
            running: true,
            paused: false,
            game_over: None,
            tick_count: 0,
        })
    }

    pub fn head(&self) -> Cell {
        self.snake[0]
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.snake.contains(&cell)
    }
}

/// Owns the session and applies the transition rules to it.
#[derive(Debug, Clone)]
pub struct SimulationState {
    session: GameSession,
}

impl SimulationState {
    pub fn new(session: GameSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Replace the session with a fresh running one.
    pub fn reset<R: Rng + ?Sized>(&mut self, difficulty: Difficulty, rng: &mut R) {
        self.session = GameSession::new(difficulty, self.session.board, rng);
    }

    /// Mark the session as not running without touching the board.
    pub fn halt(&mut self) {
        self.session.running = false;
        self.session.paused = false;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.session.paused = paused;
    }

    /// Rebind the difficulty of a session that is not running. The speed
    /// drops back to the new profile's base. Returns false during a run.
    pub fn rebind_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.session.running {
            return false;
        }
        self.session.difficulty = difficulty;
        self.session.speed_ms = difficulty.profile().base_speed_ms;
        true
    }

    /// Queue a turn for the next tick. A reversal of the current heading is
    /// ignored; the last accepted write before a tick wins.
    pub fn set_pending_direction(&mut self, direction: Direction) -> bool {
        if direction.is_opposite(self.session.direction) {
            debug!(?direction, current = ?self.session.direction, "reversal ignored");
            return false;
        }
        self.session.pending_direction = direction;
        true
    }

    /// Move the snake one cell.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AdvanceOutcome {
        let s = &mut self.session;
        if !s.running || s.paused {
            return AdvanceOutcome::Halted;
        }

        s.tick_count += 1;
        s.direction = s.pending_direction;
        let new_head = s.head().step(s.direction);
        let (width, height) = (s.board.width(), s.board.height());

        if let Some(kind) = check_collision(new_head, width, height, &s.snake) {
            return Self::finish(s, kind.into());
        }

        s.snake.push_front(new_head);

        if s.food != Some(new_head) {
            s.snake.pop_back();
            return AdvanceOutcome::Moved;
        }

        s.score += 1;
        s.speed_ms = s.difficulty.profile().next_speed(s.speed_ms);
        s.food = place_food(&s.snake, width, height, rng);
        if s.food.is_none() {
            return Self::finish(s, GameOverReason::BoardFull);
        }

        AdvanceOutcome::Ate {
            score: s.score,
            speed_ms: s.speed_ms,
        }
    }

    fn finish(session: &mut GameSession, reason: GameOverReason) -> AdvanceOutcome {
        session.running = false;
        session.paused = false;
        session.game_over = Some(reason);
        AdvanceOutcome::Terminal(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::MIN_SPEED_MS;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn cells(raw: &[(i16, i16)]) -> Vec<Cell> {
        raw.iter().copied().map(Cell::from).collect()
    }

    fn layout(snake: &[(i16, i16)], direction: Direction, food: (i16, i16)) -> SimulationState {
        let session = GameSession::with_layout(
            Difficulty::Easy,
            Board::default(),
            cells(snake),
            direction,
            food.into(),
        )
        .unwrap();
        SimulationState::new(session)
    }

    #[test]
    fn test_new_session_defaults() {
        let mut rng = create_test_rng();
        let session = GameSession::new(Difficulty::Medium, Board::default(), &mut rng);
        assert_eq!(session.len(), 3);
        assert_eq!(session.head(), Cell::new(10, 10));
        assert_eq!(session.snake[1], Cell::new(9, 10));
        assert_eq!(session.snake[2], Cell::new(8, 10));
        assert_eq!(session.direction, Direction::Right);
        assert_eq!(session.pending_direction, Direction::Right);
        assert_eq!(session.speed_ms, 100);
        assert_eq!(session.score, 0);
        assert!(session.running);
        assert!(!session.paused);
        let food = session.food.unwrap();
        assert!(!session.occupies(food));
    }

    #[test]
    fn test_board_limits() {
        assert!(Board::new(20, 20).is_ok());
        assert!(Board::new(MIN_BOARD_WIDTH, MIN_BOARD_HEIGHT).is_ok());
        assert_eq!(
            Board::new(4, 20),
            Err(SessionError::BoardSize {
                width: 4,
                height: 20
            })
        );
        assert!(Board::new(20, 2).is_err());
        assert!(Board::new(MAX_BOARD_SIDE + 1, 20).is_err());
    }

    #[test]
    fn test_smallest_board_snake_fits() {
        let mut rng = create_test_rng();
        let board = Board::new(MIN_BOARD_WIDTH, MIN_BOARD_HEIGHT).unwrap();
        let session = GameSession::new(Difficulty::Easy, board, &mut rng);
        assert!(session.snake.iter().all(|c| board.contains(*c)));
        assert!(session.food.is_some());
    }

    #[test]
    fn test_layout_validation() {
        let board = Board::default();
        let short = GameSession::with_layout(
            Difficulty::Easy,
            board,
            cells(&[(1, 1), (0, 1)]),
            Direction::Right,
            Cell::new(5, 5),
        );
        assert_eq!(
            short.unwrap_err(),
            SessionError::SnakeTooShort { min: 3, actual: 2 }
        );

        let dup = GameSession::with_layout(
            Difficulty::Easy,
            board,
            cells(&[(2, 1), (1, 1), (2, 1)]),
            Direction::Right,
            Cell::new(5, 5),
        );
        assert_eq!(dup.unwrap_err(), SessionError::DuplicateCell { x: 2, y: 1 });

        let off = GameSession::with_layout(
            Difficulty::Easy,
            board,
            cells(&[(0, 1), (-1, 1), (-2, 1)]),
            Direction::Right,
            Cell::new(5, 5),
        );
        assert_eq!(
            off.unwrap_err(),
            SessionError::SnakeOutOfBounds { x: -1, y: 1 }
        );

        let food_on = GameSession::with_layout(
            Difficulty::Easy,
            board,
            cells(&[(3, 1), (2, 1), (1, 1)]),
            Direction::Right,
            Cell::new(2, 1),
        );
        assert_eq!(food_on.unwrap_err(), SessionError::FoodOnSnake { x: 2, y: 1 });

        let food_off = GameSession::with_layout(
            Difficulty::Easy,
            board,
            cells(&[(3, 1), (2, 1), (1, 1)]),
            Direction::Right,
            Cell::new(20, 1),
        );
        assert_eq!(
            food_off.unwrap_err(),
            SessionError::FoodOutOfBounds { x: 20, y: 1 }
        );
    }

    #[test]
    fn test_eat_scenario() {
        let mut rng = create_test_rng();
        let mut sim = layout(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (11, 10));

        let outcome = sim.advance(&mut rng);

        assert_eq!(
            outcome,
            AdvanceOutcome::Ate {
                score: 1,
                speed_ms: 149
            }
        );
        let s = sim.session();
        assert_eq!(s.score, 1);
        assert_eq!(
            s.snake.iter().copied().collect::<Vec<_>>(),
            cells(&[(11, 10), (10, 10), (9, 10), (8, 10)])
        );
        let food = s.food.unwrap();
        assert_ne!(food, Cell::new(11, 10));
        assert!(!s.occupies(food));
        assert_eq!(s.speed_ms, 150 - Difficulty::Easy.profile().speed_decrement_ms);
    }

    #[test]
    fn test_left_wall_scenario() {
        let mut rng = create_test_rng();
        let mut sim = layout(&[(0, 10), (1, 10), (2, 10)], Direction::Left, (5, 5));

        let outcome = sim.advance(&mut rng);

        assert_eq!(outcome, AdvanceOutcome::Terminal(GameOverReason::Wall));
        let s = sim.session();
        assert!(!s.running);
        assert_eq!(s.score, 0);
        assert_eq!(s.game_over, Some(GameOverReason::Wall));
        // Body untouched on a fatal move
        assert_eq!(s.head(), Cell::new(0, 10));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_plain_move_keeps_length() {
        let mut rng = create_test_rng();
        let mut sim = layout(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));

        assert_eq!(sim.advance(&mut rng), AdvanceOutcome::Moved);
        let s = sim.session();
        assert_eq!(s.len(), 3);
        assert_eq!(s.head(), Cell::new(11, 10));
        assert_eq!(*s.snake.back().unwrap(), Cell::new(9, 10));
        assert_eq!(s.tick_count, 1);
    }

    #[test]
    fn test_reversal_is_ignored() {
        let mut rng = create_test_rng();
        let mut sim = layout(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));

        assert!(!sim.set_pending_direction(Direction::Left));
        sim.advance(&mut rng);

        assert_eq!(sim.session().direction, Direction::Right);
        assert_eq!(sim.session().head(), Cell::new(11, 10));
    }

    #[test]
    fn test_last_accepted_turn_wins() {
        let mut rng = create_test_rng();
        let mut sim = layout(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));

        assert!(sim.set_pending_direction(Direction::Up));
        assert!(sim.set_pending_direction(Direction::Down));
        sim.advance(&mut rng);

        assert_eq!(sim.session().direction, Direction::Down);
        assert_eq!(sim.session().head(), Cell::new(10, 11));
    }

    #[test]
    fn test_turn_checked_against_current_not_pending() {
        let mut sim = layout(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));
        assert!(sim.set_pending_direction(Direction::Up));
        // Down reverses the pending heading but not the current one
        assert!(sim.set_pending_direction(Direction::Down));
        assert_eq!(sim.session().pending_direction, Direction::Down);
    }

    #[test]
    fn test_self_collision() {
        let mut rng = create_test_rng();
        // Head at (5,5) moving right into (6,5), which is body
        let mut sim = layout(
            &[(5, 5), (5, 4), (6, 4), (6, 5), (6, 6)],
            Direction::Right,
            (0, 0),
        );
        assert_eq!(
            sim.advance(&mut rng),
            AdvanceOutcome::Terminal(GameOverReason::SelfCollision)
        );
    }

    #[test]
    fn test_moving_into_tail_is_fatal() {
        let mut rng = create_test_rng();
        // 2x2 loop: the tail at (5,6) would vacate, but the pre-move body still holds it
        let mut sim = layout(
            &[(5, 5), (6, 5), (6, 6), (5, 6)],
            Direction::Down,
            (0, 0),
        );
        assert_eq!(
            sim.advance(&mut rng),
            AdvanceOutcome::Terminal(GameOverReason::SelfCollision)
        );
    }

    #[test]
    fn test_board_full_is_terminal() {
        let mut rng = create_test_rng();
        let board = Board::new(5, 3).unwrap();
        // Serpentine filling all but (4,2); head at (3,2) heading right
        let snake = cells(&[
            (3, 2),
            (2, 2),
            (1, 2),
            (0, 2),
            (0, 1),
            (1, 1),
            (2, 1),
            (3, 1),
            (4, 1),
            (4, 0),
            (3, 0),
            (2, 0),
            (1, 0),
            (0, 0),
        ]);
        let session = GameSession::with_layout(
            Difficulty::Hard,
            board,
            snake,
            Direction::Right,
            Cell::new(4, 2),
        )
        .unwrap();
        let mut sim = SimulationState::new(session);

        let outcome = sim.advance(&mut rng);

        assert_eq!(outcome, AdvanceOutcome::Terminal(GameOverReason::BoardFull));
        let s = sim.session();
        assert_eq!(s.score, 1);
        assert_eq!(s.len(), board.cell_count());
        assert!(s.food.is_none());
        assert!(!s.running);
    }

    #[test]
    fn test_advance_after_game_over_is_halted() {
        let mut rng = create_test_rng();
        let mut sim = layout(&[(0, 10), (1, 10), (2, 10)], Direction::Left, (5, 5));
        sim.advance(&mut rng);
        let ticks = sim.session().tick_count;

        assert_eq!(sim.advance(&mut rng), AdvanceOutcome::Halted);
        assert_eq!(sim.session().tick_count, ticks);
    }

    #[test]
    fn test_advance_while_paused_is_halted() {
        let mut rng = create_test_rng();
        let mut sim = layout(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));
        sim.set_paused(true);
        assert_eq!(sim.advance(&mut rng), AdvanceOutcome::Halted);
        assert_eq!(sim.session().head(), Cell::new(10, 10));
    }

    #[test]
    fn test_speed_ramp_floors() {
        let mut rng = create_test_rng();
        let mut session = GameSession::with_layout(
            Difficulty::Hard,
            Board::default(),
            cells(&[(2, 0), (1, 0), (0, 0)]),
            Direction::Right,
            Cell::new(3, 0),
        )
        .unwrap();
        session.speed_ms = 52;
        let mut sim = SimulationState::new(session);

        sim.advance(&mut rng);
        assert_eq!(sim.session().speed_ms, MIN_SPEED_MS);
    }

    #[test]
    fn test_rebind_difficulty_only_when_idle() {
        let mut rng = create_test_rng();
        let mut sim = SimulationState::new(GameSession::new(
            Difficulty::Easy,
            Board::default(),
            &mut rng,
        ));
        assert!(!sim.rebind_difficulty(Difficulty::Hard));
        assert_eq!(sim.session().speed_ms, 150);

        sim.halt();
        assert!(sim.rebind_difficulty(Difficulty::Hard));
        assert_eq!(sim.session().difficulty, Difficulty::Hard);
        assert_eq!(sim.session().speed_ms, 80);
    }

    #[test]
    fn test_reset_restores_fresh_session() {
        let mut rng = create_test_rng();
        let mut sim = layout(&[(0, 10), (1, 10), (2, 10)], Direction::Left, (5, 5));
        sim.advance(&mut rng);
        assert!(!sim.session().running);

        sim.reset(Difficulty::Medium, &mut rng);

        let s = sim.session();
        assert!(s.running);
        assert_eq!(s.score, 0);
        assert_eq!(s.speed_ms, 100);
        assert_eq!(s.head(), Cell::new(10, 10));
        assert!(s.game_over.is_none());
    }
}
