//! Tick scheduling state machine.
//!
//! The engine owns the simulation, the score tracker, and a [`Scheduler`].
//! A driver calls [`TickEngine::pump`] whenever it wakes up: queued input is
//! applied first, then every due tick fires. Each tick re-arms the timer with
//! the session's current speed, so eating food speeds the loop up.
//!
//! ```text
//!   Idle ──start──▶ Running ──pause──▶ Paused
//!    ▲                 │  ◀──resume───┘
//!    │              collision
//!    │                 ▼
//!    └───restart─── GameOver
//! ```

use super::constants::IMMEDIATE_TICK_MS;
use super::scheduler::{Scheduler, TimerHandle, VirtualClock};
use super::session::{AdvanceOutcome, Board, GameOverReason, GameSession, SimulationState};
use super::types::{Cell, Difficulty, Direction};
use crate::input::{self, InputEvent, InputReceiver, InputSender};
use crate::scores::{HighScoreTable, ScoreTracker};
use rand::Rng;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Something a tick did, for the presentation layer (sound cues, flashes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Moved {
        tick: u64,
    },
    AteFood {
        score: u32,
        speed_ms: u64,
    },
    GameOver {
        reason: GameOverReason,
        score: u32,
        new_record: bool,
    },
}

/// Final result of the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub difficulty: Difficulty,
    pub reason: GameOverReason,
    pub score: u32,
    pub new_record: bool,
}

/// Read-only view handed to the renderer each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: EngineState,
    pub difficulty: Difficulty,
    pub selected_difficulty: Difficulty,
    pub board_width: i16,
    pub board_height: i16,
    pub snake: Vec<Cell>,
    pub food: Option<Cell>,
    pub direction: Direction,
    pub score: u32,
    pub speed_ms: u64,
    pub tick_count: u64,
    pub high_scores: HighScoreTable,
    pub last_run: Option<RunSummary>,
}

pub struct TickEngine<S: Scheduler, R: Rng> {
    state: EngineState,
    sim: SimulationState,
    selected: Difficulty,
    scheduler: S,
    rng: R,
    pending_timer: Option<TimerHandle>,
    input: InputReceiver,
    scores: ScoreTracker,
    last_run: Option<RunSummary>,
}

impl<S: Scheduler, R: Rng> TickEngine<S, R> {
    /// Build an idle engine and the sender its input source should use.
    pub fn new(
        board: Board,
        difficulty: Difficulty,
        scheduler: S,
        mut rng: R,
        scores: ScoreTracker,
    ) -> (Self, InputSender) {
        let (tx, rx) = input::channel();
        let mut sim = SimulationState::new(GameSession::new(difficulty, board, &mut rng));
        sim.halt();

        let engine = Self {
            state: EngineState::Idle,
            sim,
            selected: difficulty,
            scheduler,
            rng,
            pending_timer: None,
            input: rx,
            scores,
            last_run: None,
        };
        (engine, tx)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn session(&self) -> &GameSession {
        self.sim.session()
    }

    pub fn selected_difficulty(&self) -> Difficulty {
        self.selected
    }

    pub fn scores(&self) -> &ScoreTracker {
        &self.scores
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn last_run(&self) -> Option<RunSummary> {
        self.last_run
    }

    /// Milliseconds until the next armed tick, if any.
    pub fn time_until_next_tick(&self) -> Option<u64> {
        let now = self.scheduler.now_ms();
        self.scheduler
            .next_deadline_ms()
            .map(|deadline| deadline.saturating_sub(now))
    }

    pub fn snapshot(&self) -> Snapshot {
        let s = self.sim.session();
        Snapshot {
            state: self.state,
            difficulty: s.difficulty,
            selected_difficulty: self.selected,
            board_width: s.board.width(),
            board_height: s.board.height(),
            snake: s.snake.iter().copied().collect(),
            food: s.food,
            direction: s.direction,
            score: s.score,
            speed_ms: s.speed_ms,
            tick_count: s.tick_count,
            high_scores: self.scores.table(),
            last_run: self.last_run,
        }
    }

    /// Apply queued input, then fire every due tick.
    pub fn pump(&mut self) -> Vec<TickEvent> {
        for event in self.input.drain() {
            self.apply_input(event);
        }

        let mut events = Vec::new();
        while let Some(handle) = self.scheduler.pop_due() {
            if self.pending_timer != Some(handle) {
                debug!(?handle, "stale timer discarded");
                continue;
            }
            self.pending_timer = None;
            if let Some(event) = self.tick() {
                events.push(event);
            }
        }
        events
    }

    fn apply_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Turn(direction) => {
                self.turn(direction);
            }
            InputEvent::TogglePause => {
                self.toggle_pause();
            }
            InputEvent::Start => {
                if self.state == EngineState::GameOver {
                    self.restart();
                }
                self.start();
            }
            InputEvent::Restart => {
                self.restart();
            }
            InputEvent::SelectDifficulty(difficulty) => {
                self.select_difficulty(difficulty);
            }
        }
    }

    /// Queue a turn for the next tick. Only meaningful during a run.
    pub fn turn(&mut self, direction: Direction) -> bool {
        match self.state {
            EngineState::Running | EngineState::Paused => {
                self.sim.set_pending_direction(direction)
            }
            _ => false,
        }
    }

    /// Idle → Running with a fresh session at the selected difficulty.
    pub fn start(&mut self) -> bool {
        if self.state != EngineState::Idle {
            debug!(state = ?self.state, "start ignored");
            return false;
        }
        self.sim.reset(self.selected, &mut self.rng);
        self.state = EngineState::Running;
        self.arm(IMMEDIATE_TICK_MS);
        info!(
            difficulty = self.selected.key(),
            speed_ms = self.sim.session().speed_ms,
            "run started"
        );
        true
    }

    /// Running → Paused. The pending tick is cancelled before the state flips.
    pub fn pause(&mut self) -> bool {
        if self.state != EngineState::Running {
            debug!(state = ?self.state, "pause ignored");
            return false;
        }
        self.disarm();
        self.sim.set_paused(true);
        self.state = EngineState::Paused;
        debug!(tick = self.sim.session().tick_count, "paused");
        true
    }

    /// Paused → Running. The next tick fires on the next pump rather than a
    /// full interval later.
    pub fn resume(&mut self) -> bool {
        if self.state != EngineState::Paused {
            debug!(state = ?self.state, "resume ignored");
            return false;
        }
        self.sim.set_paused(false);
        self.state = EngineState::Running;
        self.arm(IMMEDIATE_TICK_MS);
        debug!(tick = self.sim.session().tick_count, "resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            EngineState::Running => self.pause(),
            EngineState::Paused => self.resume(),
            _ => false,
        }
    }

    /// GameOver → Idle with the session reinitialized.
    pub fn restart(&mut self) -> bool {
        if self.state != EngineState::GameOver {
            debug!(state = ?self.state, "restart ignored");
            return false;
        }
        self.disarm();
        self.sim.reset(self.selected, &mut self.rng);
        self.sim.halt();
        self.state = EngineState::Idle;
        true
    }

    /// Choose the difficulty for the next run. Takes effect on the idle
    /// session right away; an active or finished run keeps its own.
    /// Returns whether the current session was rebound.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        self.selected = difficulty;
        if self.state == EngineState::Idle {
            self.sim.rebind_difficulty(difficulty)
        } else {
            debug!(difficulty = difficulty.key(), "difficulty deferred to next run");
            false
        }
    }

    fn tick(&mut self) -> Option<TickEvent> {
        match self.sim.advance(&mut self.rng) {
            AdvanceOutcome::Moved => {
                self.arm_next();
                Some(TickEvent::Moved {
                    tick: self.sim.session().tick_count,
                })
            }
            AdvanceOutcome::Ate { score, speed_ms } => {
                self.arm_next();
                debug!(score, speed_ms, "food eaten");
                Some(TickEvent::AteFood { score, speed_ms })
            }
            AdvanceOutcome::Terminal(reason) => Some(self.finish(reason)),
            AdvanceOutcome::Halted => None,
        }
    }

    fn finish(&mut self, reason: GameOverReason) -> TickEvent {
        self.state = EngineState::GameOver;
        let session = self.sim.session();
        let (difficulty, score) = (session.difficulty, session.score);
        let new_record = self.scores.record_score(difficulty, score);
        info!(
            difficulty = difficulty.key(),
            score,
            new_record,
            reason = reason.describe(),
            "game over"
        );
        self.last_run = Some(RunSummary {
            difficulty,
            reason,
            score,
            new_record,
        });
        TickEvent::GameOver {
            reason,
            score,
            new_record,
        }
    }

    fn arm_next(&mut self) {
        let speed = self.sim.session().speed_ms;
        self.arm(speed);
    }

    fn arm(&mut self, delay_ms: u64) {
        self.disarm();
        self.pending_timer = Some(self.scheduler.schedule_after(delay_ms));
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.pending_timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<R: Rng> TickEngine<VirtualClock, R> {
    /// Let `ms` of virtual time pass, firing each tick at its own deadline.
    pub fn run_for(&mut self, ms: u64) -> Vec<TickEvent> {
        let target = self.scheduler.now_ms() + ms;
        let mut events = self.pump();
        while let Some(deadline) = self.scheduler.next_deadline_ms() {
            if deadline > target {
                break;
            }
            self.scheduler.advance_to(deadline);
            events.extend(self.pump());
        }
        self.scheduler.advance_to(target);
        events.extend(self.pump());
        events
    }
}
