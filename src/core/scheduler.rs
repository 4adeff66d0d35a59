//! Tick timers: a wall-clock scheduler for play and a virtual clock for tests.
//!
//! Timers do not carry callbacks. The engine owns the only meaningful
//! reaction to a timer, so it asks the scheduler which handles are due and
//! matches them against the one it is waiting for.

use std::collections::BTreeSet;
use std::time::Instant;

/// Opaque id of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    /// Milliseconds since the scheduler's origin.
    fn now_ms(&self) -> u64;

    /// Arm a timer that becomes due `delay_ms` from now.
    fn schedule_after(&mut self, delay_ms: u64) -> TimerHandle;

    /// Disarm a timer. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Remove and return the earliest timer whose deadline has passed.
    fn pop_due(&mut self) -> Option<TimerHandle>;

    /// Deadline of the earliest armed timer.
    fn next_deadline_ms(&self) -> Option<u64>;
}

/// Armed timers ordered by (deadline, id), so equal deadlines fire in
/// scheduling order.
#[derive(Debug, Default)]
struct TimerQueue {
    next_id: u64,
    armed: BTreeSet<(u64, u64)>,
}

impl TimerQueue {
    fn arm(&mut self, deadline: u64) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.armed.insert((deadline, id));
        TimerHandle(id)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.armed.retain(|&(_, id)| id != handle.0);
    }

    fn pop_due(&mut self, now: u64) -> Option<TimerHandle> {
        let first = *self.armed.iter().next()?;
        if first.0 > now {
            return None;
        }
        self.armed.remove(&first);
        Some(TimerHandle(first.1))
    }

    fn next_deadline(&self) -> Option<u64> {
        self.armed.iter().next().map(|&(deadline, _)| deadline)
    }

    fn len(&self) -> usize {
        self.armed.len()
    }
}

/// Scheduler driven by [`Instant`].
#[derive(Debug)]
pub struct SystemScheduler {
    origin: Instant,
    timers: TimerQueue,
}

impl SystemScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            timers: TimerQueue::default(),
        }
    }
}

impl Default for SystemScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for SystemScheduler {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn schedule_after(&mut self, delay_ms: u64) -> TimerHandle {
        let deadline = self.now_ms() + delay_ms;
        self.timers.arm(deadline)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }

    fn pop_due(&mut self) -> Option<TimerHandle> {
        let now = self.now_ms();
        self.timers.pop_due(now)
    }

    fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_deadline()
    }
}

/// Manually advanced clock. Time only moves when told to.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: u64,
    timers: TimerQueue,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward to `at_ms`. Never moves backwards.
    pub fn advance_to(&mut self, at_ms: u64) {
        self.now = self.now.max(at_ms);
    }

    pub fn advance_by(&mut self, ms: u64) {
        self.now += ms;
    }

    /// Number of armed timers.
    pub fn armed(&self) -> usize {
        self.timers.len()
    }
}

impl Scheduler for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn schedule_after(&mut self, delay_ms: u64) -> TimerHandle {
        self.timers.arm(self.now + delay_ms)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }

    fn pop_due(&mut self) -> Option<TimerHandle> {
        self.timers.pop_due(self.now)
    }

    fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_deadline()
    }
}
