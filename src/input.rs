//! Input sources: the engine's event channel, keyboard mapping, and swipe
//! (mouse drag) detection.

use crate::core::types::{Difficulty, Direction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::sync::mpsc;

/// Events the engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Turn(Direction),
    TogglePause,
    Start,
    Restart,
    SelectDifficulty(Difficulty),
}

/// Producer half handed to the frontend.
#[derive(Debug, Clone)]
pub struct InputSender(mpsc::Sender<InputEvent>);

impl InputSender {
    /// Returns false once the engine is gone.
    pub fn send(&self, event: InputEvent) -> bool {
        self.0.send(event).is_ok()
    }
}

/// Consumer half owned by the engine.
#[derive(Debug)]
pub struct InputReceiver(mpsc::Receiver<InputEvent>);

impl InputReceiver {
    /// Everything queued since the last drain, oldest first.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.0.try_iter().collect()
    }
}

pub fn channel() -> (InputSender, InputReceiver) {
    let (tx, rx) = mpsc::channel();
    (InputSender(tx), InputReceiver(rx))
}

/// What a key press means to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Game(InputEvent),
    ToggleMute,
    Quit,
    None,
}

pub fn map_key_event(key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    let turn = |d| KeyAction::Game(InputEvent::Turn(d));
    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => turn(Direction::Right),

        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
            KeyAction::Game(InputEvent::TogglePause)
        }
        KeyCode::Enter => KeyAction::Game(InputEvent::Start),
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Game(InputEvent::Restart),
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            KeyAction::Game(InputEvent::SelectDifficulty(Difficulty::from_index(index)))
        }

        KeyCode::Char('m') | KeyCode::Char('M') => KeyAction::ToggleMute,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

/// Direction of a swipe from its displacement, by dominant axis. Ties go to
/// the vertical axis; a zero-length swipe means nothing.
pub fn swipe_direction(dx: i32, dy: i32) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        Some(if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else if dy != 0 {
        Some(if dy > 0 {
            Direction::Down
        } else {
            Direction::Up
        })
    } else {
        None
    }
}

/// Turns a left-button press/release pair into a swipe.
///
/// Terminal cells are about twice as tall as they are wide, so the horizontal
/// displacement is halved before picking the axis.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start: Option<(u16, u16)>,
}

impl SwipeTracker {
    pub fn track(&mut self, event: MouseEvent) -> Option<Direction> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.start = Some((event.column, event.row));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (x0, y0) = self.start.take()?;
                let dx = (event.column as i32 - x0 as i32) / 2;
                let dy = event.row as i32 - y0 as i32;
                swipe_direction(dx, dy)
            }
            _ => None,
        }
    }
}
