//! Helpers shared by the integration tests.

use snake::core::{Direction, GameSession};

pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

/// Greedy autopilot: the safe move that gets closest to the food.
/// Keeps the current heading when no move is safe.
pub fn steer(session: &GameSession) -> Direction {
    let head = session.head();
    let target = session.food.unwrap_or(head);
    let mut best: Option<(i32, Direction)> = None;

    for direction in DIRECTIONS {
        if direction.is_opposite(session.direction) {
            continue;
        }
        let next = head.step(direction);
        if !session.board.contains(next) || session.occupies(next) {
            continue;
        }
        let dist = (next.x - target.x).abs() as i32 + (next.y - target.y).abs() as i32;
        if best.map_or(true, |(b, _)| dist < b) {
            best = Some((dist, direction));
        }
    }
    best.map_or(session.direction, |(_, d)| d)
}
