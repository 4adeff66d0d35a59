//! Game-over rules for a proposed head position.

use super::types::Cell;

/// Why a move ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Wall,
    SelfCollision,
}

/// Checks `new_head` against the board edges and the body as it stands before
/// the move. The tail is part of `body` here even though a non-eating move
/// would vacate it, so chasing your own tail is fatal.
pub fn check_collision<'a, I>(
    new_head: Cell,
    width: i16,
    height: i16,
    body: I,
) -> Option<CollisionKind>
where
    I: IntoIterator<Item = &'a Cell>,
{
    if !new_head.in_bounds(width, height) {
        return Some(CollisionKind::Wall);
    }
    if body.into_iter().any(|&seg| seg == new_head) {
        return Some(CollisionKind::SelfCollision);
    }
    None
}
