//! Food placement.

use super::types::Cell;
use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::HashSet;

/// Pick a free cell uniformly at random by scanning the whole board.
///
/// Returns `None` when the snake fills every cell, which callers treat as a
/// stalemate rather than retrying.
pub fn place_food<'a, I, R>(snake: I, width: i16, height: i16, rng: &mut R) -> Option<Cell>
where
    I: IntoIterator<Item = &'a Cell>,
    R: Rng + ?Sized,
{
    let occupied: HashSet<Cell> = snake.into_iter().copied().collect();
    (0..height)
        .flat_map(|y| (0..width).map(move |x| Cell::new(x, y)))
        .filter(|cell| !occupied.contains(cell))
        .choose(rng)
}
