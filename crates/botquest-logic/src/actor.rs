//! The robot the child programs — pose, facing, and collected resources.

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;

/// Facing direction. The four variants form a fixed cycle for turning;
/// turning is always a step along the cycle, never an arbitrary rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// One step counter-clockwise along the cycle.
    pub fn turned_left(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// One step clockwise along the cycle.
    pub fn turned_right(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The (row, col) delta of a single step in this direction.
    /// Row 0 is the top of the grid, so `Up` decreases the row.
    pub fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }
}

/// The actor's full pose and inventory during a run.
///
/// `is_moving`/`is_jumping` are transient flags describing the *last*
/// executed instruction, kept for the presentation layer's animations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: GridPos,
    pub dir: Direction,
    pub is_jumping: bool,
    pub is_moving: bool,
    pub coins: u32,
    pub gems: u32,
    pub energy: u32,
}

impl Actor {
    /// Fresh actor at a level's start pose with full energy and nothing
    /// collected.
    pub fn at_start(pos: GridPos, dir: Direction) -> Self {
        Self {
            pos,
            dir,
            is_jumping: false,
            is_moving: false,
            coins: 0,
            gems: 0,
            energy: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_left_turns_return_home() {
        let mut d = Direction::Up;
        for _ in 0..4 {
            d = d.turned_left();
        }
        assert_eq!(d, Direction::Up);
    }

    #[test]
    fn left_then_right_cancels() {
        for d in [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ] {
            assert_eq!(d.turned_left().turned_right(), d);
            assert_eq!(d.turned_right().turned_left(), d);
        }
    }

    #[test]
    fn opposite_is_two_turns() {
        for d in [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ] {
            assert_eq!(d.opposite(), d.turned_left().turned_left());
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn deltas_cancel_for_opposites() {
        for d in [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ] {
            let (dr, dc) = d.delta();
            let (or, oc) = d.opposite().delta();
            assert_eq!((dr + or, dc + oc), (0, 0));
        }
    }

    #[test]
    fn start_actor_is_empty_handed() {
        let a = Actor::at_start(GridPos::new(2, 3), Direction::Right);
        assert_eq!(a.coins, 0);
        assert_eq!(a.gems, 0);
        assert_eq!(a.energy, 100);
        assert!(!a.is_moving);
        assert!(!a.is_jumping);
    }
}
