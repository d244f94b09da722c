//! Grid coordinate and orientation value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell address on the navigation grid, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub row: u32,
    pub col: u32,
}

impl GridCoordinate {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Vehicle facing, one of the four cardinal directions.
///
/// The cyclic order North=0, East=1, South=2, West=3 drives turn-angle
/// arithmetic: one clockwise quarter turn advances the index by one (mod 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// Position in the clockwise cycle (North=0 .. West=3).
    pub fn index(self) -> u8 {
        match self {
            Orientation::North => 0,
            Orientation::East => 1,
            Orientation::South => 2,
            Orientation::West => 3,
        }
    }

    /// Inverse of [`index`](Self::index); `i` is taken mod 4.
    pub fn from_index(i: u8) -> Self {
        match i % 4 {
            0 => Orientation::North,
            1 => Orientation::East,
            2 => Orientation::South,
            _ => Orientation::West,
        }
    }

    /// Facing after one 90° clockwise turn.
    pub fn turned_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Facing after one 90° counter-clockwise turn.
    pub fn turned_left(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Number of clockwise quarter turns needed to face `target` (0..=3).
    pub fn quarter_turns_to(self, target: Orientation) -> u8 {
        (target.index() + 4 - self.index()) % 4
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Orientation::North => "north",
            Orientation::East => "east",
            Orientation::South => "south",
            Orientation::West => "west",
        };
        f.write_str(name)
    }
}
