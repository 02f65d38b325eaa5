use serde::{Deserialize, Serialize};

/// A cell on the board. Ordering is lexicographic on (row, col), which is
/// what the selection policy's final tie-break relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Manhattan distance, ignoring teleporters and walls.
    pub fn distance(&self, other: &Position) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// Chebyshev distance, used for hazard radii and cluster windows.
    pub fn chebyshev(&self, other: &Position) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    pub fn neighbors(&self) -> [Position; 4] {
        [
            Position::new(self.row - 1, self.col), // Up
            Position::new(self.row + 1, self.col), // Down
            Position::new(self.row, self.col - 1), // Left
            Position::new(self.row, self.col + 1), // Right
        ]
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }
}

/// The closed set of actions the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
    UseTeleporter,
    Idle,
}

impl Move {
    /// The directional move taking `from` to the orthogonally adjacent `to`.
    /// Returns None when the cells are not orthogonally adjacent, which is
    /// exactly the case where a path step must be a teleporter jump.
    pub fn step_between(from: Position, to: Position) -> Option<Move> {
        match (to.row - from.row, to.col - from.col) {
            (-1, 0) => Some(Move::Up),
            (1, 0) => Some(Move::Down),
            (0, -1) => Some(Move::Left),
            (0, 1) => Some(Move::Right),
            _ => None,
        }
    }
}
