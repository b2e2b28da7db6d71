use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// A board coordinate. `row` 0 is the top edge, `col` 0 the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn new(row: u8, col: u8) -> Result<Self, EngineError> {
        let coord = Self { row, col };
        coord.index()?;
        Ok(coord)
    }

    /// Row-major square index, or `OutOfBounds` for a coordinate off the grid.
    pub fn index(self) -> Result<usize, EngineError> {
        if (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE {
            Ok(self.row as usize * BOARD_SIZE + self.col as usize)
        } else {
            Err(EngineError::OutOfBounds {
                row: self.row,
                col: self.col,
            })
        }
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < NUM_SQUARES);
        Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Algebraic notation: columns a..h, rows 1..8.
        if self.index().is_err() {
            return write!(f, "({}, {})", self.row, self.col);
        }
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

/// Contents of one square. The discriminants are the cell codes used in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0,
    Dark = 1,
    Light = 2,
}

/// One of the two competing colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Dark,
    Light,
}

impl Side {
    pub fn symbol(self) -> Cell {
        match self {
            Side::Dark => Cell::Dark,
            Side::Light => Cell::Light,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Dark => Side::Light,
            Side::Light => Side::Dark,
        }
    }

    pub fn opponent_symbol(self) -> Cell {
        self.opponent().symbol()
    }
}

/// A registered competitor: a side plus the controller attributes around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub side: Side,
    pub automated: bool,
}

impl Player {
    pub fn human(name: impl Into<String>, side: Side) -> Self {
        Self {
            name: name.into(),
            side,
            automated: false,
        }
    }

    pub fn automated(name: impl Into<String>, side: Side) -> Self {
        Self {
            name: name.into(),
            side,
            automated: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Initializing,
    InProgress,
    Finished,
}

/// Result of comparing the two scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Winner(Side),
    Tie,
}

/// Read-only view of a match handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Cell codes in row-major order: 0=empty, 1=dark, 2=light.
    pub board: Vec<u8>,
    pub side_to_move: Side,
    pub state: GameState,
    pub dark_count: u8,
    pub light_count: u8,
    pub last_move: Option<Coord>,
    /// Squares flipped by the last move. Empty when nothing was played yet.
    pub flipped: Vec<Coord>,
    /// `true` when the last move left the opponent without a legal reply.
    pub opponent_passed: bool,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub outcome: Outcome,
    pub dark_count: u8,
    pub light_count: u8,
}
