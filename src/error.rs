use crate::types::Coord;

/// Errors reported by board and match operations.
///
/// All of these are recoverable: the caller decides whether to surface them
/// (for example, ignore a click on an illegal square).
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("square ({row}, {col}) is off the board")]
    OutOfBounds { row: u8, col: u8 },

    #[error("illegal move at {0}")]
    IllegalMove(Coord),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("no move to undo")]
    NoMoveToUndo,
}

/// Errors from parsing a board diagram.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("expected 64 squares, found {0}")]
    Length(usize),

    #[error("unknown square symbol {0:?}")]
    Symbol(char),
}
