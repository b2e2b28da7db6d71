use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::types::{Cell, NUM_SQUARES, Side};

/// Scale applied to the final disc margin under [`Evaluation::Positional`], so
/// a decided game outweighs any square-weight total.
const TERMINAL_SCALE: i32 = 1_000;

#[rustfmt::skip]
const SQUARE_WEIGHTS: [i32; NUM_SQUARES] = [
    100, -20,  10,   5,   5,  10, -20, 100,
    -20, -50,  -2,  -2,  -2,  -2, -50, -20,
     10,  -2,  -1,  -1,  -1,  -1,  -2,  10,
      5,  -2,  -1,  -1,  -1,  -1,  -2,   5,
      5,  -2,  -1,  -1,  -1,  -1,  -2,   5,
     10,  -2,  -1,  -1,  -1,  -1,  -2,  10,
    -20, -50,  -2,  -2,  -2,  -2, -50, -20,
    100, -20,  10,   5,   5,  10, -20, 100,
];

/// Static evaluation applied at the search horizon, always from `side`'s view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Evaluation {
    /// Own discs minus opponent discs.
    #[default]
    DiscDifference,
    /// Square weights favouring corners and edges, penalising squares next to corners.
    Positional,
}

impl Evaluation {
    pub fn evaluate(self, board: &Board, side: Side) -> i32 {
        match self {
            Self::DiscDifference => board.disc_difference(side),
            Self::Positional => positional_score(board, side),
        }
    }

    /// Score of a finished game.
    pub fn terminal(self, board: &Board, side: Side) -> i32 {
        match self {
            Self::DiscDifference => board.disc_difference(side),
            Self::Positional => board.disc_difference(side) * TERMINAL_SCALE,
        }
    }
}

fn positional_score(board: &Board, side: Side) -> i32 {
    let own = side.symbol();
    board
        .cells()
        .iter()
        .zip(SQUARE_WEIGHTS)
        .map(|(&cell, weight)| match cell {
            Cell::Empty => 0,
            cell if cell == own => weight,
            _ => -weight,
        })
        .sum()
}
