pub mod eval;
pub mod search;

use crate::error::EngineError;
use crate::game::Match;
use crate::types::Coord;

pub use search::{SearchAgent, SearchReport};

/// Picks a move for the side to move of an in-progress match.
pub trait MoveSelector: Send + Sync {
    fn select_move(&self, game: &Match) -> Result<Coord, EngineError>;
}

/// Plays the first legal move in row-major order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMove;

impl MoveSelector for FirstLegalMove {
    fn select_move(&self, game: &Match) -> Result<Coord, EngineError> {
        game.legal_moves(game.side_to_move())
            .first()
            .copied()
            .ok_or(EngineError::InvalidState("no legal moves"))
    }
}

impl MoveSelector for SearchAgent {
    fn select_move(&self, game: &Match) -> Result<Coord, EngineError> {
        self.choose_move(game)
    }
}
