use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
mod ray;
pub mod types;
pub mod wasm;

pub use ai::{FirstLegalMove, MoveSelector, SearchAgent, SearchReport};
pub use board::{Board, Placement, PositionHash};
pub use config::{FirstMover, MatchConfig, SearchConfig};
pub use error::EngineError;
pub use game::{Match, MoveRecord};
pub use types::{Cell, Coord, GameState, MatchResult, Outcome, Player, Side, Snapshot};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
