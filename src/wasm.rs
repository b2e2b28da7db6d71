//! JavaScript bindings for a browser front end.

use wasm_bindgen::prelude::*;

use crate::ai::SearchAgent;
use crate::config::MatchConfig;
use crate::game::Match;
use crate::types::Coord;

#[wasm_bindgen]
pub struct WasmMatch {
    game: Match,
    agent: Option<SearchAgent>,
}

#[wasm_bindgen]
impl WasmMatch {
    /// `config` is a serialized [`MatchConfig`]; `undefined` selects
    /// [`MatchConfig::interactive`].
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmMatch, JsError> {
        let config: MatchConfig = if config.is_undefined() || config.is_null() {
            MatchConfig::interactive()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        Ok(Self {
            game: Match::from_config(&config)?,
            agent: config
                .automated
                .map(|side| SearchAgent::new(side, config.search)),
        })
    }

    pub fn legal_moves(&self) -> Result<JsValue, JsError> {
        let moves = self.game.legal_moves(self.game.side_to_move());
        Ok(serde_wasm_bindgen::to_value(&moves)?)
    }

    /// Plays a human move. Returns `true` when it ended the game.
    pub fn place(&mut self, row: u8, col: u8) -> Result<bool, JsError> {
        if self.game.side_to_move_is_automated() {
            return Err(JsError::new("it is not the player's turn"));
        }
        let coord = Coord::new(row, col)?;
        let side = self.game.side_to_move();
        Ok(self.game.apply_move(coord, side)?)
    }

    /// Lets the search agent move. Returns `true` when it ended the game.
    pub fn ai_move(&mut self) -> Result<bool, JsError> {
        let agent = self
            .agent
            .ok_or_else(|| JsError::new("no side is automated"))?;
        let coord = agent.choose_move(&self.game)?;
        Ok(self.game.apply_move(coord, agent.side())?)
    }

    pub fn undo(&mut self) -> Result<(), JsError> {
        Ok(self.game.undo_last_move()?)
    }

    pub fn is_ai_turn(&self) -> bool {
        !self.game.is_game_over() && self.game.side_to_move_is_automated()
    }

    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.game.snapshot())?)
    }

    pub fn result(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.game.result())?)
    }

    /// Hex-encoded position hash.
    pub fn position_hash(&self) -> String {
        self.game
            .position_hash()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}
