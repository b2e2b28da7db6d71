use log::{info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Placement, PositionHash};
use crate::config::{FirstMover, MatchConfig};
use crate::error::EngineError;
use crate::types::{
    Cell, Coord, GameState, MatchResult, NUM_SQUARES, Outcome, Player, Side, Snapshot,
};

/// Everything needed to take back one applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    placement: Placement,
    opponent_passed: bool,
    ended_game: bool,
}

impl MoveRecord {
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// The opponent had no reply, so the mover kept the turn (or the game ended).
    pub fn opponent_passed(&self) -> bool {
        self.opponent_passed
    }

    pub fn ended_game(&self) -> bool {
        self.ended_game
    }
}

/// One game: the board, both registered players, whose turn it is, and the
/// last applied move (one level of undo).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    board: Board,
    players: Option<[Player; 2]>,
    side_to_move: Side,
    state: GameState,
    discs_placed: bool,
    last_move: Option<MoveRecord>,
}

impl Match {
    /// An empty board with no players; call [`initialize`](Self::initialize)
    /// and [`register_sides`](Self::register_sides) to start.
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            players: None,
            side_to_move: Side::Dark,
            state: GameState::Initializing,
            discs_placed: false,
            last_move: None,
        }
    }

    /// Dark ("Dark") against light ("Light"), already in progress.
    pub fn from_config(config: &MatchConfig) -> Result<Self, EngineError> {
        let mut game = Self::new();
        game.initialize();

        let automated = |side: Side| config.automated == Some(side);
        let dark = Player {
            name: "Dark".to_string(),
            side: Side::Dark,
            automated: automated(Side::Dark),
        };
        let light = Player {
            name: "Light".to_string(),
            side: Side::Light,
            automated: automated(Side::Light),
        };

        match config.first_mover {
            FirstMover::SideA => game.register_sides(dark, light)?,
            FirstMover::Random { seed } => {
                game.register_sides_with(dark, light, &mut StdRng::seed_from_u64(seed))?
            }
        }
        Ok(game)
    }

    /// Starts a match from an arbitrary position. If `to_move` has no legal
    /// move the turn passes; if neither side can move the match is finished.
    pub fn from_position(
        board: Board,
        players: [Player; 2],
        to_move: Side,
    ) -> Result<Self, EngineError> {
        let [a, b] = players;
        check_distinct(&a, &b)?;

        let mut game = Self {
            board,
            players: Some([a, b]),
            side_to_move: to_move,
            state: GameState::InProgress,
            discs_placed: true,
            last_move: None,
        };
        game.settle_turn();
        Ok(game)
    }

    /// Places the four starting discs. Calling it again does nothing.
    pub fn initialize(&mut self) {
        if self.discs_placed {
            return;
        }
        self.board = Board::new();
        self.discs_placed = true;
        self.try_start();
    }

    /// Registers both players; `side_a` moves first.
    pub fn register_sides(&mut self, side_a: Player, side_b: Player) -> Result<(), EngineError> {
        let first = side_a.side;
        self.register(side_a, side_b, first)
    }

    /// Registers both players and lets `rng` pick who moves first.
    pub fn register_sides_with<R: Rng + ?Sized>(
        &mut self,
        side_a: Player,
        side_b: Player,
        rng: &mut R,
    ) -> Result<(), EngineError> {
        let first = if rng.gen_bool(0.5) { side_a.side } else { side_b.side };
        self.register(side_a, side_b, first)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cells(&self) -> &[Cell; NUM_SQUARES] {
        self.board.cells()
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::Finished
    }

    pub fn players(&self) -> Option<&[Player; 2]> {
        self.players.as_ref()
    }

    pub fn player(&self, side: Side) -> Option<&Player> {
        self.players.as_ref()?.iter().find(|player| player.side == side)
    }

    pub fn side_to_move_is_automated(&self) -> bool {
        self.player(self.side_to_move)
            .is_some_and(|player| player.automated)
    }

    pub fn legal_moves(&self, side: Side) -> Vec<Coord> {
        self.board.legal_moves(side)
    }

    pub fn is_legal_move(&self, coord: Coord, side: Side) -> bool {
        self.board.is_legal_move(coord, side)
    }

    pub fn score(&self, side: Side) -> u8 {
        self.board.count(side)
    }

    pub fn winner(&self) -> Outcome {
        match self.board.disc_difference(Side::Dark) {
            diff if diff > 0 => Outcome::Winner(Side::Dark),
            diff if diff < 0 => Outcome::Winner(Side::Light),
            _ => Outcome::Tie,
        }
    }

    pub fn position_hash(&self) -> PositionHash {
        self.board.position_hash()
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.last_move.as_ref()
    }

    pub fn last_move_skipped_opponent(&self) -> bool {
        self.last_move.is_some_and(|record| record.opponent_passed)
    }

    /// Plays `coord` for `side` and remembers it for [`undo_last_move`](Self::undo_last_move).
    /// Returns `true` when the move ended the game.
    pub fn apply_move(&mut self, coord: Coord, side: Side) -> Result<bool, EngineError> {
        let record = self.make_move(coord, side)?;
        self.last_move = Some(record);

        if record.ended_game {
            info!(
                "game finished: dark {} light {} ({:?})",
                self.score(Side::Dark),
                self.score(Side::Light),
                self.winner()
            );
        }
        Ok(record.ended_game)
    }

    /// Reverses the most recent [`apply_move`](Self::apply_move), flipped discs included.
    /// Only one move is remembered.
    pub fn undo_last_move(&mut self) -> Result<(), EngineError> {
        let record = self.last_move.take().ok_or(EngineError::NoMoveToUndo)?;
        self.unmake_move(&record);
        Ok(())
    }

    /// Plays a move and forgets the remembered last move, since it no longer
    /// sits on top. The returned record must be handed back to
    /// [`unmake_move`](Self::unmake_move) before any earlier record is.
    pub(crate) fn make_move(&mut self, coord: Coord, side: Side) -> Result<MoveRecord, EngineError> {
        if self.state != GameState::InProgress {
            return Err(EngineError::InvalidState("match is not in progress"));
        }
        coord.index()?;
        if side != self.side_to_move {
            return Err(EngineError::InvalidState("side is not to move"));
        }

        let placement = self.board.place(coord, side)?;
        trace!("{side:?} plays {coord}, flipping {}", placement.flipped().count_ones());

        let mut opponent_passed = false;
        let mut ended_game = false;
        self.side_to_move = side.opponent();
        if !self.board.has_legal_move(self.side_to_move) {
            opponent_passed = true;
            self.side_to_move = side;
            if !self.board.has_legal_move(side) {
                ended_game = true;
                self.state = GameState::Finished;
            }
        }

        self.last_move = None;
        Ok(MoveRecord {
            placement,
            opponent_passed,
            ended_game,
        })
    }

    pub(crate) fn unmake_move(&mut self, record: &MoveRecord) {
        self.board.revert(&record.placement);
        self.side_to_move = record.placement.side();
        self.state = GameState::InProgress;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.to_array().to_vec(),
            side_to_move: self.side_to_move,
            state: self.state,
            dark_count: self.score(Side::Dark),
            light_count: self.score(Side::Light),
            last_move: self.last_move.map(|record| record.placement.coord()),
            flipped: self
                .last_move
                .map(|record| record.placement.flipped_coords())
                .unwrap_or_default(),
            opponent_passed: self.last_move_skipped_opponent(),
        }
    }

    pub fn result(&self) -> MatchResult {
        MatchResult {
            outcome: self.winner(),
            dark_count: self.score(Side::Dark),
            light_count: self.score(Side::Light),
        }
    }

    fn register(&mut self, side_a: Player, side_b: Player, first: Side) -> Result<(), EngineError> {
        if self.players.is_some() {
            return Err(EngineError::InvalidState("sides are already registered"));
        }
        check_distinct(&side_a, &side_b)?;

        self.players = Some([side_a, side_b]);
        self.side_to_move = first;
        self.try_start();
        Ok(())
    }

    fn try_start(&mut self) {
        if self.state == GameState::Initializing && self.discs_placed && self.players.is_some() {
            self.state = GameState::InProgress;
            self.settle_turn();
        }
    }

    fn settle_turn(&mut self) {
        if self.board.has_legal_move(self.side_to_move) {
            return;
        }
        let other = self.side_to_move.opponent();
        if self.board.has_legal_move(other) {
            self.side_to_move = other;
        } else {
            self.state = GameState::Finished;
        }
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

fn check_distinct(a: &Player, b: &Player) -> Result<(), EngineError> {
    if a.side == b.side {
        return Err(EngineError::InvalidState("both players have the same side"));
    }
    Ok(())
}
