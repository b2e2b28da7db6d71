use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{EngineError, ParseBoardError};
use crate::ray::{self, bit, bitmask_to_indices};
use crate::types::{BOARD_SIZE, Cell, Coord, NUM_SQUARES, Side};

/// SHA-256 digest of the 64 cell codes.
pub type PositionHash = [u8; 32];

/// Reversi board: the 8x8 grid of cells plus the set of empty squares.
///
/// The empty set is a bitmask (bit `row * 8 + col`) kept in step with the grid
/// on every placement and revert, so it is always the complement of the
/// occupied squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; NUM_SQUARES],
    empty: u64,
}

/// One placed disc and the discs it flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    index: u8,
    side: Side,
    flipped: u64,
}

impl Placement {
    pub fn coord(&self) -> Coord {
        Coord::from_index(self.index as usize)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Flipped squares as a bitmask.
    pub fn flipped(&self) -> u64 {
        self.flipped
    }

    pub fn flipped_coords(&self) -> Vec<Coord> {
        bitmask_to_indices(self.flipped)
            .map(Coord::from_index)
            .collect()
    }
}

impl Board {
    /// Creates the initial board:
    /// d4=light, e4=dark, d5=dark, e5=light.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for (pos, cell) in [
            (27, Cell::Light),
            (28, Cell::Dark),
            (35, Cell::Dark),
            (36, Cell::Light),
        ] {
            board.set(pos, cell);
        }
        board
    }

    /// A board with no discs on it.
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; NUM_SQUARES],
            empty: u64::MAX,
        }
    }

    pub fn from_cells(cells: [Cell; NUM_SQUARES]) -> Self {
        let empty = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .fold(0u64, |mask, (pos, _)| mask | bit(pos));
        Self { cells, empty }
    }

    pub fn cell(&self, coord: Coord) -> Result<Cell, EngineError> {
        Ok(self.cells[coord.index()?])
    }

    /// Row-major read-only view of the grid.
    pub fn cells(&self) -> &[Cell; NUM_SQUARES] {
        &self.cells
    }

    /// Empty squares as a bitmask.
    pub fn empty_mask(&self) -> u64 {
        self.empty
    }

    /// Returns the legal move mask for the given side.
    pub fn legal_mask(&self, side: Side) -> u64 {
        bitmask_to_indices(self.empty)
            .filter(|&pos| ray::captures(&self.cells, pos, side) != 0)
            .fold(0u64, |legal, pos| legal | bit(pos))
    }

    /// Legal moves in ascending row-major order.
    pub fn legal_moves(&self, side: Side) -> Vec<Coord> {
        bitmask_to_indices(self.legal_mask(side))
            .map(Coord::from_index)
            .collect()
    }

    pub fn has_legal_move(&self, side: Side) -> bool {
        bitmask_to_indices(self.empty).any(|pos| ray::captures(&self.cells, pos, side) != 0)
    }

    /// On the board, empty, and bracketing at least one opponent run.
    pub fn is_legal_move(&self, coord: Coord, side: Side) -> bool {
        match coord.index() {
            Ok(pos) => self.empty & bit(pos) != 0 && ray::captures(&self.cells, pos, side) != 0,
            Err(_) => false,
        }
    }

    /// Places one disc and flips every bracketed run.
    /// Leaves the board untouched when the move is illegal.
    pub fn place(&mut self, coord: Coord, side: Side) -> Result<Placement, EngineError> {
        let pos = coord.index()?;
        if self.empty & bit(pos) == 0 {
            return Err(EngineError::IllegalMove(coord));
        }

        let flipped = ray::captures(&self.cells, pos, side);
        if flipped == 0 {
            return Err(EngineError::IllegalMove(coord));
        }

        self.set(pos, side.symbol());
        for square in bitmask_to_indices(flipped) {
            self.cells[square] = side.symbol();
        }

        Ok(Placement {
            index: pos as u8,
            side,
            flipped,
        })
    }

    /// Takes back a placement made on this board, restoring flipped discs.
    /// Placements must be reverted newest first, each exactly once.
    pub(crate) fn revert(&mut self, placement: &Placement) {
        self.set(placement.index as usize, Cell::Empty);
        for square in bitmask_to_indices(placement.flipped) {
            self.cells[square] = placement.side.opponent_symbol();
        }
    }

    /// Number of discs of the given side.
    pub fn count(&self, side: Side) -> u8 {
        let symbol = side.symbol();
        self.cells.iter().filter(|&&cell| cell == symbol).count() as u8
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        self.empty.count_ones() as u8
    }

    /// `count(side) - count(opponent)`.
    pub fn disc_difference(&self, side: Side) -> i32 {
        self.count(side) as i32 - self.count(side.opponent()) as i32
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=dark, 2=light.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        self.cells.map(|cell| cell as u8)
    }

    pub fn position_hash(&self) -> PositionHash {
        Sha256::digest(self.to_array()).into()
    }

    fn set(&mut self, pos: usize, cell: Cell) {
        self.cells[pos] = cell;
        if cell == Cell::Empty {
            self.empty |= bit(pos);
        } else {
            self.empty &= !bit(pos);
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a diagram of 64 squares, whitespace ignored:
/// `X` or `B` for dark, `O` or `W` for light, `.` or `-` for empty.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if symbols.len() != NUM_SQUARES {
            return Err(ParseBoardError::Length(symbols.len()));
        }

        let mut cells = [Cell::Empty; NUM_SQUARES];
        for (cell, symbol) in cells.iter_mut().zip(symbols) {
            *cell = match symbol {
                'X' | 'B' => Cell::Dark,
                'O' | 'W' => Cell::Light,
                '.' | '-' => Cell::Empty,
                other => return Err(ParseBoardError::Symbol(other)),
            };
        }
        Ok(Self::from_cells(cells))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(BOARD_SIZE) {
            for cell in row {
                let symbol = match cell {
                    Cell::Empty => '.',
                    Cell::Dark => 'X',
                    Cell::Light => 'O',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: u8, col: u8) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn assert_empty_set_consistent(board: &Board) {
        for (pos, cell) in board.cells().iter().enumerate() {
            assert_eq!(
                board.empty_mask() & bit(pos) != 0,
                *cell == Cell::Empty,
                "square {pos}"
            );
        }
    }

    #[test]
    fn initial_dark_legal_moves_are_four_expected_squares() {
        let board = Board::new();

        // d3, c4, f5, e6
        let expected = vec![at(2, 3), at(3, 2), at(4, 5), at(5, 4)];

        assert_eq!(board.legal_moves(Side::Dark), expected);
        assert_eq!(board.legal_moves(Side::Light).len(), 4);
        assert_empty_set_consistent(&board);
    }

    #[test]
    fn place_flips_opponent_discs_and_updates_counts() {
        let mut board = Board::new();

        let placement = board.place(at(2, 3), Side::Dark).unwrap();

        assert_eq!(placement.flipped_coords(), vec![at(3, 3)]);
        assert_eq!(board.count(Side::Dark), 4);
        assert_eq!(board.count(Side::Light), 1);
        assert_eq!(board.empty_count(), 59);
        assert_empty_set_consistent(&board);

        let cells = board.to_array();
        assert_eq!(cells[19], 1);
        assert_eq!(cells[27], 1);
        assert_eq!(cells[28], 1);
        assert_eq!(cells[35], 1);
        assert_eq!(cells[36], 2);
    }

    #[test]
    fn illegal_place_returns_error_and_keeps_board_unchanged() {
        let mut board = Board::new();
        let before = board;

        assert_eq!(
            board.place(at(0, 0), Side::Dark),
            Err(EngineError::IllegalMove(at(0, 0)))
        );
        assert_eq!(
            board.place(at(3, 3), Side::Dark),
            Err(EngineError::IllegalMove(at(3, 3)))
        );
        assert_eq!(
            board.place(Coord { row: 8, col: 2 }, Side::Dark),
            Err(EngineError::OutOfBounds { row: 8, col: 2 })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn revert_restores_placed_and_flipped_discs() {
        let mut board: Board = "
            ........
            ........
            ..OOOX..
            ..XOX...
            ..OOOX..
            ........
            ........
            ........"
            .parse()
            .unwrap();
        let before = board;

        let placement = board.place(at(4, 1), Side::Dark).unwrap();
        assert_eq!(placement.flipped_coords(), vec![at(4, 2), at(4, 3), at(4, 4)]);
        board.revert(&placement);

        assert_eq!(board, before);
        assert_empty_set_consistent(&board);
    }

    fn assert_legality_agrees(board: &Board) {
        for side in [Side::Dark, Side::Light] {
            let legal = board.legal_moves(side);
            for pos in 0..NUM_SQUARES {
                let coord = Coord::from_index(pos);
                assert_eq!(
                    board.is_legal_move(coord, side),
                    legal.contains(&coord),
                    "{side:?} at {coord}\n{board}"
                );
            }
        }
    }

    #[test]
    fn off_board_squares_are_never_legal() {
        let board = Board::new();

        assert!(!board.is_legal_move(Coord { row: 0, col: 8 }, Side::Dark));
        assert!(!board.is_legal_move(Coord { row: 8, col: 0 }, Side::Light));
    }

    #[test]
    fn played_out_game_keeps_counts_and_legality_consistent() {
        let mut board = Board::new();
        let mut side = Side::Dark;
        assert_legality_agrees(&board);

        while let Some(&coord) = board.legal_moves(side).first() {
            board.place(coord, side).unwrap();
            let total = board.count(Side::Dark) + board.count(Side::Light) + board.empty_count();
            assert_eq!(total, 64);
            assert_legality_agrees(&board);
            assert_empty_set_consistent(&board);
            side = side.opponent();
            if !board.has_legal_move(side) {
                side = side.opponent();
            }
        }
    }

    #[test]
    fn position_hash_tracks_grid_contents() {
        let a = Board::new();
        let mut b = Board::new();
        assert_eq!(a.position_hash(), b.position_hash());

        let placement = b.place(at(2, 3), Side::Dark).unwrap();
        assert_ne!(a.position_hash(), b.position_hash());

        b.revert(&placement);
        assert_eq!(a.position_hash(), b.position_hash());
    }

    #[test]
    fn parse_rejects_bad_diagrams() {
        assert_eq!("X.O".parse::<Board>(), Err(ParseBoardError::Length(3)));
        let bad = format!("{}Z", ".".repeat(63));
        assert_eq!(bad.parse::<Board>(), Err(ParseBoardError::Symbol('Z')));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let board = Board::new();

        assert_eq!(board.to_string().parse::<Board>(), Ok(board));
    }
}
