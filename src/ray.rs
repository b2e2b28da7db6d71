//! Directional scanning shared by legality checks and flipping.

use once_cell::sync::Lazy;

use crate::types::{BOARD_SIZE, Cell, NUM_SQUARES, Side};

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// For every square, the squares met walking outward in each direction, nearest first.
static RAYS: Lazy<Vec<[Vec<u8>; 8]>> = Lazy::new(|| {
    (0..NUM_SQUARES)
        .map(|pos| {
            let (row, col) = pos_to_row_col(pos);
            std::array::from_fn(|d| {
                let (dr, dc) = DIRECTIONS[d];
                let mut squares = Vec::new();
                let (mut r, mut c) = (row + dr, col + dc);
                while in_bounds(r, c) {
                    squares.push((r as usize * BOARD_SIZE + c as usize) as u8);
                    r += dr;
                    c += dc;
                }
                squares
            })
        })
        .collect()
});

/// What a walk from a square in one direction runs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ray {
    /// The start square is on the edge in this direction.
    Edge,
    /// The neighbour is empty.
    Empty,
    /// The neighbour holds the mover's own disc.
    Own,
    /// A run of opponent discs closed by the mover's disc. `run` masks the run.
    Bracketed { run: u64 },
    /// A run of opponent discs that reaches an empty square or the edge.
    Open,
}

pub(crate) fn scan(cells: &[Cell; NUM_SQUARES], from: usize, direction: usize, side: Side) -> Ray {
    let own = side.symbol();
    let opp = side.opponent_symbol();
    let mut run = 0u64;

    for &square in &RAYS[from][direction] {
        let cell = cells[square as usize];
        if cell == opp {
            run |= bit(square as usize);
            continue;
        }

        return match (run == 0, cell == own) {
            (true, true) => Ray::Own,
            (true, false) => Ray::Empty,
            (false, true) => Ray::Bracketed { run },
            (false, false) => Ray::Open,
        };
    }

    if run == 0 { Ray::Edge } else { Ray::Open }
}

/// Union of every run `side` would flip by playing on `from`. Zero means the
/// square captures nothing. Occupancy of `from` itself is not checked.
pub(crate) fn captures(cells: &[Cell; NUM_SQUARES], from: usize, side: Side) -> u64 {
    (0..DIRECTIONS.len())
        .filter_map(|direction| match scan(cells, from, direction, side) {
            Ray::Bracketed { run } => Some(run),
            _ => None,
        })
        .fold(0, |flips, run| flips | run)
}

pub(crate) fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

/// Indices of the set bits, lowest first.
pub(crate) fn bitmask_to_indices(mask: u64) -> impl Iterator<Item = usize> {
    let mut bits = mask;
    std::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let idx = bits.trailing_zeros() as usize;
        bits &= bits - 1;
        Some(idx)
    })
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
