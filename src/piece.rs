//! Active piece: type, current grid and board-relative origin; rotation and spawning.

use crate::shapes::{PieceType, Shape, shape_of};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies the type of each newly spawned piece.
pub trait PieceSource {
    fn next_type(&mut self) -> PieceType;
}

/// Uniform choice over the seven types.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Seeded when `seed` is given (reproducible sequence), otherwise from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl PieceSource for RandomSource {
    fn next_type(&mut self) -> PieceType {
        PieceType::ALL[self.rng.gen_range(0..PieceType::ALL.len())]
    }
}

/// A live tetromino. `x`/`y` is the top-left of `shape` on the board; `y` may be negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceType,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Piece of `kind` in spawn orientation, centred horizontally at row 0.
    pub fn new(kind: PieceType, board_width: usize) -> Self {
        let shape = shape_of(kind);
        let x = (board_width / 2) as i32 - shape.width().div_ceil(2) as i32;
        Self { kind, shape, x, y: 0 }
    }

    /// Draws the next type from `source` and places it at the spawn position.
    pub fn spawn(board_width: usize, source: &mut impl PieceSource) -> Self {
        Self::new(source.next_type(), board_width)
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.cells().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }
}

/// Quarter turn: transpose, then reverse the row order. Width and height swap.
pub fn rotate(shape: &Shape) -> Shape {
    let (w, h) = (shape.width(), shape.height());
    let rows = shape.rows();
    let mut out: Vec<Vec<bool>> = (0..w).map(|c| (0..h).map(|r| rows[r][c]).collect()).collect();
    out.reverse();
    Shape::from_rows(out)
}

/// Replays a fixed list of types, cycling when exhausted.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct Sequence {
    kinds: Vec<PieceType>,
    next: usize,
}

#[cfg(test)]
impl Sequence {
    pub(crate) fn new(kinds: &[PieceType]) -> Self {
        Self { kinds: kinds.to_vec(), next: 0 }
    }
}

#[cfg(test)]
impl PieceSource for Sequence {
    fn next_type(&mut self) -> PieceType {
        let kind = self.kinds[self.next % self.kinds.len()];
        self.next += 1;
        kind
    }
}
