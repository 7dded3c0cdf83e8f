//! Board: fixed grid of locked cells, collision test, merge and line clear.

use crate::piece::Piece;
use crate::shapes::{PieceType, Shape};
use std::collections::VecDeque;

/// Single cell: empty or locked by a piece of the given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceType),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// y=0 is the top row; rows are stored [0..height].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
}

impl Board {
    /// Width is at least one column.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let rows = (0..height).map(|_| vec![Cell::Empty; width]).collect();
        Self { width, height, rows }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `None` when (x, y) is off the board.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows.get(y as usize).and_then(|row| row.get(x as usize)).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn filled_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_filled()).count()
    }

    /// True if `shape` placed at (x, y) leaves the board sideways or through the floor,
    /// or overlaps a locked cell. Cells above row 0 only count against the side walls.
    pub fn collides(&self, x: i32, y: i32, shape: &Shape) -> bool {
        shape.cells().any(|(dx, dy)| {
            let (cx, cy) = (x + dx, y + dy);
            if cx < 0 || cx >= self.width as i32 || cy >= self.height as i32 {
                return true;
            }
            cy >= 0 && self.get(cx, cy).is_some_and(Cell::is_filled)
        })
    }

    /// Writes the piece's type into every occupied cell at row >= 0; cells above the top are dropped.
    pub fn merge(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            if x < 0 || y < 0 {
                continue;
            }
            if let Some(cell) = self.rows.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
                *cell = Cell::Filled(piece.kind);
            }
        }
    }

    /// Indices of rows with every cell filled, top to bottom.
    pub fn full_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|c| c.is_filled()))
            .map(|(y, _)| y)
            .collect()
    }

    /// Removes every full row, shifting the rows above down and inserting empty rows at the top.
    /// Returns the number of rows removed.
    pub fn clear_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.height;
        while y > 0 {
            let row = y - 1;
            if self.rows[row].iter().all(|c| c.is_filled()) {
                self.rows.remove(row);
                self.rows.push_front(vec![Cell::Empty; self.width]);
                cleared += 1;
                // same index again: the row above has shifted into it
                continue;
            }
            y -= 1;
        }
        cleared
    }

    #[cfg(test)]
    pub(crate) fn fill_row(&mut self, y: usize, kind: PieceType) {
        self.rows[y].fill(Cell::Filled(kind));
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y][x] = cell;
    }
}
