//! Shape catalog: the seven tetrominoes and their spawn-orientation grids.

/// Tetromino types, numbered 1..=7 in catalog order (I, J, L, O, S, Z, T).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    I = 1,
    J = 2,
    L = 3,
    O = 4,
    S = 5,
    Z = 6,
    T = 7,
}

impl PieceType {
    pub const ALL: [Self; 7] = [Self::I, Self::J, Self::L, Self::O, Self::S, Self::Z, Self::T];

    /// Board identifier (1..=7).
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::J => "J",
            Self::L => "L",
            Self::O => "O",
            Self::S => "S",
            Self::Z => "Z",
            Self::T => "T",
        }
    }

    /// Canonical grid rows; `X` is an occupied cell.
    fn pattern(self) -> &'static [&'static str] {
        match self {
            Self::I => &["XXXX"],
            Self::J => &["X..", "XXX"],
            Self::L => &["..X", "XXX"],
            Self::O => &["XX", "XX"],
            Self::S => &[".XX", "XX."],
            Self::Z => &["XX.", ".XX"],
            Self::T => &[".X.", "XXX"],
        }
    }

    /// Spawn-orientation occupancy grid for this type.
    pub fn shape(self) -> Shape {
        Shape::from_rows(
            self.pattern()
                .iter()
                .map(|row| row.chars().map(|c| c == 'X').collect())
                .collect(),
        )
    }
}

/// Occupancy grid addressed `[row][col]`. Rows are always the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    /// Builds a grid, padding short rows with empty cells so the grid stays rectangular.
    pub fn from_rows(mut rows: Vec<Vec<bool>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, false);
        }
        Self { rows }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    /// Occupied cells as `(dx, dy)` offsets from the grid's top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(dx, _)| (dx as i32, dy as i32))
        })
    }
}

/// Catalog lookup: canonical spawn grid for `kind`.
pub fn shape_of(kind: PieceType) -> Shape {
    kind.shape()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_in_catalog_order() {
        for (i, kind) in PieceType::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, i + 1);
        }
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceType::ALL {
            assert_eq!(shape_of(kind).cells().count(), 4, "{}", kind.name());
        }
    }

    #[test]
    fn test_canonical_dimensions() {
        let i = shape_of(PieceType::I);
        assert_eq!((i.width(), i.height()), (4, 1));
        let o = shape_of(PieceType::O);
        assert_eq!((o.width(), o.height()), (2, 2));
        for kind in [PieceType::J, PieceType::L, PieceType::S, PieceType::Z, PieceType::T] {
            let s = shape_of(kind);
            assert_eq!((s.width(), s.height()), (3, 2), "{}", kind.name());
        }
    }

    #[test]
    fn test_t_cells() {
        let cells: Vec<_> = shape_of(PieceType::T).cells().collect();
        assert_eq!(cells, vec![(1, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_from_rows_pads_ragged_rows() {
        let s = Shape::from_rows(vec![vec![true], vec![true, true, true]]);
        assert_eq!(s.width(), 3);
        assert_eq!(s.rows()[0], vec![true, false, false]);
    }
}
