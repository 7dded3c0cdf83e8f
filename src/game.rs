//! Game state machine: board, active piece, score; gravity, moves, locking and restart.

use crate::board::Board;
use crate::piece::{Piece, PieceSource, RandomSource, rotate};
use tracing::{debug, info};

/// Points per row, multiplied by the number of rows one lock clears.
pub const POINTS_PER_LINE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    GameOver,
}

/// Player commands accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    Restart,
}

/// The most recent lock that cleared rows. `serial` increases with every such lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    pub serial: u64,
    /// Board rows that were full at lock time, top to bottom.
    pub rows: Vec<usize>,
}

#[derive(Debug)]
pub struct GameState<S = RandomSource> {
    board: Board,
    piece: Piece,
    score: u32,
    lines: u32,
    phase: Phase,
    last_clear: Option<LineClear>,
    clear_serial: u64,
    source: S,
}

impl<S: PieceSource> GameState<S> {
    pub fn new(width: usize, height: usize, mut source: S) -> Self {
        let piece = Piece::spawn(width, &mut source);
        info!(width, height, first = piece.kind.name(), "new game");
        Self {
            board: Board::new(width, height),
            piece,
            score: 0,
            lines: 0,
            phase: Phase::Running,
            last_clear: None,
            clear_serial: 0,
            source,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Rows cleared since the game started.
    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase() == Phase::GameOver
    }

    pub fn last_clear(&self) -> Option<&LineClear> {
        self.last_clear.as_ref()
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::SoftDrop => self.soft_drop(),
            Command::Rotate => self.rotate(),
            Command::HardDrop => self.hard_drop(),
            Command::Restart => self.restart(),
        }
    }

    /// Gravity step: move down one row, or lock when the row below is blocked.
    pub fn tick(&mut self) {
        if self.is_over() {
            return;
        }
        let p = &self.piece;
        if self.board.collides(p.x, p.y + 1, &p.shape) {
            self.lock_piece();
        } else {
            self.piece.y += 1;
        }
    }

    pub fn move_left(&mut self) {
        self.shift(-1);
    }

    pub fn move_right(&mut self) {
        self.shift(1);
    }

    fn shift(&mut self, dx: i32) {
        if self.is_over() {
            return;
        }
        let p = &self.piece;
        if !self.board.collides(p.x + dx, p.y, &p.shape) {
            self.piece.x += dx;
        }
    }

    pub fn soft_drop(&mut self) {
        self.tick();
    }

    /// Rotation in place; rejected (no kicks) when the turned shape would collide.
    pub fn rotate(&mut self) {
        if self.is_over() {
            return;
        }
        let rotated = rotate(&self.piece.shape);
        if !self.board.collides(self.piece.x, self.piece.y, &rotated) {
            self.piece.shape = rotated;
        }
    }

    /// Drop to the lowest free row and lock in one call.
    pub fn hard_drop(&mut self) {
        if self.is_over() {
            return;
        }
        while !self.board.collides(self.piece.x, self.piece.y + 1, &self.piece.shape) {
            self.piece.y += 1;
        }
        self.tick();
    }

    pub fn restart(&mut self) {
        let (width, height) = (self.board.width(), self.board.height());
        self.board = Board::new(width, height);
        self.piece = Piece::spawn(width, &mut self.source);
        self.score = 0;
        self.lines = 0;
        self.phase = Phase::Running;
        self.last_clear = None;
        info!(first = self.piece.kind.name(), "restart");
    }

    fn lock_piece(&mut self) {
        self.board.merge(&self.piece);
        debug!(kind = self.piece.kind.name(), x = self.piece.x, y = self.piece.y, "lock");

        let rows = self.board.full_rows();
        let cleared = self.board.clear_lines();
        if cleared > 0 {
            let points = POINTS_PER_LINE * cleared as u32;
            self.score = self.score.saturating_add(points);
            self.lines = self.lines.saturating_add(cleared as u32);
            self.clear_serial += 1;
            self.last_clear = Some(LineClear {
                serial: self.clear_serial,
                rows,
            });
            info!(cleared, points, score = self.score, "lines cleared");
        }

        self.piece = Piece::spawn(self.board.width(), &mut self.source);
        debug!(kind = self.piece.kind.name(), x = self.piece.x, "spawn");
        if self.board.collides(self.piece.x, self.piece.y, &self.piece.shape) {
            self.phase = Phase::GameOver;
            info!(
                score = self.score,
                lines = self.lines,
                filled = self.board.filled_count(),
                "game over"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::piece::Sequence;
    use crate::shapes::{PieceType, shape_of};

    fn game(width: usize, height: usize, kinds: &[PieceType]) -> GameState<Sequence> {
        GameState::new(width, height, Sequence::new(kinds))
    }

    #[test]
    fn test_initial_state() {
        let g = game(10, 20, &[PieceType::T]);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.score(), 0);
        assert_eq!(g.board().filled_count(), 0);
        assert_eq!((g.piece().x, g.piece().y), (3, 0));
    }

    #[test]
    fn test_o_piece_falls_and_locks_on_floor() {
        let mut g = game(10, 20, &[PieceType::O, PieceType::T]);
        assert_eq!((g.piece().kind, g.piece().x, g.piece().y), (PieceType::O, 4, 0));
        for _ in 0..18 {
            g.tick();
        }
        assert_eq!(g.piece().y, 18);
        assert_eq!(g.board().filled_count(), 0);

        g.tick();
        for (x, y) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
            assert_eq!(g.board().get(x, y), Some(Cell::Filled(PieceType::O)));
        }
        assert_eq!(g.board().filled_count(), 4);
        assert_eq!(g.score(), 0);
        assert_eq!(g.last_clear(), None);
        assert_eq!(g.piece().kind, PieceType::T);
        assert_eq!(g.piece().y, 0);
        assert_eq!(g.phase(), Phase::Running);
    }

    #[test]
    fn test_moves_stop_at_walls() {
        let mut g = game(10, 20, &[PieceType::O]);
        for _ in 0..10 {
            g.move_left();
        }
        assert_eq!(g.piece().x, 0);
        for _ in 0..10 {
            g.move_right();
        }
        assert_eq!(g.piece().x, 8);
    }

    #[test]
    fn test_move_blocked_by_locked_cells() {
        let mut g = game(6, 6, &[PieceType::O]);
        g.move_left();
        g.move_left();
        g.hard_drop();
        assert_eq!(g.board().get(0, 5), Some(Cell::Filled(PieceType::O)));
        // fresh O at x=2; drop it beside the first one and try to push into it
        for _ in 0..4 {
            g.tick();
        }
        assert_eq!((g.piece().x, g.piece().y), (2, 4));
        g.move_left();
        assert_eq!(g.piece().x, 2);
    }

    #[test]
    fn test_move_right_blocked_by_locked_cells() {
        let mut g = game(6, 6, &[PieceType::O]);
        g.move_right();
        g.move_right();
        g.hard_drop();
        assert_eq!(g.board().get(5, 5), Some(Cell::Filled(PieceType::O)));
        for _ in 0..4 {
            g.tick();
        }
        assert_eq!((g.piece().x, g.piece().y), (2, 4));
        g.move_right();
        assert_eq!(g.piece().x, 2);
    }

    #[test]
    fn test_rotate_applies_when_free() {
        let mut g = game(10, 20, &[PieceType::I]);
        g.rotate();
        assert_eq!((g.piece().shape.width(), g.piece().shape.height()), (1, 4));
        assert_eq!(g.piece().x, 3);
    }

    #[test]
    fn test_rotate_rejected_without_kick() {
        let mut g = game(10, 20, &[PieceType::I]);
        for _ in 0..19 {
            g.tick();
        }
        assert_eq!(g.piece().y, 19);
        g.rotate();
        assert_eq!(g.piece().shape, shape_of(PieceType::I));
        assert_eq!((g.piece().x, g.piece().y), (3, 19));
    }

    #[test]
    fn test_rotate_rejected_by_locked_cell() {
        let mut g = game(10, 20, &[PieceType::I]);
        g.board.set(3, 2, Cell::Filled(PieceType::O));
        g.rotate();
        assert_eq!(g.piece().shape, shape_of(PieceType::I));
        assert_eq!((g.piece().x, g.piece().y), (3, 0));
    }

    #[test]
    fn test_soft_drop_matches_tick() {
        let mut a = game(10, 20, &[PieceType::S, PieceType::Z]);
        let mut b = game(10, 20, &[PieceType::S, PieceType::Z]);
        for _ in 0..25 {
            a.tick();
            b.soft_drop();
            assert_eq!(a.piece(), b.piece());
            assert_eq!(a.board(), b.board());
        }
    }

    #[test]
    fn test_hard_drop_merges_every_type() {
        for kind in PieceType::ALL {
            let mut g = game(10, 20, &[kind, PieceType::O]);
            g.hard_drop();
            assert_eq!(g.board().filled_count(), 4, "{}", kind.name());
            assert_eq!(g.piece().kind, PieceType::O);
            assert_eq!(g.piece().y, 0);
        }
    }

    #[test]
    fn test_hard_drop_onto_stack() {
        let mut g = game(10, 20, &[PieceType::O]);
        g.hard_drop();
        g.hard_drop();
        assert_eq!(g.board().filled_count(), 8);
        assert_eq!(g.board().get(4, 16), Some(Cell::Filled(PieceType::O)));
        assert_eq!(g.board().get(4, 15), Some(Cell::Empty));
    }

    #[test]
    fn test_single_line_scores_100() {
        let mut g = game(4, 4, &[PieceType::O]);
        g.board.set(2, 3, Cell::Filled(PieceType::J));
        g.board.set(3, 3, Cell::Filled(PieceType::J));
        g.move_left();
        g.hard_drop();
        assert_eq!(g.score(), 100);
        assert_eq!(g.lines(), 1);
        assert_eq!(g.last_clear().map(|c| c.rows.clone()), Some(vec![3]));
        // the O's upper half shifted down into the bottom row
        assert_eq!(g.board().get(0, 3), Some(Cell::Filled(PieceType::O)));
        assert_eq!(g.board().get(2, 3), Some(Cell::Empty));
        assert_eq!(g.board().filled_count(), 2);
    }

    #[test]
    fn test_triple_in_one_lock_scores_300() {
        let mut g = game(4, 6, &[PieceType::I, PieceType::O]);
        for y in 3..6 {
            for x in 1..4 {
                g.board.set(x, y, Cell::Filled(PieceType::L));
            }
        }
        assert_eq!(g.piece().x, 0);
        g.rotate();
        g.hard_drop();
        assert_eq!(g.score(), 300);
        assert_eq!(g.lines(), 3);
        let clear = g.last_clear().cloned();
        assert_eq!(clear, Some(LineClear { serial: 1, rows: vec![3, 4, 5] }));
        // only the I's top cell survives, shifted from row 2 to row 5
        assert_eq!(g.board().filled_count(), 1);
        assert_eq!(g.board().get(0, 5), Some(Cell::Filled(PieceType::I)));
    }

    #[test]
    fn test_top_out_ends_game() {
        let mut g = game(4, 4, &[PieceType::O]);
        g.hard_drop();
        assert_eq!(g.phase(), Phase::Running);
        g.hard_drop();
        assert_eq!(g.phase(), Phase::GameOver);
        assert!(g.is_over());
        assert_eq!(g.board().filled_count(), 8);
    }

    #[test]
    fn test_game_over_is_inert() {
        let mut g = game(4, 4, &[PieceType::O]);
        g.hard_drop();
        g.hard_drop();
        assert!(g.is_over());

        let board = g.board().clone();
        let piece = g.piece().clone();
        for cmd in [
            Command::MoveLeft,
            Command::MoveRight,
            Command::SoftDrop,
            Command::Rotate,
            Command::HardDrop,
        ] {
            g.apply(cmd);
        }
        g.tick();
        assert_eq!(g.board(), &board);
        assert_eq!(g.piece(), &piece);
        assert!(g.is_over());
    }

    #[test]
    fn test_restart_from_game_over() {
        let mut g = game(4, 4, &[PieceType::O]);
        g.board.set(2, 3, Cell::Filled(PieceType::J));
        g.board.set(3, 3, Cell::Filled(PieceType::J));
        g.move_left();
        g.hard_drop();
        g.hard_drop();
        g.hard_drop();
        assert!(g.is_over());
        assert_eq!(g.score(), 100);

        g.apply(Command::Restart);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.score(), 0);
        assert_eq!(g.lines(), 0);
        assert_eq!(g.board().filled_count(), 0);
        assert_eq!(g.last_clear(), None);
        assert_eq!((g.piece().x, g.piece().y), (1, 0));
    }

    #[test]
    fn test_restart_while_running() {
        let mut g = game(10, 20, &[PieceType::T]);
        g.hard_drop();
        g.tick();
        g.restart();
        assert_eq!(g.board().filled_count(), 0);
        assert_eq!(g.piece().y, 0);
        assert_eq!(g.phase(), Phase::Running);
    }

    #[test]
    fn test_random_games_never_panic() {
        let commands = [
            Command::MoveLeft,
            Command::MoveRight,
            Command::SoftDrop,
            Command::Rotate,
            Command::HardDrop,
        ];
        let mut g = GameState::new(5, 8, RandomSource::new(Some(42)));
        let mut overs = 0;
        for i in 0..5_000usize {
            g.apply(commands[(i * 7 + i / 3) % commands.len()]);
            g.tick();
            assert!(g.board().height() == 8 && g.board().width() == 5);
            if g.is_over() {
                overs += 1;
                g.apply(Command::Restart);
            }
        }
        assert!(overs > 0);
    }
}
