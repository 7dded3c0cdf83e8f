//! Layout and drawing: board, active piece, score sidebar, game-over overlay, line-clear flash.

use crate::board::Cell;
use crate::game::GameState;
use crate::piece::PieceSource;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count};

/// Terminal columns per board cell (cells are drawn as "██" to look square).
pub const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;
const SIDEBAR_WIDTH: u16 = 20;
const SIDEBAR_HEIGHT: u16 = 13;

/// Duration of the line-clear flash in ms.
const LINE_CLEAR_FLASH_MS: u32 = 250;

/// Render-side animation state. Owned by the app, never by the engine.
#[derive(Default)]
pub struct Effects {
    enabled: bool,
    line_clear: Option<Effect>,
    process_time: Option<Instant>,
    /// Serial of the last clear an effect was started for.
    seen_clear: u64,
}

impl Effects {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Drops any running effect and forgets clears already seen (used on restart).
    pub fn reset(&mut self) {
        self.line_clear = None;
        self.process_time = None;
        self.seen_clear = 0;
    }
}

/// Board outer size in terminal cells (border included).
fn board_outer_size(width: usize, height: usize) -> (u16, u16) {
    (width as u16 * CELL_WIDTH + 2, height as u16 * CELL_HEIGHT + 2)
}

/// Minimum terminal size that fits the board and sidebar.
pub fn required_size(width: usize, height: usize) -> (u16, u16) {
    let (bw, bh) = board_outer_size(width, height);
    (bw + SIDEBAR_WIDTH, bh.max(SIDEBAR_HEIGHT))
}

/// Draw the whole screen for the current state.
pub fn draw<S: PieceSource>(frame: &mut Frame, state: &GameState<S>, theme: &Theme, effects: &mut Effects, now: Instant) {
    let area = frame.area();
    let board = state.board();
    let (need_w, need_h) = required_size(board.width(), board.height());
    if area.width < need_w || area.height < need_h {
        draw_too_small(frame, area, (need_w, need_h));
        return;
    }

    let (bw, bh) = board_outer_size(board.width(), board.height());
    let (total_w, total_h) = (bw + SIDEBAR_WIDTH, bh.max(SIDEBAR_HEIGHT));

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(total_w), Constraint::Fill(1)])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(total_h), Constraint::Fill(1)])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let board_area = Rect { height: bh, ..inner[0] };
    let sidebar_area = Rect { height: SIDEBAR_HEIGHT, ..inner[1] };

    let board_rect = draw_board(frame, state, theme, board_area);
    draw_sidebar(frame, state, theme, sidebar_area);
    apply_line_clear_effect(frame, state, theme, board_rect, effects, now);
    if state.is_over() {
        draw_game_over(frame, state, theme, vert[1]);
    }
}

/// Draws border, locked cells and the active piece. Returns the inner board rect.
fn draw_board<S: PieceSource>(frame: &mut Frame, state: &GameState<S>, theme: &Theme, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Tetrotui ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let board = state.board();
    let buf = frame.buffer_mut();
    let paint = |buf: &mut ratatui::buffer::Buffer, x: i32, y: i32, color: Color| {
        let rx = inner.x + x as u16 * CELL_WIDTH;
        let ry = inner.y + y as u16 * CELL_HEIGHT;
        for dx in 0..CELL_WIDTH {
            if rx + dx < inner.right() && ry < inner.bottom() {
                buf[(rx + dx, ry)].set_symbol("█").set_style(Style::default().fg(color).bg(theme.bg));
            }
        }
    };

    for (y, row) in board.rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let color = match cell {
                Cell::Filled(kind) => theme.piece_color(*kind),
                Cell::Empty => theme.bg,
            };
            paint(buf, x as i32, y as i32, color);
        }
    }

    let piece = state.piece();
    let color = theme.piece_color(piece.kind);
    for (x, y) in piece.cells().filter(|&(x, y)| x >= 0 && y >= 0) {
        paint(buf, x, y, color);
    }
    inner
}

fn draw_sidebar<S: PieceSource>(frame: &mut Frame, state: &GameState<S>, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let key_style = Style::default().fg(theme.piece_color(crate::shapes::PieceType::I));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(state.lines().to_string(), fg_style),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled("←/→ ", key_style), Span::styled("Move", fg_style)]),
        Line::from(vec![Span::styled("↑ ", key_style), Span::styled("Rotate", fg_style)]),
        Line::from(vec![Span::styled("↓ ", key_style), Span::styled("Drop", fg_style)]),
        Line::from(vec![Span::styled("Space ", key_style), Span::styled("Hard drop", fg_style)]),
        Line::from(vec![Span::styled("R ", key_style), Span::styled("Restart", fg_style)]),
        Line::from(vec![Span::styled("Q ", key_style), Span::styled("Quit", fg_style)]),
    ];
    Paragraph::new(lines).render(inner, frame.buffer_mut());
}

fn draw_game_over<S: PieceSource>(frame: &mut Frame, state: &GameState<S>, theme: &Theme, area: Rect) {
    let popup_w = 18u16.min(area.width);
    let popup_h = 7u16.min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(format!("Score: {}", state.score()), Style::default().fg(theme.main_fg))),
        Line::from(Span::styled("R restart", Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    )
    .render(popup, frame.buffer_mut());
}

fn draw_too_small(frame: &mut Frame, area: Rect, (need_w, need_h): (u16, u16)) {
    let lines = vec![
        Line::from(Span::styled("Terminal too small", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(format!("Expected at least ( {} x {} )", need_w, need_h)),
        Line::from(format!("Current size ( {} x {} )", area.width, area.height)),
    ];
    Paragraph::new(lines).render(area, frame.buffer_mut());
}

/// Starts a flash over the cleared rows when a new clear shows up, and advances it.
fn apply_line_clear_effect<S: PieceSource>(
    frame: &mut Frame,
    state: &GameState<S>,
    theme: &Theme,
    board_rect: Rect,
    effects: &mut Effects,
    now: Instant,
) {
    if !effects.enabled {
        return;
    }
    if let Some(clear) = state.last_clear().filter(|c| c.serial != effects.seen_clear) {
        effects.seen_clear = clear.serial;
        let rows: HashSet<u16> = clear.rows.iter().map(|&y| board_rect.y + y as u16 * CELL_HEIGHT).collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| rows.contains(&pos.y)));
        let effect = fx::fade_from(Color::White, theme.bg, (LINE_CLEAR_FLASH_MS, Interpolation::QuadOut))
            .with_filter(filter)
            .with_area(board_rect);
        effects.line_clear = Some(effect);
        effects.process_time = None;
    }

    let delta = effects
        .process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;

    if let Some(effect) = effects.line_clear.as_mut() {
        effects.process_time = Some(now);
        frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
        if effect.done() {
            effects.line_clear = None;
            effects.process_time = None;
        }
    }
}
