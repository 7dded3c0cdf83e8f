//! Theme loading: btop-style `theme[key]="value"` files and hex → ratatui Color.

use crate::Palette;
use crate::shapes::PieceType;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Classic piece colours in id order: I, J, L, O, S, Z, T.
const CLASSIC: [&str; 7] = ["#0FF", "#00F", "#FA0", "#FF0", "#0F0", "#F00", "#808"];

/// Theme keys for each piece, in id order.
const PIECE_KEYS: [&str; 7] = ["piece_i", "piece_j", "piece_l", "piece_o", "piece_s", "piece_z", "piece_t"];

/// Piece and UI colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Piece colours indexed by `PieceType::id() - 1`.
    pub pieces: [Color; 7],
    /// Empty board cells.
    pub bg: Color,
    /// Board border.
    pub div_line: Color,
    /// Text (score, lines).
    pub main_fg: Color,
    /// Titles.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

fn hex(s: &str) -> Color {
    parse_hex(s).unwrap_or(Color::Reset)
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            pieces: CLASSIC.map(hex),
            bg: hex("#111"),
            div_line: hex("#888"),
            main_fg: hex("#DDD"),
            title: hex("#FA0"),
        }
    }

    /// Loads a theme file, or the classic theme when `path` is `None` or missing.
    /// Keys absent from the file keep their classic values. `palette` is applied last.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))?
            }
            _ => Self::classic(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.pieces = ["#00FFFF", "#3366FF", "#FF8800", "#FFFF00", "#00FF00", "#FF0000", "#FF00FF"].map(hex);
                self.bg = Color::Black;
                self.main_fg = Color::White;
            }
            Palette::Colorblind => {
                self.pieces = ["#33BBEE", "#0077BB", "#EE7733", "#CCBB44", "#009988", "#CC3311", "#EE3377"].map(hex);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let mut theme = Self::classic();
        for (slot, key) in theme.pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(v) = map.get(key) {
                *slot = parse_hex(v)?;
            }
        }
        for (key, slot) in [
            ("main_bg", &mut theme.bg),
            ("div_line", &mut theme.div_line),
            ("main_fg", &mut theme.main_fg),
            ("title", &mut theme.title),
        ] {
            if let Some(v) = map.get(key) {
                *slot = parse_hex(v)?;
            }
        }
        Ok(theme)
    }

    #[inline]
    pub fn piece_color(&self, kind: PieceType) -> Color {
        self.pieces[(kind.id() - 1) as usize]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let digits = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|d| u8::from_str_radix(d, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match digits.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
