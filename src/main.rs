//! Tetrotui — classic falling-block puzzle game in the terminal.

mod app;
mod board;
mod clock;
mod game;
mod input;
mod piece;
mod shapes;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Narrowest board that still fits the I piece.
pub const MIN_WIDTH: u16 = 4;
pub const MIN_HEIGHT: u16 = 2;
pub const MAX_DIMENSION: u16 = 100;

/// Options derived from CLI that affect game behaviour (board size, gravity, frame rate).
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub drop_interval: Duration,
    pub frame_interval: Duration,
    pub seed: Option<u64>,
    pub animations: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("board width {0} out of range ({min}..={max})", min = MIN_WIDTH, max = MAX_DIMENSION)]
    Width(u16),
    #[error("board height {0} out of range ({min}..={max})", min = MIN_HEIGHT, max = MAX_DIMENSION)]
    Height(u16),
    #[error("drop interval must be at least 1 ms")]
    ZeroInterval,
    #[error("frame rate must be a positive number, got {0}")]
    FrameRate(f64),
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if !(MIN_WIDTH..=MAX_DIMENSION).contains(&args.width) {
            return Err(ConfigError::Width(args.width));
        }
        if !(MIN_HEIGHT..=MAX_DIMENSION).contains(&args.height) {
            return Err(ConfigError::Height(args.height));
        }
        if args.drop_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if !args.frame_rate.is_finite() || args.frame_rate <= 0.0 {
            return Err(ConfigError::FrameRate(args.frame_rate));
        }
        let frame_interval = Duration::try_from_secs_f64(1.0 / args.frame_rate)
            .map_err(|_| ConfigError::FrameRate(args.frame_rate))?;
        Ok(Self {
            width: args.width as usize,
            height: args.height as usize,
            drop_interval: Duration::from_millis(args.drop_interval_ms),
            frame_interval,
            seed: args.seed,
            animations: !args.no_animation,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let config = GameConfig::from_args(&args).context("invalid options")?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|err| {
        tracing::warn!(%err, "theme not loaded, using defaults");
        theme::Theme::default()
    });
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// Installs a file logger when `path` is set; the terminal itself belongs to the UI.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetrotui",
    version,
    about = "Classic falling-block puzzle in the terminal. Complete rows to clear them and score.",
    long_about = "Tetrotui is a terminal take on the classic falling-block puzzle.\n\n\
        Pieces fall one row per interval. Fill a row edge to edge to clear it: each cleared \
        row is worth 100 points. The game ends when a new piece has no room to spawn.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move      Up or k     Rotate\n  Down or j          Drop one  Space       Hard drop\n  R                  Restart   Q / Esc     Quit"
)]
pub struct Args {
    /// Board width in cells.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub width: u16,

    /// Board height in cells.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: u16,

    /// Gravity interval: the active piece falls one row this often.
    #[arg(long, default_value_t = clock::DEFAULT_DROP_INTERVAL_MS, value_name = "MS")]
    pub drop_interval_ms: u64,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Seed for the piece sequence (same seed, same pieces).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]="value"). Classic colours if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the line-clear flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
