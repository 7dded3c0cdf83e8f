//! App: terminal init, main loop, gravity and key handling.

use crate::GameConfig;
use crate::clock::GravityClock;
use crate::game::{Command, GameState};
use crate::input::{Action, key_to_action};
use crate::piece::RandomSource;
use crate::theme::Theme;
use crate::ui::{self, Effects};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Whether the loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    state: GameState<RandomSource>,
    clock: GravityClock,
    effects: Effects,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let state = GameState::new(config.width, config.height, RandomSource::new(config.seed));
        let clock = GravityClock::new(config.drop_interval, Instant::now());
        let effects = Effects::new(config.animations);
        Self {
            config,
            theme,
            state,
            clock,
            effects,
        }
    }

    /// Applies one key action to the game. Player input is handled to completion here.
    fn apply_action(&mut self, action: Action, now: Instant) -> Flow {
        match action {
            Action::Quit => return Flow::Quit,
            Action::Game(Command::Restart) => {
                self.state.restart();
                self.clock.reset(now);
                self.effects.reset();
            }
            Action::Game(command) => self.state.apply(command),
            Action::None => {}
        }
        Flow::Continue
    }

    /// Gravity step when the clock says one is due.
    fn tick_gravity(&mut self, now: Instant) {
        if self.clock.poll(now) {
            self.state.tick();
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        info!(
            width = self.config.width,
            height = self.config.height,
            interval_ms = self.config.drop_interval.as_millis() as u64,
            "starting"
        );

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        info!(score = self.state.score(), lines = self.state.lines(), "exiting");
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| ui::draw(f, &self.state, &self.theme, &mut self.effects, now))?;

            let timeout = self.config.frame_interval.min(self.clock.until_next(Instant::now()));
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let action = key_to_action(key);
                    debug!(?action, "key");
                    if self.apply_action(action, Instant::now()) == Flow::Quit {
                        return Ok(());
                    }
                }
            }

            self.tick_gravity(Instant::now());
        }
    }
}
