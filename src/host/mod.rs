//! Terminal host: owns the terminal, feeds the sequencer, draws the surface.

mod surface;
mod widgets;

pub use surface::TuiSurface;
pub use widgets::{ReactionBar, TerminalBell};

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::config::Config;
use crate::engine::{Sequencer, SoundPlayer, SystemClock, UiEvent};

/// How the session ended.
enum LoopOutcome {
    /// The sequence ran to completion; the navigation is due.
    Navigated(String),
    /// The user bailed out. The redirect never happened.
    Quit,
}

/// Records the navigation request so it can be performed after the terminal
/// is restored.
#[derive(Default)]
struct PendingNavigation(Option<String>);

impl crate::engine::Navigator for PendingNavigation {
    fn navigate(&mut self, url: &str) {
        self.0 = Some(url.to_string());
    }
}

pub fn run(config: &Config) -> Result<()> {
    log_banner(&config.destination_url);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    match result? {
        LoopOutcome::Navigated(url) => {
            println!("🎉 Journey complete. Off you go: {url}");
            open_url(&url);
        }
        LoopOutcome::Quit => {
            println!("Left early. The redirect never happened.");
        }
    }
    Ok(())
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
) -> Result<LoopOutcome> {
    let clock = SystemClock::new();
    let mut surface = TuiSurface::new();
    let mut navigator = PendingNavigation::default();
    let mut sound = TerminalBell;
    let mut reactions = ReactionBar::new();

    let mut sequencer = Sequencer::new(clock, config.destination_url.clone())
        .with_tick_interval(Duration::from_millis(config.tick_millis.max(1)));
    sequencer.initialize(&mut surface);

    loop {
        // Drain all pending input first for minimal latency.
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl && matches!(key.code, KeyCode::Char('c')) {
                        return Ok(LoopOutcome::Quit);
                    }
                    // The refresh keys do absolutely nothing, as promised.
                    if key.code == KeyCode::F(5) || (ctrl && key.code == KeyCode::Char('r')) {
                        sequencer.handle_event(UiEvent::SpeedupAttempt, &mut surface);
                        continue;
                    }
                    if sequencer.accepts_text() {
                        match key.code {
                            KeyCode::Char(c) => {
                                sequencer.handle_event(UiEvent::FeedbackInput(c), &mut surface)
                            }
                            KeyCode::Backspace => {
                                sequencer.handle_event(UiEvent::FeedbackBackspace, &mut surface)
                            }
                            KeyCode::Enter => {
                                sequencer.handle_event(UiEvent::PrimaryClicked, &mut surface)
                            }
                            _ => {}
                        }
                    } else {
                        match key.code {
                            KeyCode::Char('q') => return Ok(LoopOutcome::Quit),
                            KeyCode::Enter => {
                                sequencer.handle_event(UiEvent::PrimaryClicked, &mut surface)
                            }
                            KeyCode::Char('n') => {
                                sequencer.handle_event(UiEvent::DeclineClicked, &mut surface)
                            }
                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    if surface.distractor_hit(mouse.column, mouse.row) {
                        sequencer.handle_event(UiEvent::DistractorClicked, &mut surface);
                    } else if let Some(effect) = reactions.hit(mouse.column, mouse.row) {
                        sound.play(effect);
                    }
                }
                Event::FocusGained => {
                    sequencer.handle_event(UiEvent::FocusChanged(true), &mut surface)
                }
                Event::FocusLost => {
                    sequencer.handle_event(UiEvent::FocusChanged(false), &mut surface)
                }
                _ => {}
            }
        }

        sequencer.pump(&mut surface, &mut navigator);
        if sequencer.is_done() {
            if let Some(url) = navigator.0.take() {
                return Ok(LoopOutcome::Navigated(url));
            }
        }

        terminal.draw(|frame| surface.draw(frame, &mut reactions))?;

        // Sleep until input or the next frame is due.
        event::poll(Duration::from_millis(50))?;
    }
}

/// Hand the URL to the operating environment. Failure is logged, never
/// fatal; the URL was already printed.
fn open_url(url: &str) {
    let command = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    match std::process::Command::new(command).arg(url).spawn() {
        Ok(_) => info!("opened {url} via {command}"),
        Err(err) => warn!("could not open {url} via {command}: {err}"),
    }
}

/// For the developers who peek at the log file.
fn log_banner(destination: &str) {
    info!("🐌 stall-cli: the redirect delay experience 🐌");
    info!("🎯 Target: {destination}");
    info!("⏰ Expected completion time: when the heat death of the universe becomes a concern");
    info!("Congratulations, you've found the log file! Knowing the secrets won't help you skip the wait.");
}
