//! Decorative widgets that ride along with the stage view.
//!
//! The reaction bar is the terminal cousin of the page's emoji buttons: each
//! one fires a named sound effect and nothing else. The engine never reads
//! any of this.

use std::io::Write;

use log::debug;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::engine::SoundPlayer;

struct ReactionSpot {
    emoji: &'static str,
    effect: &'static str,
}

/// Clickable emoji row plus the key help line.
pub struct ReactionBar {
    spots: [ReactionSpot; 2],
    areas: [Option<Rect>; 2],
}

impl ReactionBar {
    pub fn new() -> Self {
        Self {
            spots: [
                ReactionSpot {
                    emoji: "🗿",
                    effect: "moai",
                },
                ReactionSpot {
                    emoji: "💀",
                    effect: "skull",
                },
            ],
            areas: [None; 2],
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(area);

        for (i, spot) in self.spots.iter().enumerate() {
            let widget = Paragraph::new(spot.emoji).alignment(Alignment::Center);
            frame.render_widget(widget, chunks[i]);
            self.areas[i] = Some(chunks[i]);
        }

        let help = Paragraph::new("enter = press the button · n = decline · q = quit")
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }

    /// Which effect a click at (x, y) should fire, if any.
    pub fn hit(&self, x: u16, y: u16) -> Option<&'static str> {
        for (i, spot) in self.spots.iter().enumerate() {
            if let Some(area) = self.areas[i] {
                if x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
                {
                    return Some(spot.effect);
                }
            }
        }
        None
    }
}

impl Default for ReactionBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Sound capability backed by the terminal bell.
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&mut self, effect: &str) {
        debug!("sound cue: {effect}");
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_testing_respects_drawn_areas() {
        let mut bar = ReactionBar::new();
        bar.areas = [
            Some(Rect::new(0, 24, 4, 1)),
            Some(Rect::new(4, 24, 4, 1)),
        ];
        assert_eq!(bar.hit(1, 24), Some("moai"));
        assert_eq!(bar.hit(5, 24), Some("skull"));
        assert_eq!(bar.hit(9, 24), None);
        assert_eq!(bar.hit(1, 23), None);
    }
}
