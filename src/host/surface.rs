//! The terminal implementation of the engine's render capability.
//!
//! The engine replaces region contents whenever they change; the draw pass
//! lays the current fragments out with ratatui every frame. A region the
//! engine never filled simply draws empty; render faults stay on this side
//! of the capability seam.

use std::collections::HashMap;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;

use crate::engine::{Fragment, Region, Surface};

use super::widgets::ReactionBar;

pub struct TuiSurface {
    regions: HashMap<Region, Fragment>,
    /// Where the bait was last drawn, for click hit-testing.
    distractor_area: Option<Rect>,
}

impl TuiSurface {
    pub fn new() -> Self {
        Self {
            regions: HashMap::new(),
            distractor_area: None,
        }
    }

    pub fn distractor_hit(&self, x: u16, y: u16) -> bool {
        self.distractor_area.is_some_and(|area| contains(area, x, y))
    }

    fn text_of(&self, region: Region) -> String {
        match self.regions.get(&region) {
            Some(Fragment::Text(text)) => text.clone(),
            Some(Fragment::Lines(lines)) => lines.join("\n"),
            _ => String::new(),
        }
    }

    fn meter_of(&self, region: Region) -> Option<(f64, String)> {
        match self.regions.get(&region) {
            Some(Fragment::Meter { percent, label }) => Some((*percent, label.clone())),
            _ => None,
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, reactions: &mut ReactionBar) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // overall progress
                Constraint::Length(2), // stage title
                Constraint::Min(8),    // stage body (distractor overlays here)
                Constraint::Length(3), // stage timer
                Constraint::Length(1), // stage progress
                Constraint::Length(1), // status
                Constraint::Length(1), // notice
                Constraint::Length(2), // quote
                Constraint::Length(1), // reactions + help
            ])
            .split(frame.area());

        if let Some((percent, label)) = self.meter_of(Region::OverallProgress) {
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(label))
                .gauge_style(Style::default().fg(Color::Magenta))
                .ratio((percent / 100.0).clamp(0.0, 1.0));
            frame.render_widget(gauge, chunks[0]);
        }

        let title = Paragraph::new(self.text_of(Region::StageTitle))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(title, chunks[1]);

        let body = Paragraph::new(self.text_of(Region::StageBody))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(body, chunks[2]);

        self.distractor_area = None;
        if let Some(Fragment::Anchored { x_pct, y_pct, label }) = self.regions.get(&Region::Distractor)
        {
            let area = anchored_rect(chunks[2], *x_pct, *y_pct, label);
            let bait = Paragraph::new(label.clone()).style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD),
            );
            frame.render_widget(bait, area);
            self.distractor_area = Some(area);
        }

        let timer = Paragraph::new(self.text_of(Region::Timer))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(timer, chunks[3]);

        if let Some((percent, _)) = self.meter_of(Region::Progress) {
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(Color::Green))
                .ratio((percent / 100.0).clamp(0.0, 1.0));
            frame.render_widget(gauge, chunks[4]);
        }

        let status = Paragraph::new(self.text_of(Region::Status))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(status, chunks[5]);

        let notice = Paragraph::new(self.text_of(Region::Notice))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::LightRed));
        frame.render_widget(notice, chunks[6]);

        let quote = Paragraph::new(self.text_of(Region::Quote))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
        frame.render_widget(quote, chunks[7]);

        reactions.draw(frame, chunks[8]);
    }
}

impl Default for TuiSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TuiSurface {
    fn render(&mut self, region: Region, fragment: Fragment) {
        self.regions.insert(region, fragment);
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

/// Place a label inside `area` at the normalized position, clamped so it
/// stays on screen.
fn anchored_rect(area: Rect, x_pct: u8, y_pct: u8, label: &str) -> Rect {
    let width = (label.chars().count() as u16 + 2).min(area.width.max(1));
    let max_x = area.width.saturating_sub(width);
    let max_y = area.height.saturating_sub(1);
    let x = area.x + (u32::from(max_x) * u32::from(x_pct.min(100)) / 100) as u16;
    let y = area.y + (u32::from(max_y) * u32::from(y_pct.min(100)) / 100) as u16;
    Rect::new(x, y, width, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_rect_stays_inside_the_area() {
        let area = Rect::new(2, 3, 80, 20);
        for &(x_pct, y_pct) in &[(0u8, 0u8), (50, 50), (100, 100)] {
            let rect = anchored_rect(area, x_pct, y_pct, "🥬 Feed Gary!");
            assert!(rect.x >= area.x);
            assert!(rect.y >= area.y);
            assert!(rect.x + rect.width <= area.x + area.width);
            assert!(rect.y + rect.height <= area.y + area.height);
        }
    }

    #[test]
    fn distractor_hit_matches_the_drawn_area() {
        let mut surface = TuiSurface::new();
        surface.distractor_area = Some(Rect::new(10, 5, 8, 1));
        assert!(surface.distractor_hit(10, 5));
        assert!(surface.distractor_hit(17, 5));
        assert!(!surface.distractor_hit(18, 5));
        assert!(!surface.distractor_hit(10, 6));
    }
}
