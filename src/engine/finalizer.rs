//! Terminal phase: summary statistics, a five-tick countdown, and the one
//! navigation the whole production has been stalling.

use std::time::Duration;

use log::info;

use super::caps::{Fragment, Navigator, Region, Surface};
use super::clock::{Ticker, TickerHandle};
use super::sequencer::SequencerState;

pub const FINAL_COUNTDOWN_TICKS: u32 = 5;

/// Runs the fixed countdown and fires the navigation capability exactly once.
pub struct Finalizer {
    remaining: u32,
    handle: Option<TickerHandle>,
    navigated: bool,
}

impl Finalizer {
    /// Render the summary screen and schedule the countdown tick.
    pub fn start(
        stats: &SequencerState,
        now: Duration,
        tick_interval: Duration,
        ticker: &mut Ticker,
        surface: &mut dyn Surface,
    ) -> Self {
        info!(
            "finalizing: {} tab switches, {} shortcut resets, {} retry clicks",
            stats.tab_switches, stats.distractor_resets, stats.retry_clicks
        );

        surface.render(
            Region::StageTitle,
            Fragment::Text("🎉 Journey Complete!".to_string()),
        );
        surface.render(
            Region::StageBody,
            Fragment::Lines(vec![
                "Congratulations! You have successfully completed the redirect delay experience!".to_string(),
                "You are now being redirected...".to_string(),
                String::new(),
                "Final Statistics:".to_string(),
                format!("  Tab switches: {}", stats.tab_switches),
                format!("  Shortcut resets: {}", stats.distractor_resets),
                format!("  Retry button clicks: {}", stats.retry_clicks),
                "  Time spent waiting: a legendary amount".to_string(),
                String::new(),
                "You have earned the title: Master of Patience".to_string(),
            ]),
        );
        surface.render(
            Region::Quote,
            Fragment::Text(
                "\"Your patience has been rewarded... sort of.\" - The Management".to_string(),
            ),
        );
        surface.render(
            Region::Timer,
            Fragment::Text(format!("{FINAL_COUNTDOWN_TICKS:02}")),
        );
        // The final screen has no bait, no meter, no status line.
        surface.render(Region::Distractor, Fragment::Empty);
        surface.render(Region::Progress, Fragment::Empty);
        surface.render(Region::Status, Fragment::Empty);
        surface.render(Region::Notice, Fragment::Empty);

        let handle = ticker.schedule(tick_interval, now);
        Self {
            remaining: FINAL_COUNTDOWN_TICKS,
            handle: Some(handle),
            navigated: false,
        }
    }

    pub fn handle(&self) -> Option<TickerHandle> {
        self.handle
    }

    pub fn stop(&mut self, ticker: &mut Ticker) {
        if let Some(handle) = self.handle.take() {
            ticker.cancel(handle);
        }
    }

    /// One countdown tick. Returns true once the navigation has been invoked;
    /// nothing mutates after that.
    pub fn on_tick(
        &mut self,
        surface: &mut dyn Surface,
        navigator: &mut dyn Navigator,
        url: &str,
    ) -> bool {
        if self.navigated {
            return true;
        }
        self.remaining = self.remaining.saturating_sub(1);
        surface.render(Region::Timer, Fragment::Text(format!("{:02}", self.remaining)));
        if self.remaining == 0 {
            info!("countdown elapsed, navigating to {url}");
            self.navigated = true;
            navigator.navigate(url);
            return true;
        }
        false
    }
}
