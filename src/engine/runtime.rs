//! The generic stage runtime.
//!
//! One runtime drives whichever stage is active: it seeds the run state from
//! the [`StageSpec`], schedules the repeating tick, applies the stage's tick
//! effects, re-renders the mutable regions, and evaluates the completion rule
//! after every tick and every user event. All per-stage behavior lives in the
//! definition table; nothing in here is specific to a single stage.

use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use super::caps::{Fragment, Region, Surface, UiEvent};
use super::clock::{Ticker, TickerHandle};
use super::distractor;
use super::sequencer::SequencerState;
use super::stage::{CompletionRule, Gate, StageSpec, TickEffect, COMMITTEE_MEMBERS, QUOTES};
use super::view;

/// Result of feeding a tick or an event to the active stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Running,
    /// The completion rule is satisfied; the sequencer must advance.
    Complete,
}

/// Transient per-run counters, recreated every time a stage starts and
/// destroyed when it ends, whether by completion or by a distractor reset.
#[derive(Debug)]
struct RunState {
    /// Remaining virtual seconds on the stage countdown.
    remaining: f64,
    expired: bool,
    ticks: u64,
    progress: f64,
    retries: u32,
    votes: u32,
    /// Visible wipe counter (stage 4).
    resets: u32,
    crawler: f64,
    frozen_hold: u32,
    wipe_notice_hold: u32,
    unlocked: bool,
    feedback: String,
    status: String,
    /// Clock reading at the previous tick, for elapsed-time measurement.
    last_tick_at: Duration,
    /// Virtual seconds accumulated toward the next vote.
    vote_elapsed: f64,
}

/// Drives one active stage from start to completion.
pub struct StageRuntime {
    spec: &'static StageSpec,
    run: RunState,
    handle: Option<TickerHandle>,
    /// Seconds of virtual stage time per tick; 1.0 at the nominal cadence.
    tick_secs: f64,
    rng: StdRng,
}

impl StageRuntime {
    /// Initialize the run state, render the stage view, and schedule the
    /// repeating tick.
    pub fn start(
        spec: &'static StageSpec,
        now: Duration,
        tick_interval: Duration,
        ticker: &mut Ticker,
        surface: &mut dyn Surface,
        seq: &SequencerState,
        mut rng: StdRng,
    ) -> Self {
        info!("starting stage {} ({})", spec.index, spec.slug);

        let quote = QUOTES[rng.gen_range(0..QUOTES.len())];
        let run = RunState {
            remaining: spec.duration.as_secs_f64(),
            expired: false,
            ticks: 0,
            progress: 0.0,
            retries: 0,
            votes: 0,
            resets: 0,
            crawler: 0.0,
            frozen_hold: 0,
            wipe_notice_hold: 0,
            unlocked: false,
            feedback: String::new(),
            status: spec.status_seed.to_string(),
            last_tick_at: now,
            vote_elapsed: 0.0,
        };

        let handle = ticker.schedule(tick_interval, now);
        let runtime = Self {
            spec,
            run,
            handle: Some(handle),
            tick_secs: tick_interval.as_secs_f64(),
            rng,
        };

        surface.render(Region::StageTitle, Fragment::Text(spec.title.to_string()));
        surface.render(Region::Quote, Fragment::Text(quote.to_string()));
        surface.render(Region::Notice, Fragment::Empty);
        distractor::render_spot(surface, &spec.distractor);
        runtime.render_body(surface, seq);
        runtime.render_mutable(surface);
        runtime
    }

    /// Cancel the repeating tick. Safe to call with no timer active.
    pub fn stop(&mut self, ticker: &mut Ticker) {
        if let Some(handle) = self.handle.take() {
            ticker.cancel(handle);
            debug!("stage {} timer cancelled", self.spec.index);
        }
    }

    pub fn handle(&self) -> Option<TickerHandle> {
        self.handle
    }

    pub fn spec(&self) -> &'static StageSpec {
        self.spec
    }

    /// Whether typed characters currently reach the feedback field.
    pub fn accepts_text(&self) -> bool {
        self.spec.has_input_unlock() && self.run.unlocked
    }

    /// Re-render without advancing time; used when external state the view
    /// depends on (focus flag, switch count) changes between ticks.
    pub fn refresh(&self, surface: &mut dyn Surface, seq: &SequencerState) {
        self.render_body(surface, seq);
        self.render_mutable(surface);
    }

    /// True while the stage's primary control still reads "Retry"; clicks on
    /// the continue control it turns into are not retries.
    pub fn in_retry_phase(&self) -> bool {
        matches!(
            self.spec.completion,
            CompletionRule::TimerExpiryAndGate(Gate::RetriesAtLeast(n)) if self.run.retries < n
        )
    }

    /// Apply one tick: advance the countdown, run the stage's effects,
    /// re-render, and evaluate completion.
    pub fn on_tick(
        &mut self,
        now: Duration,
        surface: &mut dyn Surface,
        seq: &SequencerState,
    ) -> StageOutcome {
        let elapsed = now.saturating_sub(self.run.last_tick_at);
        self.run.last_tick_at = now;
        self.run.ticks += 1;
        let elapsed_virtual = elapsed.as_secs_f64() / self.tick_secs;

        if self.spec.is_focus_gated() {
            // Real elapsed time, and only while focused; an unfocused interval
            // of any length costs nothing.
            if seq.tab_focused {
                self.run.remaining -= elapsed_virtual;
            }
        } else {
            self.run.remaining -= 1.0;
        }
        if self.run.remaining <= 0.0 {
            self.run.remaining = 0.0;
            if !self.run.expired {
                self.run.expired = true;
                debug!("stage {} countdown expired", self.spec.index);
            }
        }

        self.apply_effects(elapsed_virtual, surface);

        if self.body_is_dynamic() {
            self.render_body(surface, seq);
        }
        self.render_mutable(surface);

        if self.timer_completion_met() {
            info!("stage {} complete after {} ticks", self.spec.index, self.run.ticks);
            StageOutcome::Complete
        } else {
            StageOutcome::Running
        }
    }

    /// Apply a user event scoped to this stage, then evaluate completion.
    pub fn on_event(
        &mut self,
        event: &UiEvent,
        surface: &mut dyn Surface,
        seq: &SequencerState,
    ) -> StageOutcome {
        match event {
            UiEvent::PrimaryClicked => {
                if let CompletionRule::ExternalEvent(gate) = self.spec.completion {
                    if self.gate_met(gate) {
                        info!("stage {} completed by user event", self.spec.index);
                        return StageOutcome::Complete;
                    }
                    debug!("stage {} primary control refused (gate not met)", self.spec.index);
                } else if self.spec.has_retry_control() {
                    self.apply_retry_click();
                }
            }
            UiEvent::DeclineClicked => {
                if matches!(self.spec.completion, CompletionRule::ExternalEvent(Gate::TimerExpired)) {
                    surface.render(Region::Notice, Fragment::Text(view::decline_notice()));
                }
            }
            UiEvent::FeedbackInput(c) => {
                if self.spec.has_input_unlock() {
                    if self.run.unlocked {
                        self.run.feedback.push(*c);
                    } else {
                        debug!("feedback input refused: field still locked");
                    }
                }
            }
            UiEvent::FeedbackBackspace => {
                if self.accepts_text() {
                    self.run.feedback.pop();
                }
            }
            UiEvent::SpeedupAttempt => {
                surface.render(Region::Notice, Fragment::Text(view::speedup_tip()));
            }
            // Routed by the sequencer before reaching the runtime.
            UiEvent::DistractorClicked | UiEvent::FocusChanged(_) => {}
        }

        self.render_body(surface, seq);
        self.render_mutable(surface);

        if self.timer_completion_met() {
            info!("stage {} complete after user event", self.spec.index);
            StageOutcome::Complete
        } else {
            StageOutcome::Running
        }
    }

    fn apply_retry_click(&mut self) {
        let required = match self.spec.completion {
            CompletionRule::TimerExpiryAndGate(Gate::RetriesAtLeast(n)) => n,
            _ => return,
        };
        if self.run.retries < required {
            self.run.retries += 1;
            self.run.status = if self.run.retries < required {
                self.spec.status_bank[(self.run.retries - 1) as usize].to_string()
            } else {
                "✅ Error resolved! (It was never really broken)".to_string()
            };
            debug!("retry click {}/{}", self.run.retries, required);
        }
        // Clicks past the requirement are the manual continue control; the
        // shared completion evaluation below decides whether they land.
    }

    fn apply_effects(&mut self, elapsed_virtual: f64, surface: &mut dyn Surface) {
        for effect in self.spec.effects {
            match *effect {
                TickEffect::CreepingProgress { max_step } => {
                    self.run.progress =
                        (self.run.progress + self.rng.gen_range(0.0..max_step)).min(100.0);
                }
                TickEffect::RandomFreeze { chance, hold_ticks } => {
                    if self.run.frozen_hold > 0 {
                        self.run.frozen_hold -= 1;
                    } else if self.rng.gen_bool(chance) {
                        self.run.frozen_hold = hold_ticks;
                        self.run.status = self.pick_status();
                    }
                }
                TickEffect::ProgressWipe { threshold, chance } => {
                    if self.run.wipe_notice_hold > 0 {
                        self.run.wipe_notice_hold -= 1;
                        if self.run.wipe_notice_hold == 0 {
                            surface.render(Region::Notice, Fragment::Empty);
                        }
                    }
                    if self.run.progress > threshold && self.rng.gen_bool(chance) {
                        self.run.progress = 0.0;
                        self.run.resets += 1;
                        self.run.wipe_notice_hold = 3;
                        surface.render(
                            Region::Notice,
                            Fragment::Text(view::wipe_notice(self.run.resets)),
                        );
                    }
                }
                TickEffect::CrawlerAdvance { step } => {
                    self.run.crawler = (self.run.crawler + step).min(100.0);
                }
                TickEffect::StatusRotation { every_ticks } => {
                    if self.run.ticks % u64::from(every_ticks) == 0 {
                        self.run.status = self.pick_status();
                    }
                }
                TickEffect::VoteAccrual { per_vote, total } => {
                    self.run.vote_elapsed += elapsed_virtual;
                    let per = per_vote.as_secs_f64();
                    while self.run.votes < total && self.run.vote_elapsed >= per {
                        self.run.vote_elapsed -= per;
                        self.run.votes += 1;
                        let member =
                            COMMITTEE_MEMBERS[(self.run.votes - 1) as usize % COMMITTEE_MEMBERS.len()];
                        self.run.status = if self.run.votes == total {
                            "🎉 Unanimous approval! Your redirect has been authorized!".to_string()
                        } else {
                            view::vote_status(member, self.run.votes, total)
                        };
                        debug!("vote {}/{} cast", self.run.votes, total);
                    }
                }
                TickEffect::FocusGatedCountdown => {
                    // Countdown handling happens before effects; nothing else.
                }
                TickEffect::InputUnlock => {
                    if self.run.expired && !self.run.unlocked {
                        self.run.unlocked = true;
                        info!("feedback field unlocked");
                    }
                }
            }
        }
    }

    fn pick_status(&mut self) -> String {
        let bank = self.spec.status_bank;
        if bank.is_empty() {
            return String::new();
        }
        bank[self.rng.gen_range(0..bank.len())].to_string()
    }

    fn body_is_dynamic(&self) -> bool {
        !matches!(self.spec.completion, CompletionRule::TimerExpiry)
            || self.spec.effects.iter().any(|e| {
                matches!(
                    e,
                    TickEffect::CrawlerAdvance { .. }
                        | TickEffect::VoteAccrual { .. }
                        | TickEffect::FocusGatedCountdown
                        | TickEffect::InputUnlock
                )
            })
    }

    fn render_body(&self, surface: &mut dyn Surface, seq: &SequencerState) {
        let mut lines: Vec<String> = self
            .spec
            .message
            .iter()
            .map(|line| line.to_string())
            .collect();

        if self.spec.has_retry_control() {
            lines.push(String::new());
            lines.push(view::retry_label(self.run.retries));
        }
        if matches!(self.spec.completion, CompletionRule::ExternalEvent(Gate::TimerExpired)) {
            lines.push(String::new());
            lines.extend(view::confirm_controls(self.run.expired));
        }
        if self.spec.vote_total() > 0 {
            lines.push(String::new());
            lines.push(view::vote_grid(self.run.votes, self.spec.vote_total()));
        }
        if self
            .spec
            .effects
            .iter()
            .any(|e| matches!(e, TickEffect::CrawlerAdvance { .. }))
        {
            lines.push(String::new());
            lines.push(view::snail_track(self.run.crawler));
        }
        if self.spec.is_focus_gated() {
            lines.push(String::new());
            let warning = view::focus_warning(seq.tab_focused);
            if !warning.is_empty() {
                lines.push(warning);
            }
            lines.push(view::tab_switch_line(seq.tab_switches));
        }
        if self.spec.has_input_unlock() {
            lines.push(String::new());
            lines.extend(view::feedback_body(
                self.run.unlocked,
                &self.run.feedback,
                self.run.remaining,
            ));
        }

        surface.render(Region::StageBody, Fragment::Lines(lines));
    }

    fn render_mutable(&self, surface: &mut dyn Surface) {
        surface.render(
            Region::Timer,
            Fragment::Text(view::clock_text(self.run.remaining)),
        );
        if self.spec.has_progress_meter() {
            surface.render(
                Region::Progress,
                Fragment::Meter {
                    percent: self.run.progress,
                    label: String::new(),
                },
            );
        } else {
            surface.render(Region::Progress, Fragment::Empty);
        }

        let has_status = !self.spec.status_bank.is_empty() || !self.spec.status_seed.is_empty();
        if has_status {
            let status = if self.run.frozen_hold > 0 {
                format!("❄ {}", self.run.status)
            } else {
                self.run.status.clone()
            };
            surface.render(Region::Status, Fragment::Text(status));
        } else {
            surface.render(Region::Status, Fragment::Empty);
        }
    }

    fn gate_met(&self, gate: Gate) -> bool {
        match gate {
            Gate::TimerExpired => self.run.expired,
            Gate::RetriesAtLeast(n) => self.run.retries >= n,
            Gate::AllVotesCast => self.run.votes >= self.spec.vote_total(),
            Gate::FeedbackReady { min_len } => {
                self.run.unlocked && self.run.feedback.chars().count() >= min_len
            }
        }
    }

    fn timer_completion_met(&self) -> bool {
        match self.spec.completion {
            CompletionRule::TimerExpiry => self.run.expired,
            CompletionRule::TimerExpiryAndGate(gate) => self.run.expired && self.gate_met(gate),
            CompletionRule::ExternalEvent(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stage;
    use crate::engine::testutil::RecordingSurface;
    use rand::SeedableRng;

    const TICK: Duration = Duration::from_secs(1);

    fn seq_state() -> SequencerState {
        SequencerState::new()
    }

    fn start_stage(
        index: usize,
        ticker: &mut Ticker,
        surface: &mut RecordingSurface,
        seq: &SequencerState,
    ) -> StageRuntime {
        StageRuntime::start(
            stage::stage(index).unwrap(),
            Duration::ZERO,
            TICK,
            ticker,
            surface,
            seq,
            StdRng::seed_from_u64(7),
        )
    }

    /// Run `runtime` through `count` one-second ticks.
    fn run_ticks(
        runtime: &mut StageRuntime,
        count: u64,
        from: Duration,
        surface: &mut RecordingSurface,
        seq: &SequencerState,
    ) -> (StageOutcome, Duration) {
        let mut now = from;
        for _ in 0..count {
            now += TICK;
            if runtime.on_tick(now, surface, seq) == StageOutcome::Complete {
                return (StageOutcome::Complete, now);
            }
        }
        (StageOutcome::Running, now)
    }

    #[test]
    fn plain_timer_stage_completes_at_expiry_exactly_once() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(1, &mut ticker, &mut surface, &seq);

        let (outcome, now) = run_ticks(&mut runtime, 299, Duration::ZERO, &mut surface, &seq);
        assert_eq!(outcome, StageOutcome::Running);
        assert_eq!(
            runtime.on_tick(now + TICK, &mut surface, &seq),
            StageOutcome::Complete
        );
    }

    #[test]
    fn confirm_stage_refuses_until_expiry_then_completes_on_click() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(3, &mut ticker, &mut surface, &seq);

        // Click before expiry: refused, still running.
        assert_eq!(
            runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq),
            StageOutcome::Running
        );

        // Expiry alone never completes an ExternalEvent stage.
        let (outcome, _) = run_ticks(&mut runtime, 180, Duration::ZERO, &mut surface, &seq);
        assert_eq!(outcome, StageOutcome::Running);

        assert_eq!(
            runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq),
            StageOutcome::Complete
        );
    }

    #[test]
    fn decline_click_posts_a_notice_and_stays_put() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(3, &mut ticker, &mut surface, &seq);

        assert_eq!(
            runtime.on_event(&UiEvent::DeclineClicked, &mut surface, &seq),
            StageOutcome::Running
        );
        assert!(surface.text(Region::Notice).contains("Wise choice"));
    }

    #[test]
    fn retry_stage_gates_on_seven_clicks() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(5, &mut ticker, &mut surface, &seq);

        // Expire the timer first; completion must still be refused.
        let (outcome, now) = run_ticks(&mut runtime, 300, Duration::ZERO, &mut surface, &seq);
        assert_eq!(outcome, StageOutcome::Running);

        for click in 1..7 {
            assert_eq!(
                runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq),
                StageOutcome::Running,
                "click {click} must not complete the stage"
            );
        }
        // The evaluation immediately after the seventh click fires.
        assert_eq!(
            runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq),
            StageOutcome::Complete
        );
        let _ = now;
    }

    #[test]
    fn seven_retries_before_expiry_complete_on_the_expiry_tick() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(5, &mut ticker, &mut surface, &seq);

        for _ in 0..7 {
            assert_eq!(
                runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq),
                StageOutcome::Running
            );
        }
        assert!(surface.text(Region::StageBody).contains("Continue"));

        let (outcome, now) = run_ticks(&mut runtime, 299, Duration::ZERO, &mut surface, &seq);
        assert_eq!(outcome, StageOutcome::Running);
        assert_eq!(
            runtime.on_tick(now + TICK, &mut surface, &seq),
            StageOutcome::Complete
        );
    }

    #[test]
    fn retry_clicks_advance_the_canned_messages() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(5, &mut ticker, &mut surface, &seq);

        runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq);
        assert_eq!(surface.text(Region::Status), "Still broken! Try again!");
        for _ in 0..6 {
            runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq);
        }
        assert!(surface.text(Region::Status).contains("Error resolved"));
    }

    #[test]
    fn votes_accrue_on_real_elapsed_time_not_ticks() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(7, &mut ticker, &mut surface, &seq);

        // 44 one-second ticks: no vote yet.
        let (_, now) = run_ticks(&mut runtime, 44, Duration::ZERO, &mut surface, &seq);
        assert_eq!(runtime.run.votes, 0);

        // One more second crosses the 45 s threshold.
        runtime.on_tick(now + TICK, &mut surface, &seq);
        assert_eq!(runtime.run.votes, 1);
        assert!(surface.text(Region::Status).contains("(1/15 votes complete)"));

        // A single tick after a long unpolled gap catches up several votes.
        runtime.on_tick(now + TICK + Duration::from_secs(135), &mut surface, &seq);
        assert_eq!(runtime.run.votes, 4);
    }

    #[test]
    fn committee_stage_needs_votes_and_expiry() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(7, &mut ticker, &mut surface, &seq);

        // 675 ticks at one real second each: the final tick both expires the
        // countdown and casts the fifteenth vote.
        let (outcome, _) = run_ticks(&mut runtime, 675, Duration::ZERO, &mut surface, &seq);
        assert_eq!(outcome, StageOutcome::Complete);
        assert_eq!(runtime.run.votes, 15);
    }

    #[test]
    fn focus_gated_stage_pauses_while_unfocused() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let mut seq = seq_state();
        let mut runtime = start_stage(9, &mut ticker, &mut surface, &seq);

        seq.tab_focused = false;
        // A long unfocused interval costs nothing.
        runtime.on_tick(Duration::from_secs(600), &mut surface, &seq);
        assert_eq!(runtime.run.remaining, 1800.0);
        assert!(surface.text(Region::StageBody).contains("TIMER PAUSED"));

        // Refocus: the next interval counts in full.
        seq.tab_focused = true;
        runtime.on_tick(Duration::from_secs(700), &mut surface, &seq);
        assert_eq!(runtime.run.remaining, 1700.0);
        assert!(!surface.text(Region::StageBody).contains("TIMER PAUSED"));
    }

    #[test]
    fn feedback_input_is_refused_while_locked() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(10, &mut ticker, &mut surface, &seq);

        runtime.on_event(&UiEvent::FeedbackInput('x'), &mut surface, &seq);
        assert!(runtime.run.feedback.is_empty());
        assert!(!runtime.accepts_text());

        // 120 ticks unlock the field.
        let (_, now) = run_ticks(&mut runtime, 120, Duration::ZERO, &mut surface, &seq);
        assert!(runtime.accepts_text());

        runtime.on_event(&UiEvent::FeedbackInput('x'), &mut surface, &seq);
        assert_eq!(runtime.run.feedback, "x");
        let _ = now;
    }

    #[test]
    fn submit_unlocks_at_exactly_fifty_characters() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(10, &mut ticker, &mut surface, &seq);
        run_ticks(&mut runtime, 120, Duration::ZERO, &mut surface, &seq);

        for c in "x".repeat(49).chars() {
            runtime.on_event(&UiEvent::FeedbackInput(c), &mut surface, &seq);
        }
        assert_eq!(
            runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq),
            StageOutcome::Running
        );

        runtime.on_event(&UiEvent::FeedbackInput('x'), &mut surface, &seq);
        assert_eq!(
            runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq),
            StageOutcome::Complete
        );
    }

    #[test]
    fn backspace_can_drop_below_the_threshold_again() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(10, &mut ticker, &mut surface, &seq);
        run_ticks(&mut runtime, 120, Duration::ZERO, &mut surface, &seq);

        for c in "x".repeat(50).chars() {
            runtime.on_event(&UiEvent::FeedbackInput(c), &mut surface, &seq);
        }
        runtime.on_event(&UiEvent::FeedbackBackspace, &mut surface, &seq);
        assert_eq!(
            runtime.on_event(&UiEvent::PrimaryClicked, &mut surface, &seq),
            StageOutcome::Running
        );
    }

    #[test]
    fn stop_is_idempotent() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(1, &mut ticker, &mut surface, &seq);

        let handle = runtime.handle().unwrap();
        runtime.stop(&mut ticker);
        runtime.stop(&mut ticker);
        assert!(runtime.handle().is_none());
        assert!(!ticker.poll_once(handle, Duration::from_secs(60)));
    }

    #[test]
    fn progress_wipe_resets_and_counts() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(4, &mut ticker, &mut surface, &seq);

        // With ~1%/tick average creep and a 15% wipe chance past 30%, 360
        // ticks are overwhelmingly likely to produce at least one wipe.
        run_ticks(&mut runtime, 359, Duration::ZERO, &mut surface, &seq);
        assert!(runtime.run.resets > 0, "seeded run should have wiped at least once");
        assert!(runtime.run.progress <= 100.0);
    }

    #[test]
    fn speedup_attempt_only_posts_the_tip() {
        let mut ticker = Ticker::new();
        let mut surface = RecordingSurface::new();
        let seq = seq_state();
        let mut runtime = start_stage(9, &mut ticker, &mut surface, &seq);

        let before = runtime.run.remaining;
        assert_eq!(
            runtime.on_event(&UiEvent::SpeedupAttempt, &mut surface, &seq),
            StageOutcome::Running
        );
        assert!(surface.text(Region::Notice).contains("absolutely nothing"));
        assert_eq!(runtime.run.remaining, before);
    }
}
