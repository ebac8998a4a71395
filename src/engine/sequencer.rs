//! The controller.
//!
//! The sequencer owns the only mutable cross-stage state in the system: the
//! current stage index, the session counters, and the tab-focus flag. Stage
//! transitions are explicit method calls driven from one control thread;
//! the host loop feeds it events and pumps the ticker; nothing schedules a
//! callback behind its back.

use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::caps::{Fragment, Navigator, Region, Surface, UiEvent};
use super::clock::{Clock, Ticker};
use super::distractor;
use super::finalizer::Finalizer;
use super::runtime::{StageOutcome, StageRuntime};
use super::stage::{self, STAGE_COUNT};
use super::view;

/// Session-wide mutable state, owned exclusively by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerState {
    /// 1-based stage index; `STAGE_COUNT + 1` is the terminal finalizing
    /// pseudo-stage.
    pub current_stage: usize,
    pub tab_switches: u32,
    pub distractor_resets: u32,
    /// Session-cumulative retry clicks, reported by the finalizer. The
    /// stage-5 gate reads the per-run count, not this.
    pub retry_clicks: u32,
    pub tab_focused: bool,
}

impl SequencerState {
    pub fn new() -> Self {
        Self {
            current_stage: 1,
            tab_switches: 0,
            distractor_resets: 0,
            retry_clicks: 0,
            tab_focused: true,
        }
    }
}

impl Default for SequencerState {
    fn default() -> Self {
        Self::new()
    }
}

enum Phase {
    Idle,
    Stage(StageRuntime),
    Finalizing(Finalizer),
    Done,
}

/// Drives the stage sequence from initialization to the final navigation.
pub struct Sequencer<C: Clock> {
    clock: C,
    ticker: Ticker,
    state: SequencerState,
    phase: Phase,
    destination_url: String,
    tick_interval: Duration,
    rng_seed: Option<u64>,
}

impl<C: Clock> Sequencer<C> {
    pub fn new(clock: C, destination_url: impl Into<String>) -> Self {
        Self {
            clock,
            ticker: Ticker::new(),
            state: SequencerState::new(),
            phase: Phase::Idle,
            destination_url: destination_url.into(),
            tick_interval: Duration::from_secs(1),
            rng_seed: None,
        }
    }

    /// Override the tick cadence. The stages are calibrated for one second;
    /// shorter intervals speed the whole production up proportionally.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Fix the RNG seed for deterministic runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// True once the navigation has been invoked.
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Whether typed characters should be routed to the feedback field
    /// instead of hotkeys.
    pub fn accepts_text(&self) -> bool {
        matches!(&self.phase, Phase::Stage(rt) if rt.accepts_text())
    }

    /// Reset all counters and begin stage 1.
    pub fn initialize(&mut self, surface: &mut dyn Surface) {
        info!(
            "initializing stall sequence: {} stages ahead of {}",
            STAGE_COUNT, self.destination_url
        );
        self.stop_active();
        self.state = SequencerState::new();
        self.start_stage(1, surface);
    }

    /// Called when the active stage's completion rule is satisfied. Strictly
    /// +1; past the last stage the finalizer takes over.
    pub fn advance_to_next_stage(&mut self, surface: &mut dyn Surface) {
        let next = self.state.current_stage + 1;
        if next > STAGE_COUNT {
            self.begin_finalizer(surface);
        } else {
            self.start_stage(next, surface);
        }
    }

    /// Distractor activation: unconditionally back to stage 1, from any
    /// stage, with the reset notice on display.
    pub fn restart_from_beginning(&mut self, surface: &mut dyn Surface) {
        self.state.distractor_resets += 1;
        info!(
            "distractor activated at stage {}; reset #{}",
            self.state.current_stage, self.state.distractor_resets
        );
        self.start_stage(1, surface);
        surface.render(
            Region::Notice,
            Fragment::Text(distractor::reset_notice(self.state.distractor_resets)),
        );
    }

    /// Focus transitions count globally; only stage 9 gates on the flag.
    pub fn on_tab_focus_change(&mut self, focused: bool, surface: &mut dyn Surface) {
        if self.state.tab_focused && !focused {
            self.state.tab_switches += 1;
            info!("focus lost; switch count {}", self.state.tab_switches);
        }
        self.state.tab_focused = focused;
        // Stage 9 shows the warning and the live count; refresh right away
        // rather than waiting for the next tick.
        if let Phase::Stage(rt) = &mut self.phase {
            if rt.spec().is_focus_gated() {
                rt.refresh(surface, &self.state);
            }
        }
    }

    /// Route one user event. Distractor and focus events are the sequencer's
    /// own; everything else belongs to the active stage.
    pub fn handle_event(&mut self, event: UiEvent, surface: &mut dyn Surface) {
        if self.is_done() {
            // Terminal: nothing mutates once the navigation has fired.
            debug!("ignoring {event:?} after navigation");
            return;
        }
        match event {
            UiEvent::DistractorClicked => self.restart_from_beginning(surface),
            UiEvent::FocusChanged(focused) => self.on_tab_focus_change(focused, surface),
            other => {
                if matches!(other, UiEvent::PrimaryClicked) {
                    if let Phase::Stage(rt) = &self.phase {
                        if rt.in_retry_phase() {
                            self.state.retry_clicks += 1;
                        }
                    }
                }
                let outcome = match &mut self.phase {
                    Phase::Stage(rt) => Some(rt.on_event(&other, surface, &self.state)),
                    _ => None,
                };
                if outcome == Some(StageOutcome::Complete) {
                    self.stop_active();
                    self.advance_to_next_stage(surface);
                }
            }
        }
    }

    /// Drain due ticks and apply them to the active phase. Transitions cancel
    /// the outgoing schedule before the incoming one starts, so two stages'
    /// ticks can never interleave.
    pub fn pump(&mut self, surface: &mut dyn Surface, navigator: &mut dyn Navigator) {
        enum Step {
            StageComplete,
            FinalDone,
            Applied,
        }

        loop {
            let now = self.clock.now();
            let step = match &mut self.phase {
                Phase::Stage(rt) => {
                    let Some(handle) = rt.handle() else { break };
                    if !self.ticker.poll_once(handle, now) {
                        break;
                    }
                    match rt.on_tick(now, surface, &self.state) {
                        StageOutcome::Complete => Step::StageComplete,
                        StageOutcome::Running => Step::Applied,
                    }
                }
                Phase::Finalizing(finalizer) => {
                    let Some(handle) = finalizer.handle() else { break };
                    if !self.ticker.poll_once(handle, now) {
                        break;
                    }
                    if finalizer.on_tick(surface, navigator, &self.destination_url) {
                        Step::FinalDone
                    } else {
                        Step::Applied
                    }
                }
                Phase::Idle | Phase::Done => break,
            };
            match step {
                Step::StageComplete => {
                    self.stop_active();
                    self.advance_to_next_stage(surface);
                }
                Step::FinalDone => {
                    self.stop_active();
                    self.phase = Phase::Done;
                    debug!("sequence finished; no further state changes");
                }
                Step::Applied => {}
            }
        }
    }

    fn stop_active(&mut self) {
        match &mut self.phase {
            Phase::Stage(rt) => rt.stop(&mut self.ticker),
            Phase::Finalizing(finalizer) => finalizer.stop(&mut self.ticker),
            Phase::Idle | Phase::Done => {}
        }
    }

    fn start_stage(&mut self, index: usize, surface: &mut dyn Surface) {
        self.stop_active();
        let Some(spec) = stage::stage(index) else {
            // Should be unreachable; a bad index must not break the illusion.
            warn!("stage {index} does not exist; staying put");
            return;
        };
        self.state.current_stage = index;
        surface.render(
            Region::OverallProgress,
            view::overall_progress(index, STAGE_COUNT),
        );
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        };
        let runtime = StageRuntime::start(
            spec,
            self.clock.now(),
            self.tick_interval,
            &mut self.ticker,
            surface,
            &self.state,
            rng,
        );
        self.phase = Phase::Stage(runtime);
    }

    fn begin_finalizer(&mut self, surface: &mut dyn Surface) {
        self.stop_active();
        self.state.current_stage = STAGE_COUNT + 1;
        surface.render(
            Region::OverallProgress,
            view::overall_progress(STAGE_COUNT + 1, STAGE_COUNT),
        );
        let finalizer = Finalizer::start(
            &self.state,
            self.clock.now(),
            self.tick_interval,
            &mut self.ticker,
            surface,
        );
        self.phase = Phase::Finalizing(finalizer);
    }
}
