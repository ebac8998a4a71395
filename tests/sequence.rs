//! End-to-end properties of the stall sequence under a simulated clock.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use stall_cli::engine::{
    Fragment, ManualClock, Navigator, Region, Sequencer, Surface, UiEvent, STAGE_COUNT,
};

/// Surface fake keeping the latest fragment per region.
#[derive(Default)]
struct TestSurface {
    regions: HashMap<Region, Fragment>,
}

impl TestSurface {
    fn text(&self, region: Region) -> String {
        match self.regions.get(&region) {
            Some(Fragment::Text(text)) => text.clone(),
            Some(Fragment::Lines(lines)) => lines.join("\n"),
            Some(Fragment::Meter { label, .. }) => label.clone(),
            Some(Fragment::Anchored { label, .. }) => label.clone(),
            Some(Fragment::Empty) | None => String::new(),
        }
    }
}

impl Surface for TestSurface {
    fn render(&mut self, region: Region, fragment: Fragment) {
        self.regions.insert(region, fragment);
    }
}

#[derive(Default)]
struct TestNavigator {
    urls: Vec<String>,
}

impl Navigator for TestNavigator {
    fn navigate(&mut self, url: &str) {
        self.urls.push(url.to_string());
    }
}

const DESTINATION: &str = "https://binimum.org/";

struct Harness {
    clock: Rc<ManualClock>,
    sequencer: Sequencer<Rc<ManualClock>>,
    surface: TestSurface,
    navigator: TestNavigator,
}

impl Harness {
    fn new() -> Self {
        let clock = Rc::new(ManualClock::new());
        let mut sequencer = Sequencer::new(Rc::clone(&clock), DESTINATION).with_rng_seed(42);
        let mut surface = TestSurface::default();
        sequencer.initialize(&mut surface);
        Self {
            clock,
            sequencer,
            surface,
            navigator: TestNavigator::default(),
        }
    }

    fn advance_and_pump(&mut self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
        self.sequencer.pump(&mut self.surface, &mut self.navigator);
    }

    fn event(&mut self, event: UiEvent) {
        self.sequencer.handle_event(event, &mut self.surface);
    }

    fn stage(&self) -> usize {
        self.sequencer.state().current_stage
    }

    /// Satisfy the active stage's completion rule and let it transition.
    fn complete_stage(&mut self, index: usize) {
        assert_eq!(self.stage(), index, "harness out of step with the sequencer");
        match index {
            1 => self.advance_and_pump(300),
            2 => self.advance_and_pump(240),
            3 => {
                self.advance_and_pump(180);
                self.event(UiEvent::PrimaryClicked);
            }
            4 => self.advance_and_pump(360),
            5 => {
                self.advance_and_pump(300);
                for _ in 0..7 {
                    self.event(UiEvent::PrimaryClicked);
                }
            }
            6 => self.advance_and_pump(480),
            7 => self.advance_and_pump(675),
            8 => self.advance_and_pump(420),
            9 => self.advance_and_pump(1800),
            10 => {
                self.advance_and_pump(120);
                for c in "the waiting was long and the snail was very slow indeed".chars() {
                    self.event(UiEvent::FeedbackInput(c));
                }
                self.event(UiEvent::PrimaryClicked);
            }
            other => panic!("no stage {other} to complete"),
        }
        assert_eq!(
            self.stage(),
            index + 1,
            "stage {index} should advance exactly one step"
        );
    }

    fn drive_to_stage(&mut self, target: usize) {
        for index in 1..target {
            self.complete_stage(index);
        }
        assert_eq!(self.stage(), target);
    }
}

#[test]
fn full_sequence_navigates_exactly_once() {
    let mut h = Harness::new();

    for index in 1..=STAGE_COUNT {
        h.complete_stage(index);
    }

    // All ten stages done: the finalizer pseudo-stage is active but the
    // navigation is still pending its countdown.
    assert_eq!(h.stage(), STAGE_COUNT + 1);
    assert!(h.navigator.urls.is_empty());
    assert!(!h.sequencer.is_done());

    h.advance_and_pump(4);
    assert!(h.navigator.urls.is_empty());
    h.advance_and_pump(1);
    assert_eq!(h.navigator.urls, vec![DESTINATION]);
    assert!(h.sequencer.is_done());

    // Terminal: nothing moves after the navigation.
    h.advance_and_pump(60);
    assert_eq!(h.navigator.urls.len(), 1);
    assert_eq!(h.stage(), STAGE_COUNT + 1);
}

#[test]
fn distractor_resets_from_every_stage() {
    for target in 1..=STAGE_COUNT {
        let mut h = Harness::new();
        h.drive_to_stage(target);

        let title_before = h.surface.text(Region::StageTitle);
        h.event(UiEvent::DistractorClicked);

        assert_eq!(h.stage(), 1, "reset from stage {target} must land on stage 1");
        assert_eq!(h.sequencer.state().distractor_resets, 1);
        assert!(h
            .surface
            .text(Region::Notice)
            .contains("Resets so far: 1"));

        // The abandoned stage's timer is cancelled: one second later the view
        // is stage 1's, not a stale tick from stage `target`.
        h.advance_and_pump(1);
        assert_eq!(h.stage(), 1);
        assert!(h.surface.text(Region::StageTitle).contains("Initializing"));
        if target > 1 {
            assert_ne!(h.surface.text(Region::StageTitle), title_before);
        }
    }
}

#[test]
fn distractor_resets_during_paused_stage_nine_and_mid_entry_stage_ten() {
    let mut h = Harness::new();
    h.drive_to_stage(9);
    h.event(UiEvent::FocusChanged(false));
    h.event(UiEvent::DistractorClicked);
    assert_eq!(h.stage(), 1);

    let mut h = Harness::new();
    h.drive_to_stage(10);
    h.advance_and_pump(120);
    for c in "halfway through typing".chars() {
        h.event(UiEvent::FeedbackInput(c));
    }
    h.event(UiEvent::DistractorClicked);
    assert_eq!(h.stage(), 1);
}

#[test]
fn stage_nine_countdown_pauses_while_unfocused() {
    let mut h = Harness::new();
    h.drive_to_stage(9);
    assert_eq!(h.surface.text(Region::Timer), "30:00");

    h.event(UiEvent::FocusChanged(false));
    h.advance_and_pump(900);
    assert_eq!(
        h.surface.text(Region::Timer),
        "30:00",
        "an unfocused interval must cost nothing"
    );
    assert!(h.surface.text(Region::StageBody).contains("TIMER PAUSED"));
    assert!(h
        .surface
        .text(Region::StageBody)
        .contains("Tab switches detected: 1"));

    h.event(UiEvent::FocusChanged(true));
    h.advance_and_pump(60);
    assert_eq!(h.surface.text(Region::Timer), "29:00");
    assert_eq!(h.stage(), 9);
}

#[test]
fn stage_five_refuses_completion_until_seven_retries() {
    let mut h = Harness::new();
    h.drive_to_stage(5);

    h.advance_and_pump(300);
    assert_eq!(h.stage(), 5, "expiry alone must not complete stage 5");

    for click in 1..=6 {
        h.event(UiEvent::PrimaryClicked);
        assert_eq!(h.stage(), 5, "click {click} must not complete stage 5");
    }
    h.event(UiEvent::PrimaryClicked);
    assert_eq!(h.stage(), 6, "the seventh retry completes the stage");
}

#[test]
fn stage_ten_gates_input_and_submit() {
    let mut h = Harness::new();
    h.drive_to_stage(10);

    // The field is locked for the first 120 seconds regardless of attempts.
    for c in "early bird".chars() {
        h.event(UiEvent::FeedbackInput(c));
    }
    h.event(UiEvent::PrimaryClicked);
    assert_eq!(h.stage(), 10);
    assert!(!h.sequencer.accepts_text());

    h.advance_and_pump(119);
    assert!(!h.sequencer.accepts_text());
    h.advance_and_pump(1);
    assert!(h.sequencer.accepts_text());

    // 49 characters: refused. The 50th makes the submit land.
    for c in "x".repeat(49).chars() {
        h.event(UiEvent::FeedbackInput(c));
    }
    h.event(UiEvent::PrimaryClicked);
    assert_eq!(h.stage(), 10);

    h.event(UiEvent::FeedbackInput('x'));
    h.event(UiEvent::PrimaryClicked);
    assert_eq!(h.stage(), STAGE_COUNT + 1);
}

#[test]
fn retry_click_total_accumulates_across_resets() {
    let mut h = Harness::new();
    h.drive_to_stage(5);

    // Three clicks, then a reset wipes the per-run gate but not the total.
    for _ in 0..3 {
        h.event(UiEvent::PrimaryClicked);
    }
    h.event(UiEvent::DistractorClicked);
    assert_eq!(h.stage(), 1);
    assert_eq!(h.sequencer.state().retry_clicks, 3);

    h.drive_to_stage(5);
    h.advance_and_pump(300);
    for _ in 0..6 {
        h.event(UiEvent::PrimaryClicked);
    }
    assert_eq!(h.stage(), 5, "a fresh run demands its own seven clicks");
    h.event(UiEvent::PrimaryClicked);
    assert_eq!(h.stage(), 6);
    assert_eq!(h.sequencer.state().retry_clicks, 10);
}

#[test]
fn tab_switches_accumulate_across_the_whole_session() {
    let mut h = Harness::new();
    h.event(UiEvent::FocusChanged(false));
    h.event(UiEvent::FocusChanged(true));
    h.complete_stage(1);
    h.event(UiEvent::FocusChanged(false));
    h.event(UiEvent::FocusChanged(true));
    assert_eq!(h.sequencer.state().tab_switches, 2);
    // Stages other than 9 keep counting but never gate on the flag.
    assert_eq!(h.stage(), 2);
}

#[test]
fn finalizer_summary_reflects_the_session() {
    let mut h = Harness::new();
    h.event(UiEvent::FocusChanged(false));
    h.event(UiEvent::FocusChanged(true));
    h.event(UiEvent::DistractorClicked);

    for index in 1..=STAGE_COUNT {
        h.complete_stage(index);
    }
    let body = h.surface.text(Region::StageBody);
    assert!(body.contains("Tab switches: 1"));
    assert!(body.contains("Shortcut resets: 1"));
    assert!(body.contains("Retry button clicks: 7"));
}
