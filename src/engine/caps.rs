//! Capability seams between the sequencing engine and whatever hosts it.
//!
//! The engine never touches a terminal, a browser, or an audio device. It
//! emits [`Fragment`]s into named [`Region`]s through a [`Surface`], asks a
//! [`Navigator`] for the final one-way jump, and receives user input as
//! [`UiEvent`]s from the host loop.

/// A named display region the engine can render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// "Stage X of N" header with an overall completion meter.
    OverallProgress,
    /// Current stage's headline.
    StageTitle,
    /// Current stage's body copy and interactive affordances.
    StageBody,
    /// The stage countdown, MM:SS.
    Timer,
    /// The stage's own (usually lying) progress meter.
    Progress,
    /// Rotating status line.
    Status,
    /// Transient notices: resets, declined shortcuts, fake tips.
    Notice,
    /// Philosophical quote of the stage.
    Quote,
    /// The bait affordance, anchored at a normalized position.
    Distractor,
}

/// Renderable content for a region.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Clear the region.
    Empty,
    /// One line of text.
    Text(String),
    /// Multiple lines of text.
    Lines(Vec<String>),
    /// A meter with a label, percent in [0, 100].
    Meter { percent: f64, label: String },
    /// A label pinned at a normalized position over the stage area.
    Anchored { x_pct: u8, y_pct: u8, label: String },
}

/// Replaces the contents of a named display region.
///
/// Implementations must swallow their own faults (an unknown or collapsed
/// region is the surface's problem); nothing here may interrupt the sequence.
pub trait Surface {
    fn render(&mut self, region: Region, fragment: Fragment);
}

/// Performs the one-way navigation at the end of the sequence.
pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

/// Fire-and-forget audio cue for a named effect.
///
/// Consumed only by the host's decorative widgets; the sequencer itself never
/// plays sounds.
pub trait SoundPlayer {
    fn play(&mut self, effect: &str);
}

/// User input, as delivered by the host loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The bait affordance was activated.
    DistractorClicked,
    /// Terminal/tab focus changed.
    FocusChanged(bool),
    /// The stage's primary control: confirm (stage 3), retry/continue
    /// (stage 5), submit (stage 10).
    PrimaryClicked,
    /// The "no thanks" control on the confirmation stage.
    DeclineClicked,
    /// A character typed into the feedback field.
    FeedbackInput(char),
    /// Backspace in the feedback field.
    FeedbackBackspace,
    /// The user tried to hurry things along (refresh-key analogue).
    SpeedupAttempt,
}
