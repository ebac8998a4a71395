//! The stage sequencing engine.
//!
//! Everything in here is host-agnostic: time comes from a [`Clock`], output
//! goes through a [`Surface`], and the final jump goes through a
//! [`Navigator`]. The terminal host in [`crate::host`] is one possible set of
//! collaborators; the tests run the whole sequence against recording fakes.

pub mod caps;
pub mod clock;
pub mod distractor;
pub mod finalizer;
pub mod runtime;
pub mod sequencer;
pub mod stage;
pub mod view;

pub use caps::{Fragment, Navigator, Region, SoundPlayer, Surface, UiEvent};
pub use clock::{Clock, ManualClock, SystemClock, Ticker, TickerHandle};
pub use sequencer::{Sequencer, SequencerState};
pub use stage::{StageSpec, STAGES, STAGE_COUNT};
