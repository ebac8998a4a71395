//! The stage definition table.
//!
//! Every stage is pure data: a duration, a completion rule, a list of tick
//! effects, and the placement of its bait affordance. The generic runtime in
//! [`crate::engine::runtime`] consumes this table; adding a stage means adding
//! a row here, not writing another timer loop.

use std::time::Duration;

use super::distractor::DistractorSpot;

pub const STAGE_COUNT: usize = 10;

/// How many seconds pass between committee votes, measured against the real
/// clock rather than the tick count.
pub const VOTE_INTERVAL: Duration = Duration::from_secs(45);
pub const VOTE_TOTAL: u32 = 15;

/// Retry clicks demanded by the fake system error stage.
pub const RETRIES_REQUIRED: u32 = 7;

/// Minimum feedback length before the submit control unlocks.
pub const FEEDBACK_MIN_LEN: usize = 50;

/// Predicate that must hold before a stage may transition forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionRule {
    /// The stage ends on its own when the countdown reaches zero.
    TimerExpiry,
    /// The countdown must reach zero AND the gate must hold; checked each tick
    /// and after each user event.
    TimerExpiryAndGate(Gate),
    /// The stage ends only on an explicit user event, refused until the gate
    /// holds. Never auto-completes.
    ExternalEvent(Gate),
}

/// Gating conditions referenced by [`CompletionRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The stage countdown has expired.
    TimerExpired,
    /// At least this many retry clicks during the current run of the stage.
    RetriesAtLeast(u32),
    /// Every committee vote has been cast.
    AllVotesCast,
    /// The unlock delay elapsed and the feedback text is long enough.
    FeedbackReady { min_len: usize },
}

/// Per-tick mechanics applied by the runtime while a stage is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEffect {
    /// Progress creeps up by a random amount in `0..max_step` percent.
    CreepingProgress { max_step: f64 },
    /// Chance per tick of a transient freeze: the status line swaps to a
    /// random pick from the stage's bank and holds for `hold_ticks`.
    RandomFreeze { chance: f64, hold_ticks: u32 },
    /// Once progress exceeds `threshold`, chance per tick of wiping it back
    /// to zero and bumping the visible reset counter.
    ProgressWipe { threshold: f64, chance: f64 },
    /// The crawler inches along its track.
    CrawlerAdvance { step: f64 },
    /// Rotate the status line to a random bank pick every `every_ticks`.
    StatusRotation { every_ticks: u32 },
    /// One vote per `per_vote` of real elapsed time, up to `total`.
    VoteAccrual { per_vote: Duration, total: u32 },
    /// Remaining time decrements by real elapsed time, and only while the
    /// tab-focus flag is true.
    FocusGatedCountdown,
    /// The feedback field unlocks when the countdown expires.
    InputUnlock,
}

/// Immutable definition of one stage.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// 1-based position in the sequence.
    pub index: usize,
    pub slug: &'static str,
    pub title: &'static str,
    pub message: &'static [&'static str],
    pub duration: Duration,
    pub completion: CompletionRule,
    pub effects: &'static [TickEffect],
    /// Status-line bank for rotations, freezes, retries, and votes.
    pub status_bank: &'static [&'static str],
    /// Status line shown when the stage starts; empty for stages without one.
    pub status_seed: &'static str,
    pub distractor: DistractorSpot,
}

impl StageSpec {
    pub fn has_progress_meter(&self) -> bool {
        self.effects.iter().any(|e| {
            matches!(
                e,
                TickEffect::CreepingProgress { .. } | TickEffect::ProgressWipe { .. }
            )
        })
    }

    /// Total votes this stage accrues, zero for stages without voting.
    pub fn vote_total(&self) -> u32 {
        self.effects
            .iter()
            .find_map(|e| match e {
                TickEffect::VoteAccrual { total, .. } => Some(*total),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn is_focus_gated(&self) -> bool {
        self.effects.contains(&TickEffect::FocusGatedCountdown)
    }

    pub fn has_input_unlock(&self) -> bool {
        self.effects.contains(&TickEffect::InputUnlock)
    }

    pub fn has_retry_control(&self) -> bool {
        matches!(
            self.completion,
            CompletionRule::TimerExpiryAndGate(Gate::RetriesAtLeast(_))
        )
    }
}

/// Look up a stage by 1-based index.
pub fn stage(index: usize) -> Option<&'static StageSpec> {
    STAGES.get(index.checked_sub(1)?)
}

pub static QUOTES: &[&str] = &[
    "\"Time is the most valuable thing we have and we waste it in extraordinary ways.\" - Steve Jobs (but not today!)",
    "\"Patience is not simply the ability to wait - it's how we behave while we're waiting.\" - Joyce Meyer",
    "\"The two most powerful warriors are patience and time.\" - Leo Tolstoy",
    "\"Good things come to those who wait... and wait... and wait...\" - Anonymous",
    "\"In the end, we will remember not the words of our enemies, but the silence of our redirects.\" - MLK (probably)",
    "\"The journey of a thousand miles begins with a single click... and then a very long wait.\" - Lao Tzu (modified)",
    "\"Time you enjoy wasting is not wasted time... right?\" - Bertrand Russell (hopeful)",
    "\"All good things are worth waiting for. Apparently, so are redirects.\" - Ancient Proverb",
    "\"Patience is bitter, but its fruit is sweet. This redirect better be worth it.\" - Aristotle (frustrated)",
    "\"The trouble is, you think you have time... you don't, but you'll spend it here anyway.\" - Buddha (realistic)",
];

static BUFFERING_MESSAGES: &[&str] = &[
    "Buffering patience...",
    "Calibrating your waiting tolerance...",
    "Downloading additional patience modules...",
    "Optimizing your frustration threshold...",
    "Synchronizing with global waiting standards...",
    "Installing patience drivers...",
    "Configuring delay preferences...",
];

/// One entry per retry click; the runtime indexes with the click count.
pub static RETRY_MESSAGES: &[&str] = &[
    "Still broken! Try again!",
    "Nope, didn't work that time either.",
    "Third time's NOT the charm apparently.",
    "Have you tried turning it off and on again?",
    "Error Error: Cannot display error message.",
    "System is having an existential crisis.",
    "Almost there! (Just kidding, it's still broken)",
];

static SNAIL_STATUS: &[&str] = &[
    "Gary is making steady progress!",
    "Gary stopped for a snack break.",
    "Gary is admiring the scenery.",
    "Gary is questioning his life choices.",
    "Gary found a new friend (another snail).",
    "Gary is having an existential moment.",
    "Gary is almost there! (He's not)",
    "Gary is rethinking the meaning of speed.",
    "Gary wonders why everyone is in such a hurry.",
    "Gary has achieved inner peace.",
];

pub static COMMITTEE_MEMBERS: &[&str] = &[
    "Dr. Procrastination",
    "Prof. Delay",
    "Chief Slowdown",
    "Director Pause",
    "Manager Wait",
    "Executive Stall",
    "Supervisor Lag",
    "Administrator Crawl",
    "Chairman Snail",
    "President Turtle",
    "CEO Molasses",
    "VP Glacial",
    "Secretary Lethargic",
    "Treasurer Sluggish",
    "Member Dawdle",
];

static QUANTUM_STATUS: &[&str] = &[
    "Quantum particles are cooperating nicely.",
    "Schrödinger's redirect is both complete and incomplete.",
    "Quantum entanglement with the destination established.",
    "Heisenberg uncertainty principle is being uncertain.",
    "Quantum field fluctuations detected.",
    "Parallel universe redirect routes discovered.",
    "Quantum foam is particularly foamy today.",
    "String theory suggests your redirect is actually 11-dimensional.",
    "Quantum tunneling through the internet tubes.",
    "Reality is questioning its own existence.",
];

pub static STAGES: [StageSpec; STAGE_COUNT] = [
    StageSpec {
        index: 1,
        slug: "initializing-protocol",
        title: "Initializing Redirect Protocol...",
        message: &[
            "Please wait while we establish a secure connection to the destination portal.",
            "This process involves complex quantum entanglement procedures.",
        ],
        duration: Duration::from_secs(300),
        completion: CompletionRule::TimerExpiry,
        effects: &[TickEffect::CreepingProgress { max_step: 0.5 }],
        status_bank: &[],
        status_seed: "",
        distractor: DistractorSpot {
            x_pct: 10,
            y_pct: 20,
            label: "🚀 Click me for turbo speed!",
        },
    },
    StageSpec {
        index: 2,
        slug: "buffering-patience",
        title: "Buffering Patience...",
        message: &["Loading your capacity for extended waiting periods..."],
        duration: Duration::from_secs(240),
        completion: CompletionRule::TimerExpiry,
        effects: &[TickEffect::RandomFreeze {
            chance: 0.10,
            hold_ticks: 2,
        }],
        status_bank: BUFFERING_MESSAGES,
        status_seed: "Buffering patience...",
        distractor: DistractorSpot {
            x_pct: 80,
            y_pct: 30,
            label: "⚡ Boost loading speed!",
        },
    },
    StageSpec {
        index: 3,
        slug: "confirmation-required",
        title: "Confirmation Required",
        message: &[
            "Are you absolutely certain you wish to continue this journey?",
            "This decision cannot be undone, and the path ahead is fraught with additional delays.",
        ],
        duration: Duration::from_secs(180),
        completion: CompletionRule::ExternalEvent(Gate::TimerExpired),
        effects: &[],
        status_bank: &[],
        status_seed: "",
        distractor: DistractorSpot {
            x_pct: 60,
            y_pct: 40,
            label: "🔓 Unlock button!",
        },
    },
    StageSpec {
        index: 4,
        slug: "resetting-progress",
        title: "Progress Loading...",
        message: &[
            "Watch this progress bar carefully. It definitely won't reset randomly.",
            "We promise. Trust us.",
        ],
        duration: Duration::from_secs(360),
        completion: CompletionRule::TimerExpiry,
        effects: &[
            TickEffect::CreepingProgress { max_step: 2.0 },
            TickEffect::ProgressWipe {
                threshold: 30.0,
                chance: 0.15,
            },
        ],
        status_bank: &[],
        status_seed: "",
        distractor: DistractorSpot {
            x_pct: 20,
            y_pct: 60,
            label: "🎲 Reset counter!",
        },
    },
    StageSpec {
        index: 5,
        slug: "fake-system-error",
        title: "⚠️ SYSTEM ERROR ⚠️",
        message: &[
            "ERROR CODE: 418 - I'm a teapot (and also confused)",
            "The redirect service has encountered an unexpected error.",
            "Please click \"Retry\" to continue. Multiple attempts may be required.",
        ],
        duration: Duration::from_secs(300),
        completion: CompletionRule::TimerExpiryAndGate(Gate::RetriesAtLeast(RETRIES_REQUIRED)),
        effects: &[],
        status_bank: RETRY_MESSAGES,
        status_seed: "",
        distractor: DistractorSpot {
            x_pct: 70,
            y_pct: 25,
            label: "🔧 Fix error!",
        },
    },
    StageSpec {
        index: 6,
        slug: "snail-powered-progress",
        title: "🐌 Snail-Powered Progress",
        message: &[
            "Our high-speed snail is now carrying your request to its destination.",
            "Please be patient as Gary makes his way across the information superhighway.",
        ],
        duration: Duration::from_secs(480),
        completion: CompletionRule::TimerExpiry,
        effects: &[
            TickEffect::CrawlerAdvance { step: 0.2 },
            TickEffect::StatusRotation { every_ticks: 30 },
        ],
        status_bank: SNAIL_STATUS,
        status_seed: "Gary is feeling motivated today!",
        distractor: DistractorSpot {
            x_pct: 50,
            y_pct: 70,
            label: "🥬 Feed Gary!",
        },
    },
    StageSpec {
        index: 7,
        slug: "committee-voting",
        title: "🗳️ Redirect Committee Session",
        message: &[
            "The International Committee for Redirect Approval is now voting on your request.",
            "Each member must carefully consider the implications of your redirect.",
        ],
        duration: Duration::from_secs(675),
        completion: CompletionRule::TimerExpiryAndGate(Gate::AllVotesCast),
        effects: &[TickEffect::VoteAccrual {
            per_vote: VOTE_INTERVAL,
            total: VOTE_TOTAL,
        }],
        status_bank: COMMITTEE_MEMBERS,
        status_seed: "Waiting for committee members to arrive...",
        distractor: DistractorSpot {
            x_pct: 30,
            y_pct: 50,
            label: "🗳️ Influence vote!",
        },
    },
    StageSpec {
        index: 8,
        slug: "quantum-oscillators",
        title: "⚛️ Quantum Redirect Oscillators",
        message: &[
            "Calibrating quantum redirect oscillators for maximum efficiency...",
            "Synchronizing with interdimensional routing protocols...",
            "Adjusting temporal displacement parameters...",
        ],
        duration: Duration::from_secs(420),
        completion: CompletionRule::TimerExpiry,
        effects: &[
            TickEffect::CreepingProgress { max_step: 1.5 },
            TickEffect::StatusRotation { every_ticks: 25 },
        ],
        status_bank: QUANTUM_STATUS,
        status_seed: "Initializing quantum field generators...",
        distractor: DistractorSpot {
            x_pct: 40,
            y_pct: 80,
            label: "🔬 Quantum boost!",
        },
    },
    StageSpec {
        index: 9,
        slug: "final-countdown",
        title: "⏰ Final Countdown",
        message: &[
            "You've made it to the final stage! Only 30 minutes remain!",
            "WARNING: Timer pauses when you switch away.",
            "We're watching. 👁️",
        ],
        duration: Duration::from_secs(1800),
        completion: CompletionRule::TimerExpiry,
        effects: &[TickEffect::FocusGatedCountdown],
        status_bank: &[],
        status_seed: "",
        distractor: DistractorSpot {
            x_pct: 65,
            y_pct: 15,
            label: "⏱️ Time warp!",
        },
    },
    StageSpec {
        index: 10,
        slug: "feedback-form",
        title: "📝 Experience Feedback",
        message: &[
            "Congratulations! You've nearly completed the experience!",
            "Please rate your journey before we send you on your way.",
        ],
        duration: Duration::from_secs(120),
        completion: CompletionRule::ExternalEvent(Gate::FeedbackReady {
            min_len: FEEDBACK_MIN_LEN,
        }),
        effects: &[TickEffect::InputUnlock],
        status_bank: &[],
        status_seed: "",
        distractor: DistractorSpot {
            x_pct: 25,
            y_pct: 90,
            label: "✍️ Auto-fill!",
        },
    },
];
