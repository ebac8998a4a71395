//! View fragments for the stage chrome.
//!
//! Pure formatting: the runtime decides *when* regions change, these helpers
//! decide *what* goes into them.

use super::caps::Fragment;
use super::stage::{FEEDBACK_MIN_LEN, RETRIES_REQUIRED};

/// MM:SS, clamped at zero. The original padded with `padStart`; negative
/// remainders are never shown.
pub fn clock_text(seconds: f64) -> String {
    let total = seconds.max(0.0).ceil() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// "Stage X of N" header meter.
pub fn overall_progress(current_stage: usize, total: usize) -> Fragment {
    let completed = current_stage.saturating_sub(1).min(total);
    Fragment::Meter {
        percent: completed as f64 / total as f64 * 100.0,
        label: format!("Stage {} of {}", current_stage.min(total), total),
    }
}

/// Committee voting grid, one cell per member.
pub fn vote_grid(votes: u32, total: u32) -> String {
    let mut grid = String::new();
    for i in 0..total {
        grid.push(if i < votes { '▣' } else { '▢' });
        if i + 1 < total {
            grid.push(' ');
        }
    }
    grid
}

/// Status line announcing a cast vote.
pub fn vote_status(member: &str, votes: u32, total: u32) -> String {
    format!("{member} voted YES! ({votes}/{total} votes complete)")
}

/// The snail and the track it is (barely) crossing.
pub fn snail_track(position_pct: f64) -> String {
    const TRACK_LEN: usize = 40;
    let pos = ((position_pct.clamp(0.0, 100.0) / 100.0) * (TRACK_LEN - 1) as f64) as usize;
    let mut track = String::new();
    for i in 0..TRACK_LEN {
        if i == pos {
            track.push('🐌');
        } else {
            track.push('·');
        }
    }
    track
}

/// Retry control label: counts up to the requirement, then flips to the
/// manual continue control.
pub fn retry_label(retries: u32) -> String {
    if retries < RETRIES_REQUIRED {
        format!("[ Retry ({retries}/{RETRIES_REQUIRED}) ]")
    } else {
        "[ Continue to Next Stage ]".to_string()
    }
}

/// Confirmation-stage controls; the affirmative one unlocks at expiry.
pub fn confirm_controls(expired: bool) -> Vec<String> {
    let yes = if expired {
        "[ Yes, I'm Ready for More Delays! ]"
    } else {
        "( Yes, I Commit to the Journey - locked )"
    };
    vec![
        yes.to_string(),
        "[ No, I Prefer Instant Gratification ]".to_string(),
    ]
}

/// Feedback form body: the field, its lock state, and the submit control.
pub fn feedback_body(unlocked: bool, text: &str, unlock_remaining: f64) -> Vec<String> {
    let mut lines = Vec::new();
    if unlocked {
        lines.push(format!("> {text}▏"));
        lines.push("✅ Text input now enabled! Please provide your feedback.".to_string());
        let len = text.chars().count();
        if len >= FEEDBACK_MIN_LEN {
            lines.push("[ Submit & Continue ]".to_string());
        } else {
            lines.push(format!(
                "( Need {} more characters )",
                FEEDBACK_MIN_LEN - len
            ));
        }
    } else {
        lines.push("> (input disabled)".to_string());
        lines.push(format!(
            "Text input enabled in: {}",
            clock_text(unlock_remaining)
        ));
        lines.push("( Submit Feedback - locked )".to_string());
    }
    lines
}

/// Stage 9's pause warning, empty while focused.
pub fn focus_warning(focused: bool) -> String {
    if focused {
        String::new()
    } else {
        "⚠️ TIMER PAUSED - Please keep this window active! ⚠️".to_string()
    }
}

pub fn tab_switch_line(switches: u32) -> String {
    format!("Tab switches detected: {switches}")
}

/// Transient stage-4 message after a progress wipe.
pub fn wipe_notice(resets: u32) -> String {
    format!("Oops! Progress reset #{resets}. These things happen! 🤷")
}

/// The answer to declining the confirmation stage.
pub fn decline_notice() -> String {
    "Wise choice! But you're staying anyway. The journey continues...".to_string()
}

/// Shown when the user tries the refresh-key shortcut.
pub fn speedup_tip() -> String {
    "💡 Pro Tip: mashing refresh turbocharges the redirect! (Just kidding, this does absolutely nothing. Nice try though! 😄)"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_and_clamps() {
        assert_eq!(clock_text(300.0), "05:00");
        assert_eq!(clock_text(59.0), "00:59");
        assert_eq!(clock_text(0.0), "00:00");
        assert_eq!(clock_text(-12.0), "00:00");
        assert_eq!(clock_text(675.0), "11:15");
    }

    #[test]
    fn partial_seconds_round_up() {
        // A stage 9 countdown mid-decrement still shows a whole second.
        assert_eq!(clock_text(0.4), "00:01");
    }

    #[test]
    fn overall_progress_counts_completed_stages() {
        match overall_progress(1, 10) {
            Fragment::Meter { percent, label } => {
                assert_eq!(percent, 0.0);
                assert_eq!(label, "Stage 1 of 10");
            }
            other => panic!("expected meter, got {other:?}"),
        }
        match overall_progress(11, 10) {
            Fragment::Meter { percent, label } => {
                assert_eq!(percent, 100.0);
                assert_eq!(label, "Stage 10 of 10");
            }
            other => panic!("expected meter, got {other:?}"),
        }
    }

    #[test]
    fn vote_grid_fills_left_to_right() {
        assert_eq!(vote_grid(0, 3), "▢ ▢ ▢");
        assert_eq!(vote_grid(2, 3), "▣ ▣ ▢");
    }

    #[test]
    fn feedback_body_tracks_the_gate() {
        let locked = feedback_body(false, "", 120.0);
        assert!(locked[1].contains("02:00"));
        let short = feedback_body(true, "too short", 0.0);
        assert!(short[2].contains("41 more characters"));
        let ready = feedback_body(true, &"x".repeat(50), 0.0);
        assert!(ready[2].contains("Submit"));
    }

    #[test]
    fn retry_label_flips_to_continue() {
        assert_eq!(retry_label(0), "[ Retry (0/7) ]");
        assert!(retry_label(7).contains("Continue"));
    }
}
