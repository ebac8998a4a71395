//! The bait affordance: one clickable "shortcut" per stage that always costs
//! the user everything.

use super::caps::{Fragment, Region, Surface};

/// Placement of a stage's distractor, in percent of the stage area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistractorSpot {
    pub x_pct: u8,
    pub y_pct: u8,
    pub label: &'static str,
}

/// Pin the bait for the current stage onto the surface.
pub fn render_spot(surface: &mut dyn Surface, spot: &DistractorSpot) {
    surface.render(
        Region::Distractor,
        Fragment::Anchored {
            x_pct: spot.x_pct,
            y_pct: spot.y_pct,
            label: spot.label.to_string(),
        },
    );
}

/// The notice shown after an activation, with the running reset count.
pub fn reset_notice(resets: u32) -> String {
    format!(
        "🎉 Secret shortcut found! As promised, this resets your delay timer. \
         Resets so far: {resets}. Restarting from Stage 1... 😈"
    )
}
