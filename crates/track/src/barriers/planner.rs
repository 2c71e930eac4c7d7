use std::ops::Range;

use bevy::math::{Rect, Vec2};
use rand::Rng;

use crate::config::{TrackConfig, OPENING_WALL_MARGIN};
use crate::track_rng::TrackRng;

use super::types::{BarrierDraft, BarrierPlan, BarrierSection};

/// Opening widths the planner draws from, in tiles.
pub const OPENING_WIDTHS: Range<i32> = 3..5;

// =============================================================================
// Pure helper functions (testable without a session)
// =============================================================================

/// Clamp an opening to a lane of `half_width` and return the usable width with
/// the range of valid `opening_start` values.
///
/// The opening keeps `OPENING_WALL_MARGIN` cells to the left wall and one more
/// than that on the right. On lanes too narrow for that the width shrinks, and
/// if even a one-tile opening cannot keep the margins it is centered instead.
pub fn opening_bounds(half_width: i32, requested_width: i32) -> (i32, Range<i32>) {
    let lo = -half_width + OPENING_WALL_MARGIN;
    let mut width = requested_width.max(1);
    while width > 1 && half_width - width - 1 <= lo {
        width -= 1;
    }
    let hi = half_width - width - 1;
    if hi > lo {
        (width, lo..hi)
    } else {
        let start = (-width / 2).max(-half_width);
        (width, start..start + 1)
    }
}

/// Safe-path rectangle for a gate: centered on the opening, `min_safe_path_width`
/// wide, spanning from `clearance_after` below the barrier row to
/// `clearance_before` above it.
pub fn compute_safe_zone(
    barrier_row: i32,
    opening_center: f32,
    min_safe_path_width: f32,
    clearance_before: f32,
    clearance_after: f32,
) -> Rect {
    let half = min_safe_path_width.max(0.0) / 2.0;
    let row = barrier_row as f32;
    Rect::new(
        opening_center - half,
        row - clearance_after.max(0.0),
        opening_center + half,
        row + clearance_before.max(0.0),
    )
}

// =============================================================================
// Planner
// =============================================================================

/// Decides barrier gates one segment ahead and owns the live barrier sections.
#[derive(Debug, Default)]
pub struct BarrierPlanner {
    pending: Option<BarrierPlan>,
    sections: Vec<BarrierSection>,
}

impl BarrierPlanner {
    /// Roll whether the next segment gets a gate and, if so, where its opening sits.
    /// With `enabled == false` (grace period) the next segment never gets one.
    pub fn decide_next(
        &mut self,
        rng: &mut TrackRng,
        track_width: i32,
        chance_denominator: u32,
        enabled: bool,
    ) -> Option<BarrierPlan> {
        self.pending = None;
        if !enabled || rng.0.gen_range(0..chance_denominator.max(1)) != 0 {
            return None;
        }

        let half_width = track_width / 2;
        let requested = rng.0.gen_range(OPENING_WIDTHS);
        let (opening_width, starts) = opening_bounds(half_width, requested);
        let opening_start = rng.0.gen_range(starts);

        let plan = BarrierPlan {
            opening_start,
            opening_width,
        };
        self.pending = Some(plan);
        Some(plan)
    }

    pub fn pending(&self) -> Option<BarrierPlan> {
        self.pending
    }

    /// Hand the pending decision to the segment generator.
    pub fn take_pending(&mut self) -> Option<BarrierPlan> {
        self.pending.take()
    }

    /// Compute the safe zone for a populated draft and make it live. Drafts
    /// without barrier tiles are dropped.
    pub fn commit(
        &mut self,
        draft: BarrierDraft,
        config: &TrackConfig,
    ) -> Option<&BarrierSection> {
        if draft.barrier_positions.is_empty() {
            return None;
        }
        let safe_zone = compute_safe_zone(
            draft.barrier_row,
            draft.opening_center,
            config.min_safe_path_width,
            config.clearance_before_barrier,
            config.clearance_after_barrier,
        );
        self.sections.push(BarrierSection::from_draft(draft, safe_zone));
        self.sections.last()
    }

    pub fn sections(&self) -> &[BarrierSection] {
        &self.sections
    }

    /// True when `point` lies inside any live safe zone or buffer zone.
    pub fn in_any_zone(&self, point: Vec2) -> bool {
        self.sections.iter().any(|section| section.excludes(point))
    }

    /// Drop sections whose row is more than `distance` behind `player_y`.
    /// The track runs towards negative `y`, so behind means above.
    /// Returns the number removed.
    pub fn prune_behind(&mut self, player_y: f32, distance: f32) -> usize {
        let before = self.sections.len();
        self.sections
            .retain(|section| section.barrier_row as f32 <= player_y + distance);
        before - self.sections.len()
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.sections.clear();
    }
}
