use bevy::math::{Rect, Vec2};

use crate::tile_grid::TilePosition;

/// Opening geometry decided ahead of a segment. `opening_start` is relative to
/// the lane center, so the opening covers lane offsets
/// `[opening_start, opening_start + opening_width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierPlan {
    pub opening_start: i32,
    pub opening_width: i32,
}

impl BarrierPlan {
    #[inline]
    pub fn is_opening(&self, lane_offset: i32) -> bool {
        lane_offset >= self.opening_start && lane_offset < self.opening_start + self.opening_width
    }
}

/// A barrier gate under construction, before its tiles are committed.
#[derive(Debug, Clone)]
pub struct BarrierDraft {
    pub barrier_row: i32,
    pub plan: BarrierPlan,
    pub opening_center: f32,
    pub barrier_positions: Vec<TilePosition>,
}

impl BarrierDraft {
    pub fn new(head: TilePosition, plan: BarrierPlan) -> Self {
        Self {
            barrier_row: head.y,
            plan,
            opening_center: head.x as f32 + plan.opening_start as f32
                + plan.opening_width as f32 / 2.0,
            barrier_positions: Vec::new(),
        }
    }
}

/// A committed barrier gate and the regions obstacles must stay out of.
///
/// The safe zone is fixed at creation; the section is only ever removed as a
/// whole once it falls behind the player.
#[derive(Debug, Clone, PartialEq)]
pub struct BarrierSection {
    pub barrier_row: i32,
    pub opening_start: i32,
    pub opening_width: i32,
    /// World-space x of the opening's center.
    pub opening_center: f32,
    safe_zone: Rect,
    /// Finer exclusion rectangles around individual barrier tiles. Nothing
    /// populates these yet; they are honored by every zone check.
    pub buffer_zones: Vec<Rect>,
    pub barrier_positions: Vec<TilePosition>,
}

impl BarrierSection {
    pub(crate) fn from_draft(draft: BarrierDraft, safe_zone: Rect) -> Self {
        Self {
            barrier_row: draft.barrier_row,
            opening_start: draft.plan.opening_start,
            opening_width: draft.plan.opening_width,
            opening_center: draft.opening_center,
            safe_zone,
            buffer_zones: Vec::new(),
            barrier_positions: draft.barrier_positions,
        }
    }

    pub fn safe_zone(&self) -> Rect {
        self.safe_zone
    }

    /// Safe zone followed by every buffer zone, for renderers and debug overlays.
    pub fn zones(&self) -> impl Iterator<Item = Rect> + '_ {
        std::iter::once(self.safe_zone).chain(self.buffer_zones.iter().copied())
    }

    /// True when `point` lies in the safe zone or any buffer zone (edges inclusive).
    pub fn excludes(&self, point: Vec2) -> bool {
        self.zones().any(|zone| zone.contains(point))
    }
}
