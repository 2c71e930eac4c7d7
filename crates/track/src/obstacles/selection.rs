use rand::Rng;

use crate::track_rng::TrackRng;

use super::types::ObstacleKind;

/// Pick a kind with probability proportional to its spawn weight.
///
/// Ramps are filtered out for turning segments. Returns `None` when nothing
/// is eligible or every eligible weight is zero.
pub fn select_weighted<'a>(
    kinds: &'a [ObstacleKind],
    is_turn: bool,
    rng: &mut TrackRng,
) -> Option<&'a ObstacleKind> {
    let eligible = move || kinds.iter().filter(move |kind| !(is_turn && kind.is_ramp));

    let total: u32 = eligible().map(|kind| kind.spawn_weight).sum();
    if total == 0 {
        return None;
    }

    let draw = rng.0.gen_range(0..total);
    pick_by_draw(eligible(), draw)
}

/// Walk `kinds` accumulating weights and return the first whose running total
/// exceeds `draw`. Ties go to list order.
pub fn pick_by_draw<'a>(
    kinds: impl Iterator<Item = &'a ObstacleKind>,
    draw: u32,
) -> Option<&'a ObstacleKind> {
    let mut accumulated = 0u32;
    for kind in kinds {
        accumulated += kind.spawn_weight;
        if draw < accumulated {
            return Some(kind);
        }
    }
    None
}
