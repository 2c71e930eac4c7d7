//! Sliding-window memory management.
//!
//! Three independent sweeps keep the track bounded as it scrolls:
//! 1. The tile window evicts the oldest road tiles (and their walls and
//!    barrier tiles) once the road queue exceeds its bound.
//! 2. The distance sweep drops obstacles and barrier sections far from the
//!    player, and obstacles whose handle went stale.
//! 3. The safe-zone sweep refreshes every obstacle's position from the arena
//!    and destroys any that now sit inside a live safe or buffer zone.

use bevy::log::debug;
use bevy::math::Vec2;

use crate::barriers::BarrierPlanner;
use crate::obstacles::ObstacleField;
use crate::segments::TrackState;
use crate::tile_grid::{TileGrid, TileLayer, TilePosition};

/// Evict oldest road tiles until at most `max_tiles` remain. Returns the
/// number of road tiles evicted.
pub fn evict_tile_window(state: &mut TrackState, grid: &mut TileGrid, max_tiles: usize) -> usize {
    let half = state.track_width / 2;
    let mut evicted = 0;

    while state.road_tiles.len() > max_tiles {
        let Some(old) = state.road_tiles.pop_front() else {
            break;
        };
        grid.clear_tile(TileLayer::Road, old);
        grid.clear_tile(TileLayer::Wall, TilePosition::new(old.x - half - 1, old.y));
        grid.clear_tile(TileLayer::Wall, TilePosition::new(old.x + half + 1, old.y));

        if state
            .barrier_tiles
            .front()
            .is_some_and(|barrier| barrier.y >= old.y)
        {
            if let Some(barrier) = state.barrier_tiles.pop_front() {
                grid.clear_tile(TileLayer::Barrier, barrier);
            }
        }
        evicted += 1;
    }
    evicted
}

/// What the distance sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistanceSweep {
    pub stale_handles: usize,
    pub distant_obstacles: usize,
    pub barrier_sections: usize,
}

/// Drop obstacles with stale handles or farther than `distance` from the
/// player, and barrier sections more than `distance` behind.
pub fn sweep_distant(
    field: &mut ObstacleField,
    barriers: &mut BarrierPlanner,
    player: Vec2,
    distance: f32,
) -> DistanceSweep {
    let mut report = DistanceSweep::default();

    let mut tracked = std::mem::take(field.tracked_mut());
    tracked.retain(|obstacle| {
        if !field.arena.is_alive(obstacle.handle) {
            report.stale_handles += 1;
            return false;
        }
        if player.distance(obstacle.position) > distance {
            field.arena.despawn(obstacle.handle);
            report.distant_obstacles += 1;
            return false;
        }
        true
    });
    *field.tracked_mut() = tracked;

    report.barrier_sections = barriers.prune_behind(player.y, distance);
    report
}

/// Refresh tracked positions from the arena and destroy every obstacle inside
/// a live safe or buffer zone. Returns the number destroyed.
pub fn sweep_safe_zone_violations(field: &mut ObstacleField, barriers: &BarrierPlanner) -> usize {
    let mut tracked = std::mem::take(field.tracked_mut());
    let mut destroyed = 0;

    tracked.retain_mut(|obstacle| {
        let Some(position) = field.arena.position(obstacle.handle) else {
            // Stale handles are left for the distance sweep.
            return true;
        };
        obstacle.position = position;
        obstacle.checked_for_safe_zone_violation = true;

        if barriers.in_any_zone(position) {
            debug!("Obstacle at {:?} found in safe zone, removing it", position);
            field.arena.despawn(obstacle.handle);
            destroyed += 1;
            return false;
        }
        true
    });

    *field.tracked_mut() = tracked;
    destroyed
}
