use bevy::log::debug;
use bevy::math::Vec2;
use rand::Rng;

use crate::barriers::BarrierPlanner;
use crate::config::{
    TrackConfig, MAX_PLACEMENT_ATTEMPTS, MIN_BYPASS_CELLS, SAME_LANE_DISTANCE,
};
use crate::segments::TurnDirection;
use crate::tile_grid::{TileGrid, TileLayer, TilePosition};
use crate::track_rng::TrackRng;

use super::selection::select_weighted;
use super::types::{ObstacleField, ObstacleHandle};

/// Read-only surroundings a placement is validated against.
pub struct PlacementContext<'a> {
    pub grid: &'a TileGrid,
    pub barriers: &'a BarrierPlanner,
    pub config: &'a TrackConfig,
    pub direction: TurnDirection,
}

/// Why a candidate tile was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InSafeZone,
    TooCloseVertically,
    TooCloseToWall,
    BlocksPath,
}

/// Free road cells either side of a placed obstacle at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedObstacle {
    pub handle: ObstacleHandle,
    pub tile: TilePosition,
    pub left_free: i32,
    pub right_free: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Target count rolled for the segment.
    pub requested: u32,
    pub attempts: u32,
    pub placed: Vec<PlacedObstacle>,
}

impl PlacementReport {
    pub fn shortfall(&self) -> u32 {
        self.requested.saturating_sub(self.placed.len() as u32)
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

/// Same-lane obstacle within `min_vertical` rows of `world`.
pub fn too_close_vertically(field: &ObstacleField, world: Vec2, min_vertical: f32) -> bool {
    field.live().any(|obstacle| {
        (obstacle.position.y - world.y).abs() < min_vertical
            && (obstacle.position.x - world.x).abs() < SAME_LANE_DISTANCE
    })
}

/// Distance from `world` to the nearest wall tile in the candidate's row.
/// `f32::MAX` when no wall qualifies.
pub fn nearest_wall_distance(world: Vec2, row: i32, walls: &[TilePosition]) -> f32 {
    walls
        .iter()
        .filter(|wall| (wall.y - row).abs() < 1)
        .map(|&wall| world.distance(TileGrid::cell_center_world(wall)))
        .fold(f32::MAX, f32::min)
}

/// A cell is free when it carries road, no barrier, and no obstacle.
fn cell_is_free(grid: &TileGrid, field: &ObstacleField, pos: TilePosition) -> bool {
    grid.has_tile(TileLayer::Road, pos)
        && !grid.has_tile(TileLayer::Barrier, pos)
        && !field.occupies(TileGrid::cell_center_world(pos))
}

/// Contiguous free cells to the left and right of `tile`, each capped at `reach`.
pub fn free_run(
    grid: &TileGrid,
    field: &ObstacleField,
    tile: TilePosition,
    reach: i32,
) -> (i32, i32) {
    let count = |step: i32| {
        (1..=reach)
            .take_while(|&d| cell_is_free(grid, field, tile.offset(step * d, 0)))
            .count() as i32
    };
    (count(-1), count(1))
}

/// An obstacle blocks the path unless at least one side keeps a
/// `MIN_BYPASS_CELLS`-wide bypass.
#[inline]
pub fn blocks_path(left_free: i32, right_free: i32) -> bool {
    left_free < MIN_BYPASS_CELLS && right_free < MIN_BYPASS_CELLS
}

/// Run every placement rule against a candidate, in order. On success returns
/// the free-cell counts either side.
pub fn validate_candidate(
    ctx: &PlacementContext,
    field: &ObstacleField,
    tile: TilePosition,
    left_walls: &[TilePosition],
    right_walls: &[TilePosition],
) -> Result<(i32, i32), Rejection> {
    let world = TileGrid::cell_center_world(tile);

    if ctx.barriers.in_any_zone(world) {
        return Err(Rejection::InSafeZone);
    }

    if too_close_vertically(field, world, ctx.config.min_safe_path_vertical) {
        return Err(Rejection::TooCloseVertically);
    }

    let min_wall = ctx.config.min_distance_from_walls;
    if nearest_wall_distance(world, tile.y, left_walls) < min_wall
        || nearest_wall_distance(world, tile.y, right_walls) < min_wall
    {
        return Err(Rejection::TooCloseToWall);
    }

    let (left_free, right_free) = free_run(ctx.grid, field, tile, ctx.config.track_width / 2);
    if blocks_path(left_free, right_free) {
        return Err(Rejection::BlocksPath);
    }

    Ok((left_free, right_free))
}

/// Obstacle budget for a segment heading in `direction`.
pub fn segment_budget(config: &TrackConfig, direction: TurnDirection) -> u32 {
    if direction.is_turn() {
        config.max_obstacles_in_turn
    } else {
        config.max_obstacles_in_straight_section
    }
}

// =============================================================================
// Placement
// =============================================================================

/// Best-effort obstacle placement for a freshly committed segment.
///
/// Rolls a target count in `[1, budget]`, then rejection-samples tiles from
/// the middle half of `road` for up to `MAX_PLACEMENT_ATTEMPTS` tries.
/// Falling short of the target is not an error.
pub fn place_in_segment(
    field: &mut ObstacleField,
    rng: &mut TrackRng,
    ctx: &PlacementContext,
    road: &[TilePosition],
    left_walls: &[TilePosition],
    right_walls: &[TilePosition],
) -> PlacementReport {
    let mut report = PlacementReport::default();

    let budget = segment_budget(ctx.config, ctx.direction);
    if budget == 0 || ctx.config.obstacle_kinds.is_empty() {
        return report;
    }

    let (lo, hi) = (road.len() / 4, road.len() * 3 / 4);
    if lo >= hi {
        return report;
    }

    report.requested = rng.0.gen_range(1..=budget);

    while (report.placed.len() as u32) < report.requested
        && report.attempts < MAX_PLACEMENT_ATTEMPTS
    {
        report.attempts += 1;

        let tile = road[rng.0.gen_range(lo..hi)];
        let (left_free, right_free) =
            match validate_candidate(ctx, field, tile, left_walls, right_walls) {
                Ok(free) => free,
                Err(_) => continue,
            };

        let Some(kind) =
            select_weighted(&ctx.config.obstacle_kinds, ctx.direction.is_turn(), rng)
        else {
            continue;
        };

        let handle = field.spawn(kind.clone(), TileGrid::cell_center_world(tile));
        report.placed.push(PlacedObstacle {
            handle,
            tile,
            left_free,
            right_free,
        });
    }

    debug!(
        "Obstacle placement: {}/{} placed in {} attempts",
        report.placed.len(),
        report.requested,
        report.attempts
    );
    report
}
