//! Obstacle placement: weighted kinds, the slot arena that owns spawned
//! obstacles, and the rejection sampler that places them into a new segment
//! without entering a safe zone, crowding a wall or blocking the lane.

pub mod placement;
pub mod selection;
pub mod types;

pub use placement::{
    blocks_path, free_run, nearest_wall_distance, place_in_segment, segment_budget,
    too_close_vertically, validate_candidate, PlacedObstacle, PlacementContext, PlacementReport,
    Rejection,
};
pub use selection::{pick_by_draw, select_weighted};
pub use types::{
    ObstacleArena, ObstacleField, ObstacleHandle, ObstacleInstance, ObstacleKind,
    TrackedObstacle,
};
