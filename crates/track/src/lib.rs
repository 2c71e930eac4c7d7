//! Endless vertically scrolling lane track.
//!
//! The track grows one segment at a time towards negative `y`: a road
//! corridor bounded by walls, occasional barrier gates whose openings carry a
//! guaranteed safe zone, and weighted-random obstacles that never block the
//! lane. Old tiles, obstacles and barrier metadata are evicted once they fall
//! behind the player.
//!
//! [`TrackSession`] owns all of it and is driven once per tick; [`TrackPlugin`]
//! wires it into a Bevy app.

pub mod barriers;
pub mod cleanup;
pub mod config;
pub mod obstacles;
pub mod segments;
pub mod sensors;
pub mod session;
pub mod tile_grid;
pub mod track_rng;

pub use barriers::{BarrierPlan, BarrierSection};
pub use config::{ConfigIssue, TrackConfig, ViewportConfig};
pub use obstacles::{ObstacleHandle, ObstacleKind};
pub use segments::TurnDirection;
pub use sensors::{cast_fan, cast_ray, HitKind, RayFan, RayHit};
pub use session::{
    TickReport, TrackPhase, TrackPlayer, TrackPlugin, TrackResetRequest, TrackSession, TrackSet,
};
pub use tile_grid::{TileGrid, TileLayer, TilePosition};
pub use track_rng::TrackRng;
