//! Track session: the state machine that owns the grid, the barrier planner
//! and the obstacle field, plus the Bevy plugin that drives it from
//! `FixedUpdate`.
//!
//! A session starts in the grace period with an initial buffer of straight
//! segments already generated. Once the grace deadline passes it becomes
//! active and new segments carry barriers and obstacles. A reset request
//! rebuilds everything synchronously and re-enters the grace period.

pub mod plugin;
pub mod state;
mod tests;

pub use plugin::{
    advance_track, apply_track_resets, init_track_session, sync_track_config, TrackPlayer,
    TrackPlugin, TrackResetRequest, TrackSet,
};
pub use state::{SegmentReport, TickReport, TrackPhase, TrackSession};
