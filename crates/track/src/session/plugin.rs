use bevy::prelude::*;

use crate::config::{TrackConfig, ViewportConfig};

use super::state::TrackSession;

/// Marks the vehicle entity whose `Transform` drives generation.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct TrackPlayer;

/// Sent by the host (e.g. on a crash) to tear down and rebuild the track.
#[derive(Event, Debug, Default, Clone, Copy)]
pub struct TrackResetRequest;

/// All track systems run in this set inside `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackSet;

pub struct TrackPlugin;

impl Plugin for TrackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrackConfig>()
            .init_resource::<ViewportConfig>()
            .add_event::<TrackResetRequest>()
            .add_systems(Startup, init_track_session)
            .add_systems(
                FixedUpdate,
                (apply_track_resets, sync_track_config, advance_track)
                    .chain()
                    .in_set(TrackSet),
            );
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn init_track_session(
    mut commands: Commands,
    config: Res<TrackConfig>,
    viewport: Res<ViewportConfig>,
    time: Res<Time>,
) {
    let session = TrackSession::new(config.clone(), *viewport, time.elapsed_secs_f64());
    info!(
        "Track session started: seed {}, width {}, {} initial segments",
        session.config().seed,
        session.config().track_width,
        session.config().initial_segments
    );
    commands.insert_resource(session);
}

/// Handle reset requests. Without a player there is nothing to restart for,
/// so the request is logged and dropped.
pub fn apply_track_resets(
    mut requests: EventReader<TrackResetRequest>,
    players: Query<(), With<TrackPlayer>>,
    mut session: ResMut<TrackSession>,
    time: Res<Time>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if players.is_empty() {
        warn!("Track reset requested but no TrackPlayer entity exists, skipping");
        return;
    }
    session.reset_track(time.elapsed_secs_f64());
}

/// Copy a changed `TrackConfig` resource into the session. It takes effect
/// from the next generated segment.
pub fn sync_track_config(config: Res<TrackConfig>, mut session: ResMut<TrackSession>) {
    if config.is_changed() {
        session.set_config(config.clone());
    }
}

pub fn advance_track(
    players: Query<&Transform, With<TrackPlayer>>,
    mut session: ResMut<TrackSession>,
    time: Res<Time>,
) {
    let Ok(transform) = players.get_single() else {
        warn_once!("No single TrackPlayer entity found, track is not advancing");
        return;
    };
    let report = session.advance(transform.translation.truncate(), time.elapsed_secs_f64());
    if report.safe_zone_removed > 0 {
        debug!(
            "Removed {} obstacles from safe zones this tick",
            report.safe_zone_removed
        );
    }
}
