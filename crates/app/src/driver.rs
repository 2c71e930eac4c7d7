//! Scripted vehicle for the headless host.
//!
//! The car rolls down the track at a constant speed and steers towards the
//! middle of the road a few rows ahead, dodging sideways when its forward ray
//! sees something in the way. Leaving the road or touching a wall, barrier or
//! non-ramp obstacle counts as a crash and requests a track reset.

use bevy::prelude::*;

use track::{
    cast_ray, HitKind, TileGrid, TileLayer, TilePosition, TrackPlayer, TrackResetRequest,
    TrackSession, TrackSet,
};

/// Where the car respawns after a crash.
pub const SPAWN: Vec2 = Vec2::new(0.5, -0.5);

const LOOK_AHEAD_ROWS: f32 = 4.0;
const DODGE_RANGE: f32 = 6.0;
const COLLISION_RADIUS: f32 = 0.5;

#[derive(Resource, Debug, Clone, Copy)]
pub struct DriverSettings {
    /// Forward speed, world units per second.
    pub speed: f32,
    /// Lateral speed, world units per second.
    pub steer_speed: f32,
    pub run_secs: f64,
}

#[derive(Resource, Debug, Default)]
pub struct RunStats {
    pub crashes: u32,
    pub best_distance: f32,
    pub segments: u32,
    last_report: f64,
}

pub struct DriverPlugin {
    pub settings: DriverSettings,
}

impl Plugin for DriverPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings)
            .init_resource::<RunStats>()
            .add_systems(
                FixedUpdate,
                (steer_vehicle, detect_crashes).chain().before(TrackSet),
            )
            .add_systems(Update, (report_progress, stop_after_run_time).chain());
    }
}

// =============================================================================
// Steering
// =============================================================================

/// Center of the road cells in the row at `y`, searched around `near_x`.
fn road_center(grid: &TileGrid, near_x: f32, y: f32) -> Option<f32> {
    let row = TileGrid::world_to_cell(Vec2::new(near_x, y));
    let cells: Vec<i32> = (-20..=20)
        .map(|dx| row.x + dx)
        .filter(|&x| grid.layer_at(TilePosition::new(x, row.y)) == Some(TileLayer::Road))
        .collect();
    let (min, max) = (cells.iter().min()?, cells.iter().max()?);
    Some((*min + *max) as f32 / 2.0 + 0.5)
}

/// Lateral target for the car at `pos`: the road center ahead, or the nearest
/// clear lane when something blocks the way.
fn steering_target(session: &TrackSession, pos: Vec2) -> f32 {
    let grid = session.grid();
    let obstacles = session.obstacles();
    let center = road_center(grid, pos.x, pos.y - LOOK_AHEAD_ROWS).unwrap_or(pos.x);

    let blocked = |x: f32| {
        matches!(
            cast_ray(grid, obstacles, Vec2::new(x, pos.y), Vec2::NEG_Y, DODGE_RANGE),
            Some(hit) if hit.kind != HitKind::Ramp
        )
    };
    if !blocked(pos.x) {
        return center;
    }

    (1..=5)
        .flat_map(|step| [pos.x - step as f32, pos.x + step as f32])
        .find(|&x| {
            let cell = TileGrid::world_to_cell(Vec2::new(x, pos.y));
            grid.layer_at(cell) == Some(TileLayer::Road) && !blocked(x)
        })
        .unwrap_or(center)
}

pub fn steer_vehicle(
    time: Res<Time>,
    settings: Res<DriverSettings>,
    session: Res<TrackSession>,
    mut players: Query<&mut Transform, With<TrackPlayer>>,
) {
    let dt = time.delta_secs();
    for mut transform in &mut players {
        let pos = transform.translation.truncate();
        let target = steering_target(&session, pos);
        let max_step = settings.steer_speed * dt;
        transform.translation.x += (target - pos.x).clamp(-max_step, max_step);
        transform.translation.y -= settings.speed * dt;
    }
}

// =============================================================================
// Crashes
// =============================================================================

fn crashed(session: &TrackSession, pos: Vec2) -> bool {
    let cell = TileGrid::world_to_cell(pos);
    if session.grid().layer_at(cell) != Some(TileLayer::Road) {
        return true;
    }
    session.obstacles().live().any(|obstacle| {
        obstacle.position.distance(pos) < COLLISION_RADIUS * 2.0
            && session
                .obstacles()
                .arena
                .get(obstacle.handle)
                .is_some_and(|instance| !instance.kind.is_ramp)
    })
}

pub fn detect_crashes(
    session: Res<TrackSession>,
    mut players: Query<&mut Transform, With<TrackPlayer>>,
    mut resets: EventWriter<TrackResetRequest>,
    mut stats: ResMut<RunStats>,
) {
    for mut transform in &mut players {
        let pos = transform.translation.truncate();
        let distance = SPAWN.y - pos.y;
        stats.best_distance = stats.best_distance.max(distance);
        if !crashed(&session, pos) {
            continue;
        }
        stats.crashes += 1;
        info!("Crash at {:?} after {:.1} units", pos, distance);
        transform.translation = SPAWN.extend(0.0);
        resets.send(TrackResetRequest);
    }
}

// =============================================================================
// Run control
// =============================================================================

pub fn report_progress(
    time: Res<Time>,
    session: Res<TrackSession>,
    mut stats: ResMut<RunStats>,
) {
    let now = time.elapsed_secs_f64();
    if now - stats.last_report < 5.0 {
        return;
    }
    stats.last_report = now;
    stats.segments = (-session.state().head.y / session.config().segment_length.max(1)) as u32;
    info!(
        "t={:.0}s phase={:?} head={:?} obstacles={} gates={} crashes={}",
        now,
        session.phase(),
        session.state().head,
        session.obstacles().tracked().len(),
        session.barrier_sections().len(),
        stats.crashes
    );
}

pub fn stop_after_run_time(
    time: Res<Time>,
    settings: Res<DriverSettings>,
    stats: Res<RunStats>,
    mut exit: EventWriter<AppExit>,
) {
    if time.elapsed_secs_f64() < settings.run_secs {
        return;
    }
    info!(
        "Run finished: {} crashes, best distance {:.1}, {} segments on the current track",
        stats.crashes, stats.best_distance, stats.segments
    );
    exit.send(AppExit::Success);
}

#[cfg(test)]
mod tests {
    use super::*;
    use track::{TrackConfig, ViewportConfig};

    fn session() -> TrackSession {
        TrackSession::new(TrackConfig::default(), ViewportConfig::default(), 0.0)
    }

    #[test]
    fn test_road_center_on_straight_track() {
        let session = session();
        assert_eq!(road_center(session.grid(), 3.0, -10.5), Some(0.5));
        assert_eq!(road_center(session.grid(), 0.5, 50.0), None);
    }

    #[test]
    fn test_spawn_is_safe_and_walls_are_not() {
        let session = session();
        assert!(!crashed(&session, SPAWN));
        assert!(crashed(&session, Vec2::new(6.5, -3.5)));
        assert!(crashed(&session, Vec2::new(0.5, 10.0)));
    }

    #[test]
    fn test_clear_road_steers_to_center() {
        let session = session();
        assert_eq!(steering_target(&session, Vec2::new(2.5, -5.5)), 0.5);
    }
}
