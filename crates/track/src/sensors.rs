//! Read-only perception queries.
//!
//! Rays walk the tile grid cell by cell (DDA) and test live obstacles as
//! discs, reporting the nearest hit as a fraction of the ray length. Nothing
//! here mutates the track.

use bevy::math::Vec2;

use crate::config::OCCUPANCY_RADIUS;
use crate::obstacles::ObstacleField;
use crate::tile_grid::{TileGrid, TileLayer, TilePosition};

pub const DEFAULT_RAY_COUNT: usize = 41;
pub const DEFAULT_RAY_LENGTH: f32 = 20.0;
/// Degrees, counter-clockwise from +x. The default fan sweeps from slightly
/// right of forward-right, over the top, to slightly past the left.
pub const DEFAULT_START_ANGLE: f32 = 30.0;
pub const DEFAULT_END_ANGLE: f32 = -210.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitKind {
    Wall,
    Barrier,
    Obstacle,
    Ramp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit distance divided by the ray length, in `[0, 1]`.
    pub distance: f32,
    pub kind: HitKind,
}

/// Parameters of a fan of rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayFan {
    pub count: usize,
    pub start_angle_deg: f32,
    pub end_angle_deg: f32,
    pub length: f32,
}

impl Default for RayFan {
    fn default() -> Self {
        Self {
            count: DEFAULT_RAY_COUNT,
            start_angle_deg: DEFAULT_START_ANGLE,
            end_angle_deg: DEFAULT_END_ANGLE,
            length: DEFAULT_RAY_LENGTH,
        }
    }
}

impl RayFan {
    /// Unit direction of ray `i`, interpolated linearly between the two angles.
    pub fn direction(&self, i: usize) -> Vec2 {
        let t = if self.count > 1 {
            i as f32 / (self.count - 1) as f32
        } else {
            0.0
        };
        let angle = self.start_angle_deg + (self.end_angle_deg - self.start_angle_deg) * t;
        Vec2::from_angle(angle.to_radians())
    }
}

fn blocking_kind(grid: &TileGrid, cell: TilePosition) -> Option<HitKind> {
    match grid.layer_at(cell)? {
        TileLayer::Barrier => Some(HitKind::Barrier),
        TileLayer::Wall => Some(HitKind::Wall),
        TileLayer::Road => None,
    }
}

/// Distance along the ray to the first wall or barrier cell within `length`.
fn march_tiles(grid: &TileGrid, origin: Vec2, dir: Vec2, length: f32) -> Option<(f32, HitKind)> {
    let mut cell = TileGrid::world_to_cell(origin);
    if let Some(kind) = blocking_kind(grid, cell) {
        return Some((0.0, kind));
    }

    let step_x = if dir.x >= 0.0 { 1 } else { -1 };
    let step_y = if dir.y >= 0.0 { 1 } else { -1 };

    let boundary = |index: i32, step: i32| if step > 0 { (index + 1) as f32 } else { index as f32 };
    let mut t_max_x = if dir.x.abs() < 1e-8 {
        f32::INFINITY
    } else {
        (boundary(cell.x, step_x) - origin.x) / dir.x
    };
    let mut t_max_y = if dir.y.abs() < 1e-8 {
        f32::INFINITY
    } else {
        (boundary(cell.y, step_y) - origin.y) / dir.y
    };
    let t_delta_x = if dir.x.abs() < 1e-8 {
        f32::INFINITY
    } else {
        1.0 / dir.x.abs()
    };
    let t_delta_y = if dir.y.abs() < 1e-8 {
        f32::INFINITY
    } else {
        1.0 / dir.y.abs()
    };

    loop {
        let t = if t_max_x < t_max_y {
            cell.x += step_x;
            let t = t_max_x;
            t_max_x += t_delta_x;
            t
        } else {
            cell.y += step_y;
            let t = t_max_y;
            t_max_y += t_delta_y;
            t
        };
        if t > length {
            return None;
        }
        if let Some(kind) = blocking_kind(grid, cell) {
            return Some((t, kind));
        }
    }
}

/// Entry distance of the ray into a disc, if it enters within `length`.
fn ray_disc(origin: Vec2, dir: Vec2, center: Vec2, radius: f32, length: f32) -> Option<f32> {
    let to_center = center - origin;
    if to_center.length_squared() <= radius * radius {
        return Some(0.0);
    }
    let along = to_center.dot(dir);
    if along < 0.0 {
        return None;
    }
    let miss_sq = to_center.length_squared() - along * along;
    if miss_sq > radius * radius {
        return None;
    }
    let t = along - (radius * radius - miss_sq).sqrt();
    (t <= length).then_some(t)
}

/// Cast one ray from `origin` along `dir` (need not be normalized).
/// Returns `None` when nothing is hit within `length`.
pub fn cast_ray(
    grid: &TileGrid,
    field: &ObstacleField,
    origin: Vec2,
    dir: Vec2,
    length: f32,
) -> Option<RayHit> {
    let dir = dir.try_normalize()?;
    if !(length.is_finite() && length > 0.0) || !origin.is_finite() {
        return None;
    }

    let mut nearest = march_tiles(grid, origin, dir, length);
    for obstacle in field.live() {
        let Some(t) = ray_disc(origin, dir, obstacle.position, OCCUPANCY_RADIUS, length) else {
            continue;
        };
        if nearest.map_or(true, |(best, _)| t < best) {
            let is_ramp = field
                .arena
                .get(obstacle.handle)
                .is_some_and(|instance| instance.kind.is_ramp);
            let kind = if is_ramp { HitKind::Ramp } else { HitKind::Obstacle };
            nearest = Some((t, kind));
        }
    }

    nearest.map(|(t, kind)| RayHit {
        distance: (t / length).clamp(0.0, 1.0),
        kind,
    })
}

/// Cast every ray of `fan` from `origin`, in fan order.
pub fn cast_fan(
    grid: &TileGrid,
    field: &ObstacleField,
    origin: Vec2,
    fan: &RayFan,
) -> Vec<Option<RayHit>> {
    (0..fan.count)
        .map(|i| cast_ray(grid, field, origin, fan.direction(i), fan.length))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::ObstacleKind;
    use crate::segments::{emit_segment, TrackState, TurnDirection};

    fn straight_track() -> TileGrid {
        let mut state = TrackState::new(10);
        let mut grid = TileGrid::new();
        emit_segment(&mut state, &mut grid, 10, 10, TurnDirection::Straight, None);
        grid
    }

    #[test]
    fn test_ray_hits_side_wall() {
        let grid = straight_track();
        let field = ObstacleField::default();
        // Lane cells -5..=5 span world x [-5, 6); the right wall starts at x = 6.
        let hit = cast_ray(&grid, &field, Vec2::new(0.5, -4.5), Vec2::X, 20.0)
            .expect("wall within range");
        assert_eq!(hit.kind, HitKind::Wall);
        assert!((hit.distance - 5.5 / 20.0).abs() < 1e-5);

        let hit = cast_ray(&grid, &field, Vec2::new(0.5, -4.5), Vec2::NEG_X, 20.0)
            .expect("wall within range");
        assert_eq!(hit.kind, HitKind::Wall);
        assert!((hit.distance - 5.5 / 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_misses_beyond_length() {
        let grid = straight_track();
        let field = ObstacleField::default();
        assert!(cast_ray(&grid, &field, Vec2::new(0.5, -4.5), Vec2::X, 4.0).is_none());
        // Down the lane there is nothing but road and then empty space.
        assert!(cast_ray(&grid, &field, Vec2::new(0.5, -0.5), Vec2::NEG_Y, 20.0).is_none());
    }

    #[test]
    fn test_ray_hits_barrier_before_wall() {
        let mut grid = straight_track();
        grid.set_tile(TileLayer::Barrier, TilePosition::new(0, -8));
        let field = ObstacleField::default();
        let hit = cast_ray(&grid, &field, Vec2::new(0.5, -0.5), Vec2::NEG_Y, 20.0)
            .expect("barrier within range");
        assert_eq!(hit.kind, HitKind::Barrier);
        // Barrier cell spans y [-8, -7).
        assert!((hit.distance - 6.5 / 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_reports_obstacles_and_ramps() {
        let grid = straight_track();
        let mut field = ObstacleField::default();
        field.spawn(ObstacleKind::new("rock", 40, false), Vec2::new(3.5, -4.5));
        field.spawn(ObstacleKind::new("ramp", 15, true), Vec2::new(-2.5, -4.5));

        let right = cast_ray(&grid, &field, Vec2::new(0.5, -4.5), Vec2::X, 20.0)
            .expect("rock within range");
        assert_eq!(right.kind, HitKind::Obstacle);
        assert!((right.distance - 2.5 / 20.0).abs() < 1e-5);

        let left = cast_ray(&grid, &field, Vec2::new(0.5, -4.5), Vec2::NEG_X, 20.0)
            .expect("ramp within range");
        assert_eq!(left.kind, HitKind::Ramp);
    }

    #[test]
    fn test_zero_direction_casts_nothing() {
        let grid = straight_track();
        let field = ObstacleField::default();
        assert!(cast_ray(&grid, &field, Vec2::new(0.5, -4.5), Vec2::ZERO, 20.0).is_none());
    }

    #[test]
    fn test_unbounded_or_invalid_rays_cast_nothing() {
        let grid = straight_track();
        let field = ObstacleField::default();
        let origin = Vec2::new(0.5, -0.5);
        // Down the lane the march would never meet a blocking cell.
        for length in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0, -3.0] {
            assert!(
                cast_ray(&grid, &field, origin, Vec2::NEG_Y, length).is_none(),
                "length {length} should cast nothing"
            );
        }
        let nan_origin = Vec2::new(f32::NAN, -0.5);
        assert!(cast_ray(&grid, &field, nan_origin, Vec2::NEG_Y, 20.0).is_none());
    }

    #[test]
    fn test_default_fan_geometry() {
        let fan = RayFan::default();
        assert_eq!(fan.count, 41);
        assert!((fan.direction(0) - Vec2::from_angle(30f32.to_radians())).length() < 1e-5);
        assert!((fan.direction(40) - Vec2::from_angle((-210f32).to_radians())).length() < 1e-5);
        // Midpoint of 30 and -210 is -90: straight down the track.
        assert!((fan.direction(20) - Vec2::NEG_Y).length() < 1e-5);

        let grid = straight_track();
        let field = ObstacleField::default();
        let readings = cast_fan(&grid, &field, Vec2::new(0.5, -0.5), &fan);
        assert_eq!(readings.len(), 41);
        assert!(readings.iter().flatten().all(|hit| (0.0..=1.0).contains(&hit.distance)));
    }
}
