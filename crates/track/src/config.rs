use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::obstacles::ObstacleKind;

/// Rows per generated segment.
pub const SEGMENT_LENGTH: i32 = 10;
/// Segments generated synchronously at startup and after every reset.
pub const INITIAL_SEGMENTS: u32 = 8;
/// Seconds after (re)initialization during which obstacles and barriers are suppressed.
pub const GRACE_PERIOD_SECS: f64 = 3.0;
/// Distance behind the player after which obstacles and barrier sections are dropped.
pub const CLEANUP_DISTANCE: f32 = 30.0;
/// Rejection-sampling attempts per segment.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 30;
/// Obstacles closer than this horizontally count as sharing a lane.
pub const SAME_LANE_DISTANCE: f32 = 2.0;
/// An obstacle within this distance of a cell center occupies the cell.
pub const OCCUPANCY_RADIUS: f32 = 0.5;
/// Free cells one side of an obstacle must keep for the path to stay open.
pub const MIN_BYPASS_CELLS: i32 = 2;
/// Barrier openings keep at least this many lane cells to the wall on either side.
pub const OPENING_WALL_MARGIN: i32 = 2;

pub const MIN_TRACK_WIDTH: i32 = 4;
pub const MAX_TRACK_WIDTH: i32 = 40;
pub const MAX_OBSTACLES_STRAIGHT: u32 = 10;
pub const MAX_OBSTACLES_TURN: u32 = 8;
pub const MIN_SPAWN_WEIGHT: u32 = 1;
pub const MAX_SPAWN_WEIGHT: u32 = 100;

/// Tunables for track generation.
///
/// Fields may be changed between ticks (settings UI, training scripts); the
/// session re-sanitizes at the start of every segment so a change only
/// affects segments generated after it.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Seed for the track RNG. Every reset re-seeds from this value.
    pub seed: u64,
    pub track_width: i32,
    pub segment_length: i32,
    pub initial_segments: u32,
    /// A new segment is generated once the player is closer than this to the head.
    pub track_buffer_distance: f32,
    pub max_track_segments: u32,
    /// Minimum vertical distance between obstacles sharing a lane.
    pub min_safe_path_vertical: f32,
    /// Minimum distance from an obstacle to the nearest wall on each side.
    pub min_distance_from_walls: f32,
    pub clearance_before_barrier: f32,
    pub clearance_after_barrier: f32,
    /// Width of the safe-zone rectangle centered on a barrier opening.
    pub min_safe_path_width: f32,
    pub max_obstacles_in_straight_section: u32,
    pub max_obstacles_in_turn: u32,
    pub grace_period_secs: f64,
    pub cleanup_distance: f32,
    /// A barrier appears with probability `1 / barrier_chance_denominator`.
    pub barrier_chance_denominator: u32,
    pub obstacle_kinds: Vec<ObstacleKind>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            track_width: 10,
            segment_length: SEGMENT_LENGTH,
            initial_segments: INITIAL_SEGMENTS,
            track_buffer_distance: 10.0,
            max_track_segments: 100,
            min_safe_path_vertical: 3.0,
            min_distance_from_walls: 3.0,
            clearance_before_barrier: 8.0,
            clearance_after_barrier: 5.0,
            min_safe_path_width: 3.0,
            max_obstacles_in_straight_section: 2,
            max_obstacles_in_turn: 1,
            grace_period_secs: GRACE_PERIOD_SECS,
            cleanup_distance: CLEANUP_DISTANCE,
            barrier_chance_denominator: 5,
            obstacle_kinds: ObstacleKind::default_set(),
        }
    }
}

/// A configuration field that was out of range and got clamped.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    TrackWidth { requested: i32, used: i32 },
    SegmentLength { requested: i32, used: i32 },
    MaxObstaclesStraight { requested: u32, used: u32 },
    MaxObstaclesTurn { requested: u32, used: u32 },
    SpawnWeight { kind: String, requested: u32, used: u32 },
    NegativeDistance { field: &'static str, requested: f32 },
    GracePeriod { requested: f64 },
    BarrierChance { requested: u32 },
}

impl TrackConfig {
    /// Tile-count bound of the road-tile window.
    pub fn max_retained_tiles(&self) -> usize {
        self.max_track_segments as usize * self.track_width.max(0) as usize
    }

    /// Returns a copy with every field forced into its valid range, together
    /// with the list of fields that had to be changed.
    pub fn sanitized(&self) -> (TrackConfig, Vec<ConfigIssue>) {
        let mut cfg = self.clone();
        let mut issues = Vec::new();

        let width = cfg.track_width.clamp(MIN_TRACK_WIDTH, MAX_TRACK_WIDTH);
        if width != cfg.track_width {
            issues.push(ConfigIssue::TrackWidth {
                requested: cfg.track_width,
                used: width,
            });
            cfg.track_width = width;
        }

        let length = cfg.segment_length.max(1);
        if length != cfg.segment_length {
            issues.push(ConfigIssue::SegmentLength {
                requested: cfg.segment_length,
                used: length,
            });
            cfg.segment_length = length;
        }

        let straight = cfg
            .max_obstacles_in_straight_section
            .min(MAX_OBSTACLES_STRAIGHT);
        if straight != cfg.max_obstacles_in_straight_section {
            issues.push(ConfigIssue::MaxObstaclesStraight {
                requested: cfg.max_obstacles_in_straight_section,
                used: straight,
            });
            cfg.max_obstacles_in_straight_section = straight;
        }

        let turn = cfg.max_obstacles_in_turn.min(MAX_OBSTACLES_TURN);
        if turn != cfg.max_obstacles_in_turn {
            issues.push(ConfigIssue::MaxObstaclesTurn {
                requested: cfg.max_obstacles_in_turn,
                used: turn,
            });
            cfg.max_obstacles_in_turn = turn;
        }

        for kind in &mut cfg.obstacle_kinds {
            let weight = kind.spawn_weight.clamp(MIN_SPAWN_WEIGHT, MAX_SPAWN_WEIGHT);
            if weight != kind.spawn_weight {
                issues.push(ConfigIssue::SpawnWeight {
                    kind: kind.name.clone(),
                    requested: kind.spawn_weight,
                    used: weight,
                });
                kind.spawn_weight = weight;
            }
        }

        let distances: [(&'static str, &mut f32); 7] = [
            ("track_buffer_distance", &mut cfg.track_buffer_distance),
            ("min_safe_path_vertical", &mut cfg.min_safe_path_vertical),
            ("min_distance_from_walls", &mut cfg.min_distance_from_walls),
            ("clearance_before_barrier", &mut cfg.clearance_before_barrier),
            ("clearance_after_barrier", &mut cfg.clearance_after_barrier),
            ("min_safe_path_width", &mut cfg.min_safe_path_width),
            ("cleanup_distance", &mut cfg.cleanup_distance),
        ];
        for (field, value) in distances {
            if value.is_nan() || *value < 0.0 {
                issues.push(ConfigIssue::NegativeDistance {
                    field,
                    requested: *value,
                });
                *value = 0.0;
            }
        }

        if cfg.grace_period_secs.is_nan() || cfg.grace_period_secs < 0.0 {
            issues.push(ConfigIssue::GracePeriod {
                requested: cfg.grace_period_secs,
            });
            cfg.grace_period_secs = 0.0;
        }

        if cfg.barrier_chance_denominator == 0 {
            issues.push(ConfigIssue::BarrierChance { requested: 0 });
            cfg.barrier_chance_denominator = 1;
        }

        (cfg, issues)
    }
}

/// Orthographic camera extent, consumed once at initialization to bound turns.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Half the vertical extent of the orthographic view, in world units.
    pub orthographic_size: f32,
    /// Width divided by height.
    pub aspect: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            orthographic_size: 10.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl ViewportConfig {
    /// Horizontal half-extent the track must stay within, one cell inside the
    /// visible edge.
    pub fn visible_half_width(&self) -> f32 {
        (self.orthographic_size * self.aspect).floor() - 1.0
    }
}
