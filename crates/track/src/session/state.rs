use bevy::log::{debug, info, warn};
use bevy::math::Vec2;
use bevy::prelude::Resource;

use crate::barriers::{BarrierPlanner, BarrierSection};
use crate::cleanup::{evict_tile_window, sweep_distant, sweep_safe_zone_violations, DistanceSweep};
use crate::config::{ConfigIssue, TrackConfig, ViewportConfig, MAX_TRACK_WIDTH, MIN_TRACK_WIDTH};
use crate::obstacles::{
    place_in_segment, ObstacleArena, ObstacleField, PlacementContext, PlacementReport,
};
use crate::segments::{emit_segment, sample_direction, TrackState, TurnDirection};
use crate::tile_grid::TileGrid;
use crate::track_rng::TrackRng;

/// Lifecycle of a track. A reset always lands back in `GracePeriod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackPhase {
    #[default]
    Initializing,
    /// Segments generate on demand but carry no obstacles or barriers.
    GracePeriod,
    Active,
}

/// Outcome of one `generate_segment` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentReport {
    pub direction: TurnDirection,
    pub road_tiles: usize,
    /// A barrier gate was committed in this segment's first row.
    pub barrier_committed: bool,
    /// Empty while obstacles are suppressed.
    pub placement: PlacementReport,
    pub tiles_evicted: usize,
}

/// Outcome of one `advance` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub phase: TrackPhase,
    pub segment: Option<SegmentReport>,
    pub safe_zone_removed: usize,
    pub sweep: DistanceSweep,
}

/// Owns every piece of track state and drives generation and cleanup.
///
/// The host calls [`TrackSession::advance`] once per tick with the player's
/// position and the elapsed simulated time, and [`TrackSession::reset_track`]
/// on a crash. Both complete synchronously, so anything read after the call
/// already sees the new geometry.
#[derive(Resource)]
pub struct TrackSession {
    /// Configuration as last handed in by the host.
    requested: TrackConfig,
    /// Sanitized snapshot the current segment was generated with.
    config: TrackConfig,
    reported_issues: Vec<ConfigIssue>,
    visible_half_width: f32,
    rng: TrackRng,
    grid: TileGrid,
    state: TrackState,
    barriers: BarrierPlanner,
    obstacles: ObstacleField,
    phase: TrackPhase,
    grace_deadline: f64,
}

impl TrackSession {
    /// Build a session and synchronously generate the initial buffer.
    pub fn new(config: TrackConfig, viewport: ViewportConfig, now: f64) -> Self {
        let rng = TrackRng::from_seed_u64(config.seed);
        let mut session = Self {
            state: TrackState::new(config.track_width),
            config: config.clone(),
            requested: config,
            reported_issues: Vec::new(),
            visible_half_width: viewport.visible_half_width(),
            rng,
            grid: TileGrid::new(),
            barriers: BarrierPlanner::default(),
            obstacles: ObstacleField::default(),
            phase: TrackPhase::Initializing,
            grace_deadline: now,
        };
        session.refresh_config();
        session.state.track_width = session.config.track_width;
        session.start_grace_period(now);
        session
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn barrier_sections(&self) -> &[BarrierSection] {
        self.barriers.sections()
    }

    pub fn barrier_planner(&self) -> &BarrierPlanner {
        &self.barriers
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    /// The host moves or destroys obstacles through their handles here.
    pub fn obstacle_arena_mut(&mut self) -> &mut ObstacleArena {
        &mut self.obstacles.arena
    }

    /// The sanitized configuration in effect for the latest segment.
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// The configuration as requested. Changes apply from the next segment.
    pub fn requested_config(&self) -> &TrackConfig {
        &self.requested
    }

    pub fn config_mut(&mut self) -> &mut TrackConfig {
        &mut self.requested
    }

    pub fn set_config(&mut self, config: TrackConfig) {
        self.requested = config;
    }

    pub fn visible_half_width(&self) -> f32 {
        self.visible_half_width
    }

    /// Simulated time at which the grace period ends (or ended).
    pub fn grace_deadline(&self) -> f64 {
        self.grace_deadline
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// One tick: generate a segment if the player is near the head, then run
    /// the safe-zone sweep and the distance sweep.
    pub fn advance(&mut self, player: Vec2, now: f64) -> TickReport {
        self.update_phase(now);
        let mut report = TickReport::default();

        if player.y - (self.state.head.y as f32) < self.config.track_buffer_distance {
            self.refresh_config();
            let length = self.config.segment_length;
            let width = self.config.track_width;
            let direction = sample_direction(
                &mut self.rng,
                self.state.direction,
                self.state.head.x,
                length,
                width,
                self.visible_half_width,
            );
            report.segment = Some(self.generate_segment(length, width, direction));
        }

        report.safe_zone_removed = sweep_safe_zone_violations(&mut self.obstacles, &self.barriers);
        report.sweep = sweep_distant(
            &mut self.obstacles,
            &mut self.barriers,
            player,
            self.config.cleanup_distance,
        );
        report.phase = self.phase;
        report
    }

    /// Emit one segment at the head, commit any pending barrier gate, place
    /// obstacles when active, plan the next gate and trim the tile window.
    pub fn generate_segment(
        &mut self,
        length: i32,
        width: i32,
        direction: TurnDirection,
    ) -> SegmentReport {
        self.refresh_config();
        let length = length.max(1);
        let width = width.clamp(MIN_TRACK_WIDTH, MAX_TRACK_WIDTH);
        let active = self.phase == TrackPhase::Active;

        let plan = self.barriers.take_pending();
        let mut segment =
            emit_segment(&mut self.state, &mut self.grid, length, width, direction, plan);

        let barrier_committed = segment
            .barrier
            .take()
            .and_then(|draft| self.barriers.commit(draft, &self.config))
            .is_some();

        let placement = if active {
            let ctx = PlacementContext {
                grid: &self.grid,
                barriers: &self.barriers,
                config: &self.config,
                direction,
            };
            place_in_segment(
                &mut self.obstacles,
                &mut self.rng,
                &ctx,
                &segment.road,
                &segment.left_walls,
                &segment.right_walls,
            )
        } else {
            PlacementReport::default()
        };

        self.barriers.decide_next(
            &mut self.rng,
            width,
            self.config.barrier_chance_denominator,
            active,
        );

        let max_tiles = self.config.max_track_segments as usize * width as usize;
        let tiles_evicted = evict_tile_window(&mut self.state, &mut self.grid, max_tiles);

        debug!(
            "Generated {:?} segment, head now at {:?}, barrier: {}, obstacles: {}",
            direction,
            self.state.head,
            barrier_committed,
            placement.placed.len()
        );

        SegmentReport {
            direction,
            road_tiles: segment.road.len(),
            barrier_committed,
            placement,
            tiles_evicted,
        }
    }

    /// Tear everything down, re-seed, re-enter the grace period and rebuild
    /// the initial buffer before returning.
    pub fn reset_track(&mut self, now: f64) {
        self.grid.clear_all();
        self.obstacles.clear();
        self.barriers.clear();
        self.refresh_config();
        self.state.reset(self.config.track_width);
        self.rng.reseed(self.config.seed);
        self.phase = TrackPhase::Initializing;
        self.start_grace_period(now);
        info!("Track reset, grace period until t={:.2}s", self.grace_deadline);
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn start_grace_period(&mut self, now: f64) {
        self.grace_deadline = now + self.config.grace_period_secs;
        self.phase = TrackPhase::GracePeriod;
        for _ in 0..self.config.initial_segments {
            let (length, width) = (self.config.segment_length, self.config.track_width);
            self.generate_segment(length, width, TurnDirection::Straight);
        }
    }

    fn update_phase(&mut self, now: f64) {
        if self.phase == TrackPhase::GracePeriod && now >= self.grace_deadline {
            self.phase = TrackPhase::Active;
            info!("Grace period over, obstacles and barriers enabled");
        }
    }

    fn refresh_config(&mut self) {
        let (config, issues) = self.requested.sanitized();
        if issues != self.reported_issues {
            for issue in &issues {
                warn!("Track config value out of range, clamped: {:?}", issue);
            }
            self.reported_issues = issues;
        }
        self.config = config;
    }
}
