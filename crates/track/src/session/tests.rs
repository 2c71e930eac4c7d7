//! Unit tests for the track session state machine and its Bevy plugin.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::config::{TrackConfig, ViewportConfig};
    use crate::session::{TrackPhase, TrackPlayer, TrackPlugin, TrackResetRequest, TrackSession};
    use crate::tile_grid::{TileGrid, TileLayer, TilePosition};

    fn no_grace() -> TrackConfig {
        TrackConfig {
            grace_period_secs: 0.0,
            ..TrackConfig::default()
        }
    }

    fn session_with(config: TrackConfig) -> TrackSession {
        TrackSession::new(config, ViewportConfig::default(), 0.0)
    }

    /// Follow the head down the track for `ticks` ticks, 0.5 units per tick.
    fn drive(session: &mut TrackSession, ticks: usize) -> Vec2 {
        let mut player = Vec2::new(0.5, 0.0);
        for tick in 0..ticks {
            player.y -= 0.5;
            player.x = session.state().head.x as f32 + 0.5;
            session.advance(player, 0.1 * tick as f64);
        }
        player
    }

    // -------------------------------------------------------------------------
    // Initialization and grace period
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_session_builds_initial_buffer() {
        let session = session_with(TrackConfig::default());
        assert_eq!(session.phase(), TrackPhase::GracePeriod);
        assert_eq!(session.state().head, TilePosition::new(0, -80));
        assert_eq!(session.state().road_tiles.len(), 8 * 110);
        assert_eq!(session.grid().tile_count(TileLayer::Barrier), 0);
        assert!(session.obstacles().tracked().is_empty());
        assert!(session.barrier_sections().is_empty());
        assert_eq!(session.visible_half_width(), 16.0);
    }

    #[test]
    fn test_grace_period_ends_on_deadline() {
        let mut session = session_with(TrackConfig::default());
        let far = Vec2::new(0.5, 0.0);
        assert_eq!(session.advance(far, 1.0).phase, TrackPhase::GracePeriod);
        assert_eq!(session.advance(far, 2.99).phase, TrackPhase::GracePeriod);
        assert_eq!(session.advance(far, 3.0).phase, TrackPhase::Active);
        assert_eq!(session.phase(), TrackPhase::Active);
    }

    #[test]
    fn test_grace_period_generates_without_obstacles_or_barriers() {
        let mut session = session_with(TrackConfig {
            grace_period_secs: 1_000.0,
            barrier_chance_denominator: 1,
            ..TrackConfig::default()
        });
        for i in 0..30 {
            let y = session.state().head.y as f32 + 5.0;
            let report = session.advance(Vec2::new(0.5, y), i as f64);
            let segment = report.segment.expect("player is inside the buffer distance");
            assert!(!segment.barrier_committed);
            assert!(segment.placement.placed.is_empty());
        }
        assert!(session.obstacles().tracked().is_empty());
        assert!(session.barrier_sections().is_empty());
    }

    // -------------------------------------------------------------------------
    // Ticking
    // -------------------------------------------------------------------------

    #[test]
    fn test_segment_generated_only_near_head() {
        let mut session = session_with(no_grace());
        let report = session.advance(Vec2::new(0.5, 0.0), 0.0);
        assert!(report.segment.is_none());
        assert_eq!(session.state().head.y, -80);

        let report = session.advance(Vec2::new(0.5, -75.0), 0.1);
        let segment = report.segment.expect("within buffer distance");
        assert_eq!(segment.road_tiles, 110);
        assert_eq!(session.state().head.y, -90);
    }

    #[test]
    fn test_active_track_places_obstacles_and_barriers() {
        let mut session = session_with(TrackConfig {
            barrier_chance_denominator: 2,
            ..no_grace()
        });
        let mut placed = 0;
        let mut gates = 0;
        for i in 0..60 {
            let y = session.state().head.y as f32 + 5.0;
            let report = session.advance(Vec2::new(0.5, y), i as f64);
            if let Some(segment) = report.segment {
                placed += segment.placement.placed.len();
                gates += usize::from(segment.barrier_committed);
            }
        }
        assert!(placed > 0, "no obstacles placed in 60 active segments");
        assert!(gates > 0, "no barrier gates in 60 active segments");
    }

    #[test]
    fn test_tick_invariants_hold_while_driving() {
        let mut session = session_with(no_grace());
        let max_tiles = session.config().max_retained_tiles();
        let mut player = Vec2::new(0.5, 0.0);
        for tick in 0..3_000 {
            player.y -= 0.5;
            player.x = session.state().head.x as f32 + 0.5;
            session.advance(player, tick as f64 * 0.02);

            assert!(session.state().road_tiles.len() <= max_tiles);
            for obstacle in session.obstacles().live() {
                assert!(
                    !session.barrier_planner().in_any_zone(obstacle.position),
                    "obstacle at {:?} inside a safe zone",
                    obstacle.position
                );
                assert!(obstacle.position.distance(player) <= 30.0);
            }
            for section in session.barrier_sections() {
                assert!(section.barrier_row as f32 <= player.y + 30.0);
            }
        }
    }

    #[test]
    fn test_host_moved_obstacle_into_safe_zone_is_destroyed() {
        let mut session = session_with(TrackConfig {
            barrier_chance_denominator: 1,
            ..no_grace()
        });
        let mut player = Vec2::ZERO;
        for i in 0..40 {
            player = Vec2::new(0.5, session.state().head.y as f32 + 5.0);
            session.advance(player, i as f64);
            if !session.obstacles().tracked().is_empty() && !session.barrier_sections().is_empty()
            {
                break;
            }
        }
        let zone = session
            .barrier_sections()
            .last()
            .expect("gate committed")
            .safe_zone();
        let handle = session.obstacles().tracked()[0].handle;

        assert!(session.obstacle_arena_mut().set_position(handle, zone.center()));
        let report = session.advance(Vec2::new(player.x, player.y + 20.0), 100.0);
        assert!(report.safe_zone_removed >= 1);
        assert!(!session.obstacles().arena.is_alive(handle));
    }

    #[test]
    fn test_host_despawned_obstacle_is_pruned() {
        let mut session = session_with(no_grace());
        drive(&mut session, 400);
        let Some(first) = session.obstacles().tracked().first().copied() else {
            panic!("expected obstacles after driving");
        };
        session.obstacle_arena_mut().despawn(first.handle);
        let report = session.advance(first.position, 1_000.0);
        assert!(report.sweep.stale_handles >= 1);
        assert!(session
            .obstacles()
            .tracked()
            .iter()
            .all(|tracked| tracked.handle != first.handle));
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    #[test]
    fn test_config_change_applies_to_next_segment() {
        let mut session = session_with(no_grace());
        session.config_mut().track_width = 6;
        // Nothing regenerates until the next segment.
        assert_eq!(session.config().track_width, 10);

        let report = session.advance(Vec2::new(0.5, -75.0), 0.0);
        assert_eq!(report.segment.expect("segment").road_tiles, 70);
        assert_eq!(session.config().track_width, 6);
        assert_eq!(session.state().track_width, 6);
    }

    #[test]
    fn test_out_of_range_config_is_clamped() {
        let mut session = session_with(no_grace());
        session.config_mut().track_width = 500;
        session.config_mut().max_obstacles_in_turn = 99;
        session.advance(Vec2::new(0.5, -75.0), 0.0);
        assert_eq!(session.config().track_width, 40);
        assert_eq!(session.config().max_obstacles_in_turn, 8);
        assert_eq!(session.requested_config().track_width, 500);
    }

    // -------------------------------------------------------------------------
    // Reset
    // -------------------------------------------------------------------------

    fn road_layout(session: &TrackSession) -> Vec<TilePosition> {
        session.state().road_tiles.iter().copied().collect()
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = session_with(no_grace());
        drive(&mut session, 500);

        session.reset_track(50.0);
        let first = road_layout(&session);
        assert_eq!(session.phase(), TrackPhase::GracePeriod);
        assert!(session.obstacles().tracked().is_empty());
        assert!(session.obstacles().arena.is_empty());
        assert!(session.barrier_sections().is_empty());
        assert_eq!(session.state().head, TilePosition::new(0, -80));

        session.reset_track(51.0);
        assert_eq!(road_layout(&session), first);
        assert!(session.obstacles().tracked().is_empty());
        assert!(session.barrier_sections().is_empty());
    }

    #[test]
    fn test_reset_restarts_identical_track() {
        let mut a = session_with(no_grace());
        let mut b = session_with(no_grace());
        drive(&mut a, 300);
        a.reset_track(0.0);
        drive(&mut a, 300);
        drive(&mut b, 300);
        assert_eq!(road_layout(&a), road_layout(&b));
        assert_eq!(a.state().head, b.state().head);
    }

    #[test]
    fn test_reset_clears_stale_tiles() {
        let mut session = session_with(no_grace());
        drive(&mut session, 400);
        session.reset_track(0.0);
        for tile in session.grid().tiles(TileLayer::Road) {
            assert!(tile.y <= 0 && tile.y > -80, "stale road tile {tile:?}");
        }
        assert_eq!(session.grid().tile_count(TileLayer::Road), 880);
        let player_cell = TileGrid::world_to_cell(Vec2::new(0.5, -0.5));
        assert!(session.grid().has_tile(TileLayer::Road, player_cell));
    }

    // -------------------------------------------------------------------------
    // Plugin
    // -------------------------------------------------------------------------

    fn build_app(player_at: Option<Vec2>) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(no_grace());
        app.add_plugins(TrackPlugin);
        if let Some(pos) = player_at {
            app.world_mut()
                .spawn((TrackPlayer, Transform::from_xyz(pos.x, pos.y, 0.0)));
        }
        // First update runs Startup, which builds the session.
        app.update();
        app
    }

    #[test]
    fn test_plugin_builds_session_at_startup() {
        let app = build_app(None);
        let session = app.world().resource::<TrackSession>();
        assert_eq!(session.state().head, TilePosition::new(0, -80));
    }

    #[test]
    fn test_plugin_advances_with_player() {
        let mut app = build_app(Some(Vec2::new(0.5, -75.0)));
        app.world_mut().run_schedule(FixedUpdate);
        let session = app.world().resource::<TrackSession>();
        assert!(session.state().head.y <= -90);
        assert_eq!(session.phase(), TrackPhase::Active);
    }

    #[test]
    fn test_plugin_skips_without_player() {
        let mut app = build_app(None);
        app.world_mut().send_event(TrackResetRequest);
        for _ in 0..5 {
            app.world_mut().run_schedule(FixedUpdate);
        }
        let session = app.world().resource::<TrackSession>();
        assert_eq!(session.state().head, TilePosition::new(0, -80));
        assert_eq!(session.phase(), TrackPhase::GracePeriod);
    }

    #[test]
    fn test_plugin_applies_reset_request() {
        let mut app = build_app(Some(Vec2::new(0.5, 0.0)));
        {
            let mut session = app.world_mut().resource_mut::<TrackSession>();
            for _ in 0..3 {
                session.generate_segment(10, 10, crate::segments::TurnDirection::Straight);
            }
            assert_eq!(session.state().head.y, -110);
        }
        app.world_mut().send_event(TrackResetRequest);
        app.world_mut().run_schedule(FixedUpdate);

        let session = app.world().resource::<TrackSession>();
        assert_eq!(session.state().head, TilePosition::new(0, -80));
        assert!(session.obstacles().tracked().is_empty());
    }

    #[test]
    fn test_plugin_syncs_changed_config() {
        let mut app = build_app(Some(Vec2::new(0.5, 0.0)));
        app.world_mut().resource_mut::<TrackConfig>().track_width = 6;
        app.world_mut().run_schedule(FixedUpdate);
        let session = app.world().resource::<TrackSession>();
        assert_eq!(session.requested_config().track_width, 6);
    }
}
