//! `lanerunner`: a headless host that drives the track with a scripted car.
//!
//! Run with: cargo run -p lanerunner -- --seconds 60 --config track.json

mod args;
mod driver;

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use args::Args;
use driver::{DriverPlugin, DriverSettings, SPAWN};
use track::{TrackPlayer, TrackPlugin};

fn main() -> AppExit {
    let args = Args::parse();

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
    )
    .add_plugins(LogPlugin::default())
    .insert_resource(Time::<Fixed>::from_hz(60.0))
    .insert_resource(args.track_config())
    .add_plugins(TrackPlugin)
    .add_plugins(DriverPlugin {
        settings: DriverSettings {
            speed: args.speed,
            steer_speed: args.speed * 1.5,
            run_secs: args.seconds,
        },
    });

    app.world_mut()
        .spawn((TrackPlayer, Transform::from_translation(SPAWN.extend(0.0))));

    app.run()
}
