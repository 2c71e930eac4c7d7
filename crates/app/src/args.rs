use std::path::{Path, PathBuf};

use clap::Parser;

use track::TrackConfig;

/// Command-line arguments for the headless track runner.
#[derive(Clone, Debug, Parser)]
#[command(name = "lanerunner", version, about, long_about = None)]
pub struct Args {
    /// JSON file with a track configuration; missing fields take their defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Overrides the seed from the configuration file.
    #[arg(long, value_name = "U64")]
    pub seed: Option<u64>,
    /// Simulated seconds to run before exiting.
    #[arg(long, value_name = "SECONDS", default_value_t = 30.0)]
    pub seconds: f64,
    /// Forward speed of the scripted car, world units per second.
    #[arg(long, value_name = "UNITS", default_value_t = 8.0)]
    pub speed: f32,
}

impl Args {
    /// Track configuration from `--config`, falling back to the defaults when
    /// the file is missing or malformed. `--seed` overrides the file.
    pub fn track_config(&self) -> TrackConfig {
        let mut config = match &self.config {
            Some(path) => match load_config(path) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("{err}, using default track config");
                    TrackConfig::default()
                }
            },
            None => TrackConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

fn load_config(path: &Path) -> Result<TrackConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("cannot parse {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_flags() {
        let args = Args::try_parse_from(["lanerunner"]).expect("no flags parse");
        assert_eq!(args.seconds, 30.0);
        assert_eq!(args.speed, 8.0);
        assert!(args.config.is_none());
        assert_eq!(args.track_config(), TrackConfig::default());
    }

    #[test]
    fn test_seed_overrides_default_config() {
        let args = Args::try_parse_from(["lanerunner", "--seed", "7", "--seconds", "2.5"])
            .expect("flags parse");
        assert_eq!(args.seconds, 2.5);
        assert_eq!(args.track_config().seed, 7);
    }

    #[test]
    fn test_rejects_bad_values_and_unknown_flags() {
        assert!(Args::try_parse_from(["lanerunner", "--seed", "-1"]).is_err());
        assert!(Args::try_parse_from(["lanerunner", "--speed", "fast"]).is_err());
        assert!(Args::try_parse_from(["lanerunner", "--config"]).is_err());
        assert!(Args::try_parse_from(["lanerunner", "--laps", "3"]).is_err());
    }

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let args = Args::try_parse_from([
            "lanerunner",
            "--config",
            "/nonexistent/track.json",
            "--seed",
            "9",
        ])
        .expect("flags parse");
        let config = args.track_config();
        assert_eq!(config.seed, 9);
        assert_eq!(config.track_width, TrackConfig::default().track_width);
    }
}
