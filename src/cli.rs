//! Command-line arguments for the visualiser.

use std::path::PathBuf;

use clap::Parser;

use crate::config::SimulationConfig;

/// Values given here override the ones loaded from the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "rust-orbit-sim", about = "Interactive Keplerian orbit visualiser")]
pub struct CliArgs {
    /// Path to a RON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial simulation rate multiplier
    #[arg(long)]
    pub sim_rate: Option<f64>,

    /// Physics step, in seconds
    #[arg(long)]
    pub delta_time: Option<f64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Start with time stopped
    #[arg(long)]
    pub paused: bool,
}

impl SimulationConfig {
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(rate) = args.sim_rate {
            self.clock.initial_sim_rate = rate;
        }
        if let Some(dt) = args.delta_time {
            self.clock.delta_time = dt;
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
        if args.paused {
            self.clock.start_paused = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = SimulationConfig::default();
        let args = CliArgs::parse_from(["rust-orbit-sim", "--sim-rate", "64", "--paused"]);
        config.apply_cli_overrides(&args);

        assert_eq!(config.clock.initial_sim_rate, 64.0);
        assert!(config.clock.start_paused);
        // Non-overridden fields retain defaults
        assert_eq!(config.clock.delta_time, 0.001);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = SimulationConfig::default();
        let mut config = SimulationConfig::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }
}
