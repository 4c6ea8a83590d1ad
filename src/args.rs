//! Command-line arguments for the `dialer-stats` binary

use crate::config::{Config, PayloadLayout};
use crate::types::{MetricName, WindowSize};
use clap::Parser;
use std::path::PathBuf;

/// Aggregate cumulative dialer event counters into live connection statistics
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "dialer-stats.toml", env = "DIALER_STATS_CONFIG")]
    pub config: String,

    /// Read snapshots from this file instead of stdin (one JSON object per line)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Layout of each input line (overrides config file)
    #[arg(short, long, value_enum)]
    pub layout: Option<PayloadLayout>,

    /// Metric name holding the dialer counters (overrides config file)
    #[arg(short, long, value_parser = parse_metric)]
    pub metric: Option<MetricName>,

    /// Rolling window size in samples (overrides config file)
    #[arg(short, long)]
    pub window: Option<WindowSize>,

    /// Print a JSON summary of the final state on exit
    #[arg(long, default_value = "false")]
    pub summary: bool,

    /// Also write logs to debug.log
    #[arg(long, default_value = "false")]
    pub log_file: bool,
}

fn parse_metric(s: &str) -> Result<MetricName, String> {
    MetricName::parse(s).map_err(|e| e.to_string())
}

impl Args {
    /// Apply command-line overrides on top of a loaded configuration
    #[must_use]
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(layout) = self.layout {
            config.source.layout = layout;
        }
        if let Some(metric) = &self.metric {
            config.source.metric = metric.clone();
        }
        if let Some(window) = self.window {
            config.aggregator.window_size = window;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["dialer-stats"]).unwrap();

        assert!(args.input.is_none());
        assert!(args.layout.is_none());
        assert!(!args.summary);
        assert_eq!(args.apply_to(Config::default()), Config::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "dialer-stats",
            "--layout",
            "flat",
            "--metric",
            "webrtc_dialer_events_total",
            "--window",
            "30",
            "--input",
            "snapshots.jsonl",
        ])
        .unwrap();

        let config = args.apply_to(Config::default());
        assert_eq!(config.source.layout, PayloadLayout::Flat);
        assert_eq!(config.source.metric.as_str(), "webrtc_dialer_events_total");
        assert_eq!(config.aggregator.window_size.get(), 30);
        assert_eq!(args.input, Some(PathBuf::from("snapshots.jsonl")));
    }

    #[test]
    fn test_rejects_zero_window() {
        assert!(Args::try_parse_from(["dialer-stats", "--window", "0"]).is_err());
    }

    #[test]
    fn test_rejects_bad_metric() {
        assert!(Args::try_parse_from(["dialer-stats", "--metric", "not valid"]).is_err());
    }
}
