//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::types::{ChannelCapacity, HistoryPoints, MetricName, WindowSize};

/// How each line from the metrics source is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PayloadLayout {
    /// A full metrics report; counters sit under the configured metric name
    #[default]
    Report,
    /// The counter object itself: `{ "pending": 10, ... }`
    Flat,
}

impl PayloadLayout {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Flat => "flat",
        }
    }
}

impl std::fmt::Display for PayloadLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Aggregation settings
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    /// Metrics source settings
    #[serde(default)]
    pub source: SourceConfig,
}

/// Aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatorConfig {
    /// Samples in the rolling "sessions opened" window
    #[serde(default = "super::defaults::window_size")]
    pub window_size: WindowSize,
    /// Points kept per chart series
    #[serde(default = "super::defaults::history_points")]
    pub history_points: HistoryPoints,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            window_size: super::defaults::window_size(),
            history_points: super::defaults::history_points(),
        }
    }
}

/// Metrics source settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Metric the dialer counters are reported under
    #[serde(default)]
    pub metric: MetricName,
    /// Layout of each input line
    #[serde(default)]
    pub layout: PayloadLayout,
    /// Depth of the queue between the reader and the aggregator
    #[serde(default = "super::defaults::channel_capacity")]
    pub channel_capacity: ChannelCapacity,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            metric: MetricName::default(),
            layout: PayloadLayout::default(),
            channel_capacity: super::defaults::channel_capacity(),
        }
    }
}
