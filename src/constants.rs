//! Constants used throughout the dialer statistics pipeline
//!
//! Centralizes names and limits so the aggregator, sinks and config agree.

/// Metric naming
pub mod metric {
    /// Metric the dialer reports its cumulative event counters under
    pub const DIALER_EVENTS: &str = "libp2p_webtransport_dialer_events_total";
}

/// Rolling window and chart history defaults
pub mod window {
    /// Samples kept in the "sessions opened" window (one minute at 1 Hz)
    pub const SAMPLES: usize = 60;

    /// Points kept per chart series (three minutes at 1 Hz)
    pub const HISTORY_POINTS: usize = 3 * 60;

    /// Unit label once the window holds a full minute of samples
    pub const FULL_UNIT: &str = "minute";
}

/// Failure rate display
pub mod rate {
    /// Shown when no attempt has completed yet
    pub const NO_DATA: &str = "n/a";

    /// Decimal places for percentages
    pub const DECIMALS: usize = 2;
}

/// Logging
pub mod logging {
    /// Default filter when `RUST_LOG` is unset
    pub const DEFAULT_FILTER: &str = "info";

    /// File written by the optional file layer
    pub const LOG_FILE: &str = "debug.log";
}

/// Environment variable names for configuration overrides
pub mod env {
    pub const WINDOW_SIZE: &str = "DIALER_STATS_WINDOW_SIZE";
    pub const HISTORY_POINTS: &str = "DIALER_STATS_HISTORY_POINTS";
    pub const METRIC: &str = "DIALER_STATS_METRIC";
    pub const CHANNEL_CAPACITY: &str = "DIALER_STATS_CHANNEL_CAPACITY";
}
