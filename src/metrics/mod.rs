//! Dialer event statistics
//!
//! The metrics source reports cumulative counters; this module differences
//! them into interval activity and keeps the derived state (gauges, totals,
//! rolling window) that sinks display.

mod connection_stats;
mod error;
mod record;
mod snapshot;
mod types;
mod window;

pub use connection_stats::{AggregatorState, ConnectionStatsAggregator};
pub use error::SnapshotError;
pub use record::{AggregatedRecord, Deltas, Gauges, IntervalCounts, Totals};
pub use snapshot::EventCounterSnapshot;
pub use types::{EventKind, FailureRatePercent};
pub use window::RollingWindow;
