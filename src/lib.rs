//! # dialer-stats
//!
//! Rolling statistics for an outbound connection dialer.
//!
//! A metrics source periodically reports *cumulative* event counters for the
//! dialer pipeline (`pending`, `ready`, `open`, the error and timeout kinds,
//! and the ways a connection closes). The [`ConnectionStatsAggregator`] turns
//! each report into per-interval deltas, gauges for in-flight and open
//! connections, lifetime totals, a rolling "sessions opened per minute"
//! window and a failure rate.
//!
//! ```
//! use dialer_stats::{ConnectionStatsAggregator, EventCounterSnapshot, EventKind};
//!
//! let mut aggregator = ConnectionStatsAggregator::new();
//! let record = aggregator.ingest(EventCounterSnapshot::from_pairs([(EventKind::Pending, 10)]));
//! assert_eq!(record.gauges.pending, 10);
//! assert_eq!(record.window_sum, 10);
//! ```

pub mod args;
pub mod config;
pub mod constants;
pub mod formatting;
pub mod logging;
pub mod metrics;
pub mod peers;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod types;

pub use args::Args;
pub use config::{
    Config, ConfigSource, create_default_config, load_config, load_config_with_fallback,
};
pub use metrics::{
    AggregatedRecord, AggregatorState, ConnectionStatsAggregator, EventCounterSnapshot, EventKind,
    FailureRatePercent, Gauges, IntervalCounts, SnapshotError, Totals,
};
pub use peers::{
    ConnectionInspector, ConnectionTable, LiveConnection, PeerInfo, PeerTag, PeerTagger,
    PeerTypeCounts, PingSample, TransportFamily, classify_address, format_peer, relay_peer_id,
};
pub use pipeline::{Pipeline, PipelineSummary, RunReport, StopReason};
pub use sink::{ChartPoint, LogSink, RecordSink, Series, SeriesSink};
pub use source::{JsonLinesSource, MetricsSource, PayloadDecoder};
