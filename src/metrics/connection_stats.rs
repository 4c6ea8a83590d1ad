//! Connection statistics aggregation
//!
//! Turns a stream of cumulative dialer counters into per-interval deltas,
//! connection gauges, lifetime totals and a rolling count of sessions
//! opened, e.g. "42 sessions opened in the last minute (peak 57), 3.10%
//! failed".

use serde_json::Value;
use std::time::SystemTime;
use tracing::{debug, warn};

use super::record::{AggregatedRecord, Deltas, Gauges, IntervalCounts, Totals};
use super::window::RollingWindow;
use super::{EventCounterSnapshot, EventKind, SnapshotError};
use crate::types::WindowSize;

/// Everything the aggregator remembers between snapshots
///
/// Created zeroed, mutated in place by every ingested snapshot and never
/// reset while the process lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorState {
    pub last_snapshot: EventCounterSnapshot,
    pub gauges: Gauges,
    pub interval_counts: IntervalCounts,
    pub totals: Totals,
    pub rolling_window: RollingWindow,
    pub peak_window_sum: u64,
    pub samples: u64,
}

impl AggregatorState {
    #[must_use]
    pub fn new(window_size: WindowSize) -> Self {
        Self {
            last_snapshot: EventCounterSnapshot::zeroed(),
            gauges: Gauges::default(),
            interval_counts: IntervalCounts::default(),
            totals: Totals::default(),
            rolling_window: RollingWindow::new(window_size),
            peak_window_sum: 0,
            samples: 0,
        }
    }
}

impl Default for AggregatorState {
    fn default() -> Self {
        Self::new(WindowSize::DEFAULT)
    }
}

/// Connection statistics aggregator
///
/// Single owner, synchronous: `ingest` runs to completion with no I/O and
/// no locking. Callers with several producers must funnel snapshots through
/// one queue (see [`crate::pipeline`]).
#[derive(Debug, Clone, Default)]
pub struct ConnectionStatsAggregator {
    state: AggregatorState,
}

impl ConnectionStatsAggregator {
    /// Create an aggregator with a one-minute window
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_window_size(window_size: WindowSize) -> Self {
        Self {
            state: AggregatorState::new(window_size),
        }
    }

    /// Resume from an existing state
    #[must_use]
    pub fn from_state(state: AggregatorState) -> Self {
        Self { state }
    }

    /// Ingest a snapshot, stamping the record with the current time
    pub fn ingest(&mut self, snapshot: EventCounterSnapshot) -> AggregatedRecord {
        self.ingest_at(snapshot, SystemTime::now())
    }

    /// Decode a flat counter payload and ingest it
    ///
    /// A malformed payload is rejected before any state changes.
    pub fn ingest_payload(&mut self, payload: &Value) -> Result<AggregatedRecord, SnapshotError> {
        let snapshot = EventCounterSnapshot::from_payload(payload)?;
        Ok(self.ingest(snapshot))
    }

    /// Ingest a snapshot taken at `timestamp`
    ///
    /// Deterministic: the same prior state, snapshot and timestamp always
    /// produce the same record.
    pub fn ingest_at(
        &mut self,
        snapshot: EventCounterSnapshot,
        timestamp: SystemTime,
    ) -> AggregatedRecord {
        let state = &mut self.state;
        let deltas = Deltas::between(&state.last_snapshot, &snapshot);

        if deltas.is_discontinuity() {
            warn!(
                sample = state.samples + 1,
                kinds = ?deltas.regressed(),
                "Dialer counters went backwards, treating as a reset of the source"
            );
        }

        state.gauges.apply(&deltas);
        state.interval_counts = IntervalCounts::from_deltas(&deltas);
        state.totals.accumulate(&deltas);

        state.rolling_window.push(deltas.get(EventKind::Pending));
        let window_sum = state.rolling_window.sum();
        state.peak_window_sum = state.peak_window_sum.max(window_sum);

        state.last_snapshot = snapshot.carried_over(&state.last_snapshot);
        state.samples += 1;

        let window_capacity = state.rolling_window.capacity().get();
        let record = AggregatedRecord {
            sequence: state.samples,
            timestamp,
            discontinuity: deltas.is_discontinuity(),
            deltas,
            gauges: state.gauges,
            interval_counts: state.interval_counts,
            totals: state.totals,
            window_sum,
            window_len: state.rolling_window.len(),
            window_full: state.rolling_window.is_full(),
            window_capacity,
            window_rolled: state.samples > u64::try_from(window_capacity).unwrap_or(u64::MAX),
            peak_window_sum: state.peak_window_sum,
            failure_rate: state.totals.failure_rate(),
        };

        debug!(
            sample = record.sequence,
            pending = record.gauges.pending,
            open = record.gauges.open,
            window_sum = record.window_sum,
            "Aggregated dialer snapshot"
        );

        record
    }

    #[must_use]
    pub fn state(&self) -> &AggregatorState {
        &self.state
    }

    /// Give up the aggregator, keeping its state
    #[must_use]
    pub fn into_state(self) -> AggregatorState {
        self.state
    }

    #[must_use]
    pub fn gauges(&self) -> Gauges {
        self.state.gauges
    }

    #[must_use]
    pub fn totals(&self) -> Totals {
        self.state.totals
    }

    #[must_use]
    pub fn rolling_window(&self) -> &RollingWindow {
        &self.state.rolling_window
    }

    #[must_use]
    pub fn peak_window_sum(&self) -> u64 {
        self.state.peak_window_sum
    }

    #[must_use]
    pub fn last_snapshot(&self) -> &EventCounterSnapshot {
        &self.state.last_snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, UNIX_EPOCH};

    fn full(pairs: &[(EventKind, u64)]) -> EventCounterSnapshot {
        pairs
            .iter()
            .fold(EventCounterSnapshot::zeroed(), |s, (k, v)| s.with(*k, *v))
    }

    #[test]
    fn test_new_state_is_zeroed() {
        let aggregator = ConnectionStatsAggregator::new();

        assert_eq!(aggregator.gauges(), Gauges::default());
        assert_eq!(aggregator.totals(), Totals::default());
        assert!(aggregator.rolling_window().is_empty());
        assert_eq!(aggregator.peak_window_sum(), 0);
        assert_eq!(aggregator.last_snapshot(), &EventCounterSnapshot::zeroed());
    }

    #[test]
    fn test_first_snapshot() {
        let mut aggregator = ConnectionStatsAggregator::new();
        let record = aggregator.ingest(full(&[(EventKind::Pending, 10)]));

        assert_eq!(record.sequence, 1);
        assert!(record.interval_counts.is_zero());
        assert_eq!(record.gauges.pending, 10);
        assert_eq!(record.gauges.open, 0);
        assert_eq!(aggregator.rolling_window().to_vec(), vec![10]);
        assert_eq!(record.window_sum, 10);
        assert_eq!(record.peak_window_sum, 10);
        assert_eq!(record.failure_rate.value(), None);
    }

    #[test]
    fn test_second_snapshot() {
        let mut aggregator = ConnectionStatsAggregator::new();
        aggregator.ingest(full(&[(EventKind::Pending, 10)]));
        let record = aggregator.ingest(full(&[
            (EventKind::Pending, 15),
            (EventKind::Ready, 3),
            (EventKind::Open, 3),
        ]));

        assert_eq!(record.deltas.get(EventKind::Pending), 5);
        assert_eq!(record.deltas.get(EventKind::Ready), 3);
        assert_eq!(record.deltas.get(EventKind::Open), 3);
        assert_eq!(record.gauges.pending, 12);
        assert_eq!(record.gauges.open, 3);
        assert_eq!(record.totals.success, 3);
        assert_eq!(aggregator.rolling_window().to_vec(), vec![10, 5]);
        assert_eq!(record.window_sum, 15);
        assert_eq!(record.peak_window_sum, 15);
        assert_eq!(record.failure_rate.value(), Some(0.0));
    }

    #[test]
    fn test_interval_counts_overwritten() {
        let mut aggregator = ConnectionStatsAggregator::new();
        let first = aggregator.ingest(full(&[(EventKind::Close, 4)]));
        assert_eq!(first.interval_counts.close, 4);

        let second = aggregator.ingest(full(&[(EventKind::Close, 5)]));
        assert_eq!(second.interval_counts.close, 1);
    }

    #[test]
    fn test_regression_clamps_and_rebases() {
        let mut aggregator = ConnectionStatsAggregator::new();
        aggregator.ingest(full(&[(EventKind::Pending, 50), (EventKind::Ready, 20)]));

        // Source restarted
        let record = aggregator.ingest(full(&[(EventKind::Pending, 2), (EventKind::Ready, 1)]));
        assert!(record.discontinuity);
        assert_eq!(record.deltas.get(EventKind::Pending), 0);
        assert_eq!(record.totals.success, 20);
        assert_eq!(record.gauges.pending, 50);

        // Next interval differences against the post-restart baseline
        let record = aggregator.ingest(full(&[(EventKind::Pending, 5), (EventKind::Ready, 1)]));
        assert!(!record.discontinuity);
        assert_eq!(record.deltas.get(EventKind::Pending), 3);
        assert_eq!(record.totals.success, 20);
    }

    #[test]
    fn test_missing_key_is_not_a_regression() {
        let mut aggregator = ConnectionStatsAggregator::new();
        aggregator.ingest(full(&[(EventKind::Pending, 10), (EventKind::Abort, 3)]));

        let record = aggregator.ingest(EventCounterSnapshot::from_pairs([(EventKind::Pending, 12)]));
        assert!(!record.discontinuity);
        assert_eq!(record.interval_counts.abort, 0);
        assert_eq!(aggregator.last_snapshot().get(EventKind::Abort), 3);

        let record = aggregator.ingest(full(&[(EventKind::Pending, 12), (EventKind::Abort, 4)]));
        assert_eq!(record.interval_counts.abort, 1);
    }

    #[test]
    fn test_ingest_payload_rejects_without_mutation() {
        let mut aggregator = ConnectionStatsAggregator::new();
        aggregator.ingest(full(&[(EventKind::Pending, 10)]));
        let before = aggregator.state().clone();

        let err = aggregator
            .ingest_payload(&json!({ "pending": 20, "open": "three" }))
            .unwrap_err();

        assert!(matches!(err, SnapshotError::InvalidValue { kind: EventKind::Open, .. }));
        assert_eq!(aggregator.state(), &before);
    }

    #[test]
    fn test_ingest_payload() {
        let mut aggregator = ConnectionStatsAggregator::new();
        let record = aggregator
            .ingest_payload(&json!({ "pending": 4, "open": 1 }))
            .unwrap();
        assert_eq!(record.gauges.pending, 3);
        assert_eq!(record.gauges.open, 1);
    }

    #[test]
    fn test_ingest_at_is_deterministic() {
        let at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let snapshot = full(&[(EventKind::Pending, 7), (EventKind::ReadyError, 1)]);

        let mut a = ConnectionStatsAggregator::new();
        let mut b = ConnectionStatsAggregator::new();
        assert_eq!(a.ingest_at(snapshot, at), b.ingest_at(snapshot, at));
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_window_bounded_and_peak_kept() {
        let size = WindowSize::new(3).unwrap();
        let mut aggregator = ConnectionStatsAggregator::with_window_size(size);

        let mut pending = 0;
        for step in [5, 5, 5, 0, 0, 0] {
            pending += step;
            aggregator.ingest(full(&[(EventKind::Pending, pending)]));
        }

        assert_eq!(aggregator.rolling_window().to_vec(), vec![0, 0, 0]);
        assert_eq!(aggregator.peak_window_sum(), 15);
    }

    #[test]
    fn test_window_unit_label() {
        let size = WindowSize::new(2).unwrap();
        let mut aggregator = ConnectionStatsAggregator::with_window_size(size);

        let record = aggregator.ingest(full(&[]));
        assert_eq!(record.window_unit(), "1 seconds");

        let record = aggregator.ingest(full(&[]));
        assert!(record.window_full);
        assert_eq!(record.window_unit(), "2 seconds");

        let record = aggregator.ingest(full(&[]));
        assert!(record.window_rolled);
        assert_eq!(record.window_unit(), "2 seconds");
    }

    #[test]
    fn test_window_unit_switches_after_first_eviction() {
        let mut aggregator = ConnectionStatsAggregator::new();

        for _ in 0..59 {
            aggregator.ingest(full(&[]));
        }
        let record = aggregator.ingest(full(&[]));
        assert_eq!(record.window_len, 60);
        assert!(record.window_full);
        assert!(!record.window_rolled);
        assert_eq!(record.window_unit(), "60 seconds");

        let record = aggregator.ingest(full(&[]));
        assert_eq!(record.window_len, 60);
        assert_eq!(record.window_unit(), "minute");
    }

    #[test]
    fn test_window_unit_non_default_size() {
        let size = WindowSize::new(5).unwrap();
        let mut aggregator = ConnectionStatsAggregator::with_window_size(size);

        let units: Vec<String> = (0..10)
            .map(|_| aggregator.ingest(full(&[])).window_unit())
            .collect();
        assert_eq!(units[0], "1 seconds");
        assert_eq!(units[4], "5 seconds");
        assert!(units[5..].iter().all(|unit| unit == "5 seconds"));
    }
}
