//! Aggregated record types handed to presentation sinks
//!
//! Everything here is a plain value: sinks may clone, serialize or drop a
//! record without affecting the aggregator.

use serde::Serialize;
use std::time::SystemTime;

use super::{EventCounterSnapshot, EventKind, FailureRatePercent};
use crate::constants::window;

// ============================================================================
// Deltas
// ============================================================================

/// Per-kind change between two snapshots
///
/// Deltas are never negative: a counter that went backwards is clamped to
/// zero and listed in [`Deltas::regressed`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Deltas {
    #[serde(serialize_with = "serialize_per_kind")]
    values: [u64; EventKind::COUNT],
    regressed: Vec<EventKind>,
}

impl Deltas {
    /// Difference `current - previous` for every kind
    ///
    /// Kinds unreported in `current` contribute zero.
    #[must_use]
    pub fn between(previous: &EventCounterSnapshot, current: &EventCounterSnapshot) -> Self {
        EventKind::ALL
            .into_iter()
            .filter(|kind| current.is_reported(*kind))
            .fold(Self::default(), |mut deltas, kind| {
                let (now, before) = (current.get(kind), previous.get(kind));
                if now < before {
                    deltas.regressed.push(kind);
                } else {
                    deltas.values[kind.index()] = now - before;
                }
                deltas
            })
    }

    #[must_use]
    #[inline]
    pub const fn get(&self, kind: EventKind) -> u64 {
        self.values[kind.index()]
    }

    /// Sum of deltas over a group of kinds
    #[must_use]
    pub fn sum_of(&self, kinds: &[EventKind]) -> u64 {
        kinds
            .iter()
            .fold(0u64, |acc, kind| acc.saturating_add(self.get(*kind)))
    }

    /// Kinds whose cumulative counter went backwards this interval
    #[must_use]
    pub fn regressed(&self) -> &[EventKind] {
        &self.regressed
    }

    #[must_use]
    #[inline]
    pub fn is_discontinuity(&self) -> bool {
        !self.regressed.is_empty()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }
}

fn serialize_per_kind<S>(values: &[u64; EventKind::COUNT], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(EventKind::COUNT))?;
    for kind in EventKind::ALL {
        map.serialize_entry(kind.as_str(), &values[kind.index()])?;
    }
    map.end()
}

// ============================================================================
// Gauges
// ============================================================================

/// Estimated connections in flight and open
///
/// Reconstructed from entry/exit deltas, so they are estimates: signed, and
/// able to drift if the source drops events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Gauges {
    pub pending: i64,
    pub open: i64,
}

impl Gauges {
    /// Fold one interval of deltas into the gauges
    ///
    /// A pending dial leaves by opening or by one of the five failure kinds;
    /// an open connection leaves by closing, being closed remotely or
    /// aborting.
    pub fn apply(&mut self, deltas: &Deltas) {
        self.pending = self
            .pending
            .saturating_add_unsigned(deltas.get(EventKind::Pending))
            .saturating_sub_unsigned(deltas.sum_of(&EventKind::DIAL_FAILURES))
            .saturating_sub_unsigned(deltas.get(EventKind::Open));

        self.open = self
            .open
            .saturating_add_unsigned(deltas.get(EventKind::Open))
            .saturating_sub_unsigned(deltas.sum_of(&EventKind::CLOSES));
    }
}

// ============================================================================
// Interval counts
// ============================================================================

/// Events observed in the most recent interval only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IntervalCounts {
    pub ready_error: u64,
    pub noise_error: u64,
    pub upgrade_error: u64,
    pub ready_timeout: u64,
    pub noise_timeout: u64,
    pub close: u64,
    pub abort: u64,
    pub remote_close: u64,
}

impl IntervalCounts {
    #[must_use]
    pub fn from_deltas(deltas: &Deltas) -> Self {
        Self {
            ready_error: deltas.get(EventKind::ReadyError),
            noise_error: deltas.get(EventKind::NoiseError),
            upgrade_error: deltas.get(EventKind::UpgradeError),
            ready_timeout: deltas.get(EventKind::ReadyTimeout),
            noise_timeout: deltas.get(EventKind::NoiseTimeout),
            close: deltas.get(EventKind::Close),
            abort: deltas.get(EventKind::Abort),
            remote_close: deltas.get(EventKind::RemoteClose),
        }
    }

    /// Count for an interval kind; `None` for gauge kinds and `Ready`
    #[must_use]
    pub const fn get(&self, kind: EventKind) -> Option<u64> {
        match kind {
            EventKind::ReadyError => Some(self.ready_error),
            EventKind::NoiseError => Some(self.noise_error),
            EventKind::UpgradeError => Some(self.upgrade_error),
            EventKind::ReadyTimeout => Some(self.ready_timeout),
            EventKind::NoiseTimeout => Some(self.noise_timeout),
            EventKind::Close => Some(self.close),
            EventKind::Abort => Some(self.abort),
            EventKind::RemoteClose => Some(self.remote_close),
            EventKind::Pending | EventKind::Ready | EventKind::Open => None,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        EventKind::INTERVAL
            .into_iter()
            .all(|kind| self.get(kind) == Some(0))
    }
}

// ============================================================================
// Totals
// ============================================================================

/// Lifetime counts accumulated from deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub success: u64,
    pub ready_errored: u64,
    pub noise_errored: u64,
    pub upgrade_errored: u64,
    pub ready_timedout: u64,
    pub noise_timedout: u64,
}

impl Totals {
    pub fn accumulate(&mut self, deltas: &Deltas) {
        self.success = self.success.saturating_add(deltas.get(EventKind::Ready));
        self.ready_errored = self
            .ready_errored
            .saturating_add(deltas.get(EventKind::ReadyError));
        self.noise_errored = self
            .noise_errored
            .saturating_add(deltas.get(EventKind::NoiseError));
        self.upgrade_errored = self
            .upgrade_errored
            .saturating_add(deltas.get(EventKind::UpgradeError));
        self.ready_timedout = self
            .ready_timedout
            .saturating_add(deltas.get(EventKind::ReadyTimeout));
        self.noise_timedout = self
            .noise_timedout
            .saturating_add(deltas.get(EventKind::NoiseTimeout));
    }

    #[must_use]
    pub const fn errors(&self) -> u64 {
        self.ready_errored
            .saturating_add(self.noise_errored)
            .saturating_add(self.upgrade_errored)
    }

    #[must_use]
    pub const fn timeouts(&self) -> u64 {
        self.ready_timedout.saturating_add(self.noise_timedout)
    }

    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.errors().saturating_add(self.timeouts())
    }

    #[must_use]
    pub fn failure_rate(&self) -> FailureRatePercent {
        FailureRatePercent::from_counts(self.failures(), self.success)
    }
}

// ============================================================================
// Aggregated record
// ============================================================================

/// One aggregated sample, ready for plotting and textual readouts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecord {
    /// 1-based sample number since the aggregator was created
    pub sequence: u64,
    pub timestamp: SystemTime,
    pub deltas: Deltas,
    pub gauges: Gauges,
    pub interval_counts: IntervalCounts,
    pub totals: Totals,
    /// Sessions opened across the rolling window
    pub window_sum: u64,
    /// Samples currently held by the rolling window
    pub window_len: usize,
    /// Whether the rolling window is at capacity
    pub window_full: bool,
    pub window_capacity: usize,
    /// More samples have been taken than the window holds, so it has
    /// started evicting
    pub window_rolled: bool,
    pub peak_window_sum: u64,
    pub failure_rate: FailureRatePercent,
    /// A counter went backwards this interval
    pub discontinuity: bool,
}

impl AggregatedRecord {
    /// Unit the window sum is measured over
    ///
    /// The number of seconds sampled so far until the window first evicts.
    /// After that a one-minute window reads `"minute"` and any other size
    /// reads its capacity in seconds.
    #[must_use]
    pub fn window_unit(&self) -> String {
        if self.window_rolled && self.window_capacity == window::SAMPLES {
            window::FULL_UNIT.to_string()
        } else if self.window_rolled {
            format!("{} seconds", self.window_capacity)
        } else {
            format!("{} seconds", self.window_len)
        }
    }

    #[must_use]
    pub fn failure_rate_display(&self) -> String {
        self.failure_rate.to_string()
    }

    /// Chart series values in legend order
    #[must_use]
    pub fn series(&self) -> [(&'static str, i64); 10] {
        let interval = |kind: EventKind| {
            let count = self.interval_counts.get(kind).unwrap_or(0);
            (kind.as_str(), i64::try_from(count).unwrap_or(i64::MAX))
        };
        [
            (EventKind::Pending.as_str(), self.gauges.pending),
            (EventKind::Open.as_str(), self.gauges.open),
            interval(EventKind::ReadyError),
            interval(EventKind::NoiseError),
            interval(EventKind::UpgradeError),
            interval(EventKind::ReadyTimeout),
            interval(EventKind::NoiseTimeout),
            interval(EventKind::Close),
            interval(EventKind::Abort),
            interval(EventKind::RemoteClose),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(EventKind, u64)]) -> EventCounterSnapshot {
        pairs
            .iter()
            .fold(EventCounterSnapshot::zeroed(), |s, (k, v)| s.with(*k, *v))
    }

    #[test]
    fn test_deltas_between() {
        let before = snapshot(&[(EventKind::Pending, 10), (EventKind::Open, 1)]);
        let after = snapshot(&[(EventKind::Pending, 15), (EventKind::Open, 4)]);

        let deltas = Deltas::between(&before, &after);
        assert_eq!(deltas.get(EventKind::Pending), 5);
        assert_eq!(deltas.get(EventKind::Open), 3);
        assert_eq!(deltas.get(EventKind::Close), 0);
        assert!(!deltas.is_discontinuity());
    }

    #[test]
    fn test_deltas_clamp_regression() {
        let before = snapshot(&[(EventKind::Close, 8)]);
        let after = snapshot(&[(EventKind::Close, 2)]);

        let deltas = Deltas::between(&before, &after);
        assert_eq!(deltas.get(EventKind::Close), 0);
        assert_eq!(deltas.regressed(), &[EventKind::Close]);
        assert!(deltas.is_discontinuity());
    }

    #[test]
    fn test_deltas_unreported_kind_is_zero() {
        let before = snapshot(&[(EventKind::Abort, 5)]);
        let after = EventCounterSnapshot::from_pairs([(EventKind::Pending, 1)]);

        let deltas = Deltas::between(&before, &after);
        assert_eq!(deltas.get(EventKind::Abort), 0);
        assert!(!deltas.is_discontinuity());
    }

    #[test]
    fn test_gauges_apply() {
        let before = EventCounterSnapshot::zeroed();
        let after = snapshot(&[
            (EventKind::Pending, 10),
            (EventKind::Open, 4),
            (EventKind::ReadyTimeout, 1),
            (EventKind::UpgradeError, 2),
            (EventKind::RemoteClose, 1),
        ]);

        let mut gauges = Gauges::default();
        gauges.apply(&Deltas::between(&before, &after));

        assert_eq!(gauges.pending, 10 - 4 - 1 - 2);
        assert_eq!(gauges.open, 4 - 1);
    }

    #[test]
    fn test_totals_failure_rate() {
        let totals = Totals {
            success: 3,
            ready_errored: 1,
            ..Default::default()
        };

        assert_eq!(totals.errors(), 1);
        assert_eq!(totals.timeouts(), 0);
        assert_eq!(totals.failure_rate().to_string(), "25.00%");
    }

    #[test]
    fn test_totals_failure_rate_no_data() {
        assert_eq!(Totals::default().failure_rate(), FailureRatePercent::none());
    }

    #[test]
    fn test_interval_counts_get() {
        let counts = IntervalCounts {
            abort: 2,
            ..Default::default()
        };
        assert_eq!(counts.get(EventKind::Abort), Some(2));
        assert_eq!(counts.get(EventKind::Pending), None);
        assert!(!counts.is_zero());
        assert!(IntervalCounts::default().is_zero());
    }
}
