//! Cumulative counter snapshots and payload decoding
//!
//! A snapshot is one reading of every dialer counter. Counters are
//! cumulative since the reporting process started, so the aggregator has to
//! difference consecutive snapshots to see what happened in an interval.
//!
//! Decoding is strict about values and lenient about presence: a kind that
//! is missing from the payload is recorded as *unreported* (it contributes a
//! zero delta), while a kind that is present with a null, negative,
//! fractional or non-numeric value is rejected.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{EventKind, SnapshotError};

/// One reading of the cumulative dialer event counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventCounterSnapshot {
    counts: [u64; EventKind::COUNT],
    reported: [bool; EventKind::COUNT],
}

impl EventCounterSnapshot {
    /// Snapshot with no kinds reported
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            counts: [0; EventKind::COUNT],
            reported: [false; EventKind::COUNT],
        }
    }

    /// Snapshot with every kind reported as zero (the process-start baseline)
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            counts: [0; EventKind::COUNT],
            reported: [true; EventKind::COUNT],
        }
    }

    /// Build from `(kind, cumulative count)` pairs; unlisted kinds are unreported
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (EventKind, u64)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::empty(), |snapshot, (kind, count)| snapshot.with(kind, count))
    }

    /// Return a copy with `kind` reported at `count`
    #[must_use]
    pub const fn with(mut self, kind: EventKind, count: u64) -> Self {
        self.counts[kind.index()] = count;
        self.reported[kind.index()] = true;
        self
    }

    /// Cumulative count for `kind` (0 when unreported)
    #[must_use]
    #[inline]
    pub const fn get(&self, kind: EventKind) -> u64 {
        self.counts[kind.index()]
    }

    /// Whether the source reported `kind` in this snapshot
    #[must_use]
    #[inline]
    pub const fn is_reported(&self, kind: EventKind) -> bool {
        self.reported[kind.index()]
    }

    /// Reported `(kind, count)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (EventKind, u64)> + '_ {
        EventKind::ALL
            .into_iter()
            .filter(|kind| self.is_reported(*kind))
            .map(|kind| (kind, self.get(kind)))
    }

    /// Overlay this snapshot on `baseline`: reported kinds take this
    /// snapshot's value, unreported kinds keep the baseline's.
    #[must_use]
    pub fn carried_over(&self, baseline: &Self) -> Self {
        let mut merged = *baseline;
        for (kind, count) in self.iter() {
            merged = merged.with(kind, count);
        }
        merged
    }

    /// Decode a flat `{ "pending": 10, "ready": 3, ... }` object
    ///
    /// Unrecognized keys are skipped so a newer metrics source with extra
    /// kinds does not break ingestion.
    pub fn from_payload(payload: &Value) -> Result<Self, SnapshotError> {
        let object = as_object(payload)?;
        decode_object(object)
    }

    /// Decode the counters nested under `metric` in a full metrics report
    ///
    /// ```
    /// use dialer_stats::{EventCounterSnapshot, EventKind};
    /// use serde_json::json;
    ///
    /// let report = json!({
    ///     "libp2p_webtransport_dialer_events_total": { "pending": 4, "open": 1 },
    ///     "libp2p_connection_manager_connections": { "inbound": 2 }
    /// });
    /// let snapshot = EventCounterSnapshot::from_report(
    ///     &report,
    ///     "libp2p_webtransport_dialer_events_total",
    /// ).unwrap();
    /// assert_eq!(snapshot.get(EventKind::Pending), 4);
    /// assert!(!snapshot.is_reported(EventKind::Close));
    /// ```
    pub fn from_report(report: &Value, metric: &str) -> Result<Self, SnapshotError> {
        let entry = as_object(report)?
            .get(metric)
            .ok_or_else(|| SnapshotError::MissingMetric {
                metric: metric.to_string(),
            })?;
        decode_object(as_object(entry)?)
    }
}

impl Serialize for EventCounterSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        for (kind, count) in self.iter() {
            map.serialize_entry(kind.as_str(), &count)?;
        }
        map.end()
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, SnapshotError> {
    value
        .as_object()
        .ok_or_else(|| SnapshotError::NotAnObject(value_type(value).to_string()))
}

fn decode_object(object: &Map<String, Value>) -> Result<EventCounterSnapshot, SnapshotError> {
    object
        .iter()
        .try_fold(EventCounterSnapshot::empty(), |snapshot, (key, value)| {
            let Ok(kind) = key.parse::<EventKind>() else {
                debug!(key = %key, "Ignoring unrecognized dialer event kind");
                return Ok(snapshot);
            };
            let count = counter_value(value).ok_or_else(|| SnapshotError::InvalidValue {
                kind,
                value: value.to_string(),
            })?;
            Ok(snapshot.with(kind, count))
        })
}

/// Non-negative integer counter value; integral floats are accepted since
/// JavaScript-based exporters serialize every number as a double.
fn counter_value(value: &Value) -> Option<u64> {
    let number = value.as_number()?;
    if let Some(count) = number.as_u64() {
        return Some(count);
    }
    let float = number.as_f64()?;
    let integral = float.is_finite() && float >= 0.0 && float.fract() == 0.0;
    (integral && float <= u64::MAX as f64).then_some(float as u64)
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
