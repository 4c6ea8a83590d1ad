//! Snapshot validation errors

use thiserror::Error;

use super::EventKind;

/// A metrics payload that cannot be read as a counter snapshot
///
/// Raised before the aggregator touches its state, so a rejected payload
/// never leaves a half-applied interval behind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    /// The payload (or the metric entry inside it) is not a JSON object
    #[error("snapshot payload must be an object, got {0}")]
    NotAnObject(String),

    /// The metric carrying the dialer counters is not in the report
    #[error("metric '{metric}' missing from report")]
    MissingMetric { metric: String },

    /// A recognized kind is present without a usable counter value
    #[error("counter '{kind}' has invalid value {value}: expected a non-negative integer")]
    InvalidValue { kind: EventKind, value: String },

    /// A kind name that is not part of the dialer lifecycle
    #[error("unknown event kind '{0}'")]
    UnknownKind(String),
}
