//! Validated string types that enforce invariants at construction time

use nutype::nutype;
use thiserror::Error;

/// Validation errors for string types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("metric name cannot be empty or whitespace")]
    EmptyMetricName,

    #[error("invalid metric name: {0}")]
    InvalidMetricName(String),
}

/// Name of the metric that carries the dialer event counters
///
/// Prometheus-style: ASCII letters, digits, `_` and `:`, not starting with
/// a digit. Surrounding whitespace is trimmed.
///
/// # Examples
/// ```
/// use dialer_stats::types::MetricName;
///
/// let name = MetricName::try_new("  libp2p_webtransport_dialer_events_total ").unwrap();
/// assert_eq!(name.as_ref(), "libp2p_webtransport_dialer_events_total");
///
/// assert!(MetricName::try_new("   ").is_err());
/// assert!(MetricName::try_new("9lives").is_err());
/// ```
#[nutype(
    sanitize(trim),
    validate(not_empty, predicate = is_metric_name),
    default = "libp2p_webtransport_dialer_events_total",
    derive(
        Debug, Clone, PartialEq, Eq, Hash, AsRef, Deref, Display, TryFrom, Default, Serialize,
        Deserialize,
    )
)]
pub struct MetricName(String);

fn is_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':');
    valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

impl MetricName {
    /// Validate a metric name, mapping failures onto [`ValidationError`]
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        Self::try_new(raw.clone()).map_err(|e| match e {
            MetricNameError::NotEmptyViolated => ValidationError::EmptyMetricName,
            MetricNameError::PredicateViolated => ValidationError::InvalidMetricName(raw),
        })
    }

    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}
