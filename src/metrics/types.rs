//! Event kinds and derived rate types
//!
//! Every counter the dialer reports is addressed by an [`EventKind`] rather
//! than a string so a typo in a kind name cannot silently read zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SnapshotError;
use crate::constants::rate;

// ============================================================================
// Event kinds
// ============================================================================

/// One kind of event in the outbound connection lifecycle
///
/// A dial starts as `Pending`, then either becomes `Open` or ends in one of
/// the five failure kinds. An open connection ends as `Close`,
/// `RemoteClose` or `Abort`. `Ready` counts sessions whose transport became
/// ready, which is what the success total tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Pending,
    Ready,
    ReadyError,
    NoiseError,
    UpgradeError,
    ReadyTimeout,
    NoiseTimeout,
    Open,
    Close,
    Abort,
    RemoteClose,
}

impl EventKind {
    /// Number of recognized kinds
    pub const COUNT: usize = 11;

    /// All kinds, in index order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Pending,
        Self::Ready,
        Self::ReadyError,
        Self::NoiseError,
        Self::UpgradeError,
        Self::ReadyTimeout,
        Self::NoiseTimeout,
        Self::Open,
        Self::Close,
        Self::Abort,
        Self::RemoteClose,
    ];

    /// Kinds reported as per-interval counts rather than folded into a gauge
    pub const INTERVAL: [Self; 8] = [
        Self::ReadyError,
        Self::NoiseError,
        Self::UpgradeError,
        Self::ReadyTimeout,
        Self::NoiseTimeout,
        Self::Close,
        Self::Abort,
        Self::RemoteClose,
    ];

    /// Ways a pending dial can end without opening
    pub const DIAL_FAILURES: [Self; 5] = [
        Self::ReadyTimeout,
        Self::NoiseTimeout,
        Self::ReadyError,
        Self::NoiseError,
        Self::UpgradeError,
    ];

    /// Ways an open connection can end
    pub const CLOSES: [Self; 3] = [Self::Close, Self::RemoteClose, Self::Abort];

    /// Position of this kind in [`EventKind::ALL`]
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire name as reported by the metrics source
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::ReadyError => "ready_error",
            Self::NoiseError => "noise_error",
            Self::UpgradeError => "upgrade_error",
            Self::ReadyTimeout => "ready_timeout",
            Self::NoiseTimeout => "noise_timeout",
            Self::Open => "open",
            Self::Close => "close",
            Self::Abort => "abort",
            Self::RemoteClose => "remote_close",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SnapshotError::UnknownKind(s.to_string()))
    }
}

// ============================================================================
// Failure rate
// ============================================================================

/// Share of finished dial attempts that failed, as a percentage
///
/// `None` means no attempt has finished yet; it is never rendered as NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureRatePercent(Option<f64>);

impl FailureRatePercent {
    /// No finished attempts to compute a rate from
    #[must_use]
    #[inline]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Rate from lifetime failure and success counts
    #[must_use]
    pub fn from_counts(failures: u64, successes: u64) -> Self {
        let finished = failures.saturating_add(successes);
        if finished == 0 {
            Self::none()
        } else {
            Self(Some(failures as f64 / finished as f64 * 100.0))
        }
    }

    #[must_use]
    #[inline]
    pub const fn value(self) -> Option<f64> {
        self.0
    }

    #[must_use]
    #[inline]
    pub const fn has_data(self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for FailureRatePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(pct) => write!(f, "{:.*}%", rate::DECIMALS, pct),
            None => f.write_str(rate::NO_DATA),
        }
    }
}
