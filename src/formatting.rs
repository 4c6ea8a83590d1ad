//! Text formatting for readouts and logs

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::metrics::AggregatedRecord;

/// Format a duration compactly: "1h 1m 5s", "2m 3s", "850ms"
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else if seconds > 0 {
        format!("{}s", seconds)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Milliseconds since the Unix epoch, the x coordinate of chart points
#[inline]
#[must_use]
pub fn epoch_millis(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// One-line summary of a record for logs and terminals
#[must_use]
pub fn format_readout(record: &AggregatedRecord) -> String {
    let totals = &record.totals;
    format!(
        "opened {} per {} (peak {}) | pending {} open {} | success {} ready_error {} noise_error {} upgrade_error {} ready_timeout {} noise_timeout {} | failure rate {}",
        record.window_sum,
        record.window_unit(),
        record.peak_window_sum,
        record.gauges.pending,
        record.gauges.open,
        totals.success,
        totals.ready_errored,
        totals.noise_errored,
        totals.upgrade_errored,
        totals.ready_timedout,
        totals.noise_timedout,
        record.failure_rate_display(),
    )
}
