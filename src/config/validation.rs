//! Configuration validation
//!
//! Zero sizes are already unrepresentable; this checks the remaining
//! semantic constraints before the pipeline starts.

use anyhow::Result;

use super::types::Config;

/// Largest rolling window accepted (one hour of samples at 1 Hz)
const MAX_WINDOW_SIZE: usize = 3600;

/// Largest chart history accepted per series
const MAX_HISTORY_POINTS: usize = 24 * 3600;

impl Config {
    /// Validate configuration for correctness
    ///
    /// - Window and history sizes stay within memory-safe bounds
    /// - Warns when the chart history is shorter than the rolling window
    pub fn validate(&self) -> Result<()> {
        let window = self.aggregator.window_size.get();
        let history = self.aggregator.history_points.get();

        if window > MAX_WINDOW_SIZE {
            return Err(anyhow::anyhow!(
                "window_size {} exceeds the maximum of {} samples",
                window,
                MAX_WINDOW_SIZE
            ));
        }

        if history > MAX_HISTORY_POINTS {
            return Err(anyhow::anyhow!(
                "history_points {} exceeds the maximum of {} points",
                history,
                MAX_HISTORY_POINTS
            ));
        }

        if history < window {
            tracing::warn!(
                "history_points ({}) is shorter than window_size ({}); \
                 charts will not cover the whole rolling window",
                history,
                window
            );
        }

        Ok(())
    }
}
