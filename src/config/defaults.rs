//! Default values for configuration fields
//!
//! Centralizes the default functions used in serde deserialization.

use crate::types::{ChannelCapacity, HistoryPoints, WindowSize};

/// Default rolling window: one minute of samples
#[inline]
pub fn window_size() -> WindowSize {
    WindowSize::DEFAULT
}

/// Default chart history: three minutes of points
#[inline]
pub fn history_points() -> HistoryPoints {
    HistoryPoints::DEFAULT
}

/// Default queue depth between source and aggregator
#[inline]
pub fn channel_capacity() -> ChannelCapacity {
    ChannelCapacity::DEFAULT
}
