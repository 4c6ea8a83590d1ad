//! Buffer and queue bounds

use crate::constants::window;

nonzero_size! {
    /// Number of samples held by the rolling "sessions opened" window
    ///
    /// At one report per second the default of 60 samples covers a minute.
    ///
    /// # Examples
    /// ```
    /// use dialer_stats::types::WindowSize;
    ///
    /// let size = WindowSize::new(60).unwrap();
    /// assert_eq!(size.get(), 60);
    ///
    /// assert!(WindowSize::new(0).is_none());
    /// ```
    #[doc(alias = "rolling_window")]
    pub struct WindowSize = window::SAMPLES;
}

nonzero_size! {
    /// Maximum number of points kept per chart series
    pub struct HistoryPoints = window::HISTORY_POINTS;
}

nonzero_size! {
    /// Depth of the queue between the metrics source and the aggregator
    pub struct ChannelCapacity = 64;
}
