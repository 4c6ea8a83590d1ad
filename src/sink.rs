//! Presentation sinks for aggregated records
//!
//! A sink is called once per record on the aggregation task, so it must not
//! block. Sinks that need I/O should hand the record off (logging is already
//! non-blocking through `tracing`).

use serde::Serialize;
use std::collections::VecDeque;
use tracing::info;

use crate::formatting::{epoch_millis, format_readout};
use crate::metrics::AggregatedRecord;
use crate::types::HistoryPoints;

/// Consumer of aggregated records
pub trait RecordSink: Send {
    fn accept(&mut self, record: &AggregatedRecord);
}

impl RecordSink for Vec<AggregatedRecord> {
    fn accept(&mut self, record: &AggregatedRecord) {
        self.push(record.clone());
    }
}

impl<A: RecordSink, B: RecordSink> RecordSink for (A, B) {
    fn accept(&mut self, record: &AggregatedRecord) {
        self.0.accept(record);
        self.1.accept(record);
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn accept(&mut self, record: &AggregatedRecord) {
        (**self).accept(record);
    }
}

// ============================================================================
// Log sink
// ============================================================================

/// Emits one readout line per record at `info` level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn accept(&mut self, record: &AggregatedRecord) {
        info!(
            sample = record.sequence,
            window_sum = record.window_sum,
            peak_window_sum = record.peak_window_sum,
            pending = record.gauges.pending,
            open = record.gauges.open,
            "{}",
            format_readout(record)
        );
    }
}

// ============================================================================
// Chart series sink
// ============================================================================

/// One plotted point: epoch milliseconds against the series value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub x: u64,
    pub y: i64,
}

/// Bounded history for one chart series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: &'static str,
    points: VecDeque<ChartPoint>,
}

impl Series {
    fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &ChartPoint> + '_ {
        self.points.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn latest(&self) -> Option<ChartPoint> {
        self.points.back().copied()
    }
}

/// Keeps the last `history_points` values of every chart series
///
/// The series are the two gauges followed by the eight per-interval counts,
/// in legend order. Each series evicts its oldest point once full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesSink {
    capacity: usize,
    series: Vec<Series>,
}

impl SeriesSink {
    #[must_use]
    pub fn new(history_points: HistoryPoints) -> Self {
        Self {
            capacity: history_points.get(),
            series: Vec::new(),
        }
    }

    /// Points kept per series
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Series in legend order (empty until the first record arrives)
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Look up a series by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Largest value across all series, for sizing the y axis
    #[must_use]
    pub fn max_y(&self) -> i64 {
        self.series
            .iter()
            .flat_map(|s| s.points())
            .map(|p| p.y)
            .max()
            .unwrap_or(0)
    }
}

impl Default for SeriesSink {
    fn default() -> Self {
        Self::new(HistoryPoints::DEFAULT)
    }
}

impl RecordSink for SeriesSink {
    fn accept(&mut self, record: &AggregatedRecord) {
        let x = epoch_millis(record.timestamp);
        let values = record.series();

        if self.series.is_empty() {
            let capacity = self.capacity;
            self.series = values
                .iter()
                .map(|(name, _)| Series::new(*name, capacity))
                .collect();
        }

        for (series, (_, y)) in self.series.iter_mut().zip(values) {
            series.points.push_back(ChartPoint { x, y });
            while series.points.len() > self.capacity {
                series.points.pop_front();
            }
        }
    }
}
