//! Sampling pipeline
//!
//! ```text
//! MetricsSource ──► reader task ──► mpsc (bounded) ──► aggregator ──► RecordSink
//! ```
//!
//! The reader task owns the source and only forwards payloads. Decoding,
//! aggregation and the sink all run on the caller's task, so the aggregator
//! has a single writer and needs no locking. A full channel applies
//! backpressure to the reader.

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::metrics::{
    AggregatedRecord, AggregatorState, ConnectionStatsAggregator, Gauges, SnapshotError, Totals,
};
use crate::sink::{RecordSink, Series, SeriesSink};
use crate::source::{MetricsSource, PayloadDecoder};
use crate::types::ChannelCapacity;

/// Why the pipeline stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The source ran out of payloads
    Exhausted,
    /// The shutdown signal fired
    Shutdown,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub stop_reason: StopReason,
    /// Payloads that produced a record
    pub ingested: u64,
    /// Payloads rejected by the decoder
    pub rejected: u64,
    /// Records flagged as a counter discontinuity
    pub discontinuities: u64,
    pub gauges: Gauges,
    pub totals: Totals,
    pub peak_window_sum: u64,
    pub last_record: Option<AggregatedRecord>,
}

/// Run outcome together with the chart history, printed by `--summary`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    #[serde(flatten)]
    pub summary: &'a PipelineSummary,
    pub history_points: usize,
    pub series: &'a [Series],
}

impl<'a> RunReport<'a> {
    #[must_use]
    pub fn new(summary: &'a PipelineSummary, chart: &'a SeriesSink) -> Self {
        Self {
            summary,
            history_points: chart.capacity(),
            series: chart.series(),
        }
    }
}

/// Source-to-sink driver around one [`ConnectionStatsAggregator`]
#[derive(Debug, Clone)]
pub struct Pipeline {
    aggregator: ConnectionStatsAggregator,
    decoder: PayloadDecoder,
    channel_capacity: ChannelCapacity,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            aggregator: ConnectionStatsAggregator::with_window_size(
                config.aggregator.window_size,
            ),
            decoder: PayloadDecoder::from_config(&config.source),
            channel_capacity: config.source.channel_capacity,
        }
    }

    /// Resume from a previously captured aggregator state
    #[must_use]
    pub fn with_state(mut self, state: AggregatorState) -> Self {
        self.aggregator = ConnectionStatsAggregator::from_state(state);
        self
    }

    #[must_use]
    pub fn aggregator(&self) -> &ConnectionStatsAggregator {
        &self.aggregator
    }

    /// Decode and ingest one payload, handing the record to `sink`
    ///
    /// A payload the decoder rejects leaves the aggregator untouched.
    pub fn process<S: RecordSink + ?Sized>(
        &mut self,
        payload: &serde_json::Value,
        sink: &mut S,
    ) -> Result<AggregatedRecord, SnapshotError> {
        let snapshot = self.decoder.decode(payload)?;
        let record = self.aggregator.ingest(snapshot);
        sink.accept(&record);
        Ok(record)
    }

    /// Drive `source` until it is exhausted or `shutdown` becomes `true`
    pub async fn run<M, S>(
        &mut self,
        mut source: M,
        sink: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> PipelineSummary
    where
        M: MetricsSource + 'static,
        S: RecordSink + ?Sized,
    {
        let (tx, mut rx) = mpsc::channel(self.channel_capacity.get());

        let reader = tokio::spawn(async move {
            while let Some(payload) = source.next_payload().await {
                if tx.send(payload).await.is_err() {
                    debug!("Aggregator gone, reader stopping");
                    break;
                }
            }
        });

        let mut summary = PipelineSummary {
            stop_reason: StopReason::Exhausted,
            ingested: 0,
            rejected: 0,
            discontinuities: 0,
            gauges: Gauges::default(),
            totals: Totals::default(),
            peak_window_sum: 0,
            last_record: None,
        };

        let mut watching = true;
        if *shutdown.borrow() {
            summary.stop_reason = StopReason::Shutdown;
        } else {
            loop {
                tokio::select! {
                    biased;
                    changed = shutdown.changed(), if watching => match changed {
                        // Sender dropped: nothing can signal shutdown any more
                        Err(_) => watching = false,
                        Ok(()) if *shutdown.borrow() => {
                            info!("Shutdown requested, stopping pipeline");
                            summary.stop_reason = StopReason::Shutdown;
                            break;
                        }
                        Ok(()) => {}
                    },
                    payload = rx.recv() => {
                        let Some(payload) = payload else {
                            debug!("Metrics source exhausted");
                            break;
                        };
                        let outcome = self.process(&payload, sink);
                        summary.observe(outcome);
                    }
                }
            }
        }

        reader.abort();

        summary.gauges = self.aggregator.gauges();
        summary.totals = self.aggregator.totals();
        summary.peak_window_sum = self.aggregator.peak_window_sum();
        summary
    }
}

impl PipelineSummary {
    fn observe(&mut self, outcome: Result<AggregatedRecord, SnapshotError>) {
        match outcome {
            Ok(record) => {
                self.ingested += 1;
                if record.discontinuity {
                    self.discontinuities += 1;
                }
                self.last_record = Some(record);
            }
            Err(e) => {
                self.rejected += 1;
                warn!("Rejected metrics payload: {}", e);
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
