//! Metrics sources and payload decoding
//!
//! A [`MetricsSource`] yields one JSON payload per sampling tick. The
//! [`PayloadDecoder`] turns a payload into an [`EventCounterSnapshot`]
//! according to the configured [`PayloadLayout`].

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{PayloadLayout, SourceConfig};
use crate::metrics::{EventCounterSnapshot, SnapshotError};
use crate::types::MetricName;

/// Producer of metrics payloads
#[async_trait]
pub trait MetricsSource: Send {
    /// Next payload, or `None` once the source is exhausted
    async fn next_payload(&mut self) -> Option<Value>;
}

/// Payloads pushed by another task
#[async_trait]
impl MetricsSource for mpsc::Receiver<Value> {
    async fn next_payload(&mut self) -> Option<Value> {
        self.recv().await
    }
}

/// One JSON document per line
///
/// Blank lines are skipped. A line that is not valid JSON is logged and
/// skipped so one corrupt sample does not end the stream.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_number: u64,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// Lines consumed so far, including skipped ones
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open input '{}': {}", path.display(), e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> MetricsSource for JsonLinesSource<R> {
    async fn next_payload(&mut self) -> Option<Value> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    warn!("Read error after line {}: {}", self.line_number, e);
                    return None;
                }
            };
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str(trimmed) {
                Ok(value) => return Some(value),
                Err(e) => warn!("Skipping line {}: invalid JSON: {}", self.line_number, e),
            }
        }
    }
}

/// Turns payloads into counter snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadDecoder {
    layout: PayloadLayout,
    metric: MetricName,
}

impl PayloadDecoder {
    #[must_use]
    pub fn new(layout: PayloadLayout, metric: MetricName) -> Self {
        Self { layout, metric }
    }

    #[must_use]
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.layout, config.metric.clone())
    }

    pub fn decode(&self, payload: &Value) -> Result<EventCounterSnapshot, SnapshotError> {
        let snapshot = match self.layout {
            PayloadLayout::Report => EventCounterSnapshot::from_report(payload, self.metric.as_str()),
            PayloadLayout::Flat => EventCounterSnapshot::from_payload(payload),
        }?;
        debug!(layout = %self.layout, "Decoded snapshot");
        Ok(snapshot)
    }
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self::from_config(&SourceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::EventKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_json_lines_skips_blank_and_invalid() {
        let input: &[u8] = b"{\"pending\": 1}\n\n   \nnot json\n{\"pending\": 2}\n";
        let mut source = JsonLinesSource::new(input);

        assert_eq!(source.next_payload().await, Some(json!({"pending": 1})));
        assert_eq!(source.next_payload().await, Some(json!({"pending": 2})));
        assert_eq!(source.next_payload().await, None);
        assert_eq!(source.line_number(), 5);
    }

    #[tokio::test]
    async fn test_json_lines_empty_input() {
        let mut source = JsonLinesSource::new(&b""[..]);
        assert_eq!(source.next_payload().await, None);
    }

    #[tokio::test]
    async fn test_channel_source() {
        let (tx, mut rx) = mpsc::channel(2);
        tx.send(json!({"open": 1})).await.unwrap();
        drop(tx);

        assert_eq!(rx.next_payload().await, Some(json!({"open": 1})));
        assert_eq!(rx.next_payload().await, None);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonLinesSource::open(dir.path().join("missing.jsonl"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to open input"));
    }

    #[test]
    fn test_decoder_report_layout() {
        let decoder = PayloadDecoder::default();
        let snapshot = decoder
            .decode(&json!({
                "libp2p_webtransport_dialer_events_total": { "pending": 3, "ready": 1 }
            }))
            .unwrap();
        assert_eq!(snapshot.get(EventKind::Pending), 3);
        assert_eq!(snapshot.get(EventKind::Ready), 1);

        let err = decoder.decode(&json!({"pending": 3})).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingMetric { .. }));
    }

    #[test]
    fn test_decoder_flat_layout() {
        let decoder = PayloadDecoder::new(PayloadLayout::Flat, MetricName::default());
        let snapshot = decoder.decode(&json!({"open": 2})).unwrap();
        assert_eq!(snapshot.get(EventKind::Open), 2);
        assert!(!snapshot.is_reported(EventKind::Pending));
    }
}
