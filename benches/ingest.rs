//! Benchmarks for the per-interval aggregation hot path
//!
//! Measures:
//! - ConnectionStatsAggregator::ingest with a full rolling window
//! - Snapshot decoding from flat and report payloads
//!
//! Run with: cargo bench --bench ingest

use dialer_stats::metrics::EventKind;
use dialer_stats::{ConnectionStatsAggregator, EventCounterSnapshot};
use divan::{Bencher, black_box};
use serde_json::json;

fn main() {
    divan::main();
}

fn snapshot(step: u64) -> EventCounterSnapshot {
    EventCounterSnapshot::from_pairs(
        EventKind::ALL
            .iter()
            .map(|kind| (*kind, step * (kind.index() as u64 + 1))),
    )
}

// =============================================================================
// Aggregation
// =============================================================================

mod aggregate {
    use super::*;

    #[divan::bench(sample_count = 1000, sample_size = 100)]
    fn ingest_full_window(bencher: Bencher) {
        let mut aggregator = ConnectionStatsAggregator::new();
        for step in 0..60 {
            aggregator.ingest(snapshot(step));
        }
        let mut step = 60;
        bencher.bench_local(|| {
            step += 1;
            black_box(aggregator.ingest(black_box(snapshot(step))))
        });
    }

    #[divan::bench(sample_count = 1000, sample_size = 100)]
    fn ingest_partial_snapshot(bencher: Bencher) {
        let mut aggregator = ConnectionStatsAggregator::new();
        let mut step = 0;
        bencher.bench_local(|| {
            step += 1;
            black_box(aggregator.ingest(EventCounterSnapshot::from_pairs([
                (EventKind::Pending, step * 2),
                (EventKind::Open, step),
            ])))
        });
    }
}

// =============================================================================
// Decoding
// =============================================================================

mod decode {
    use super::*;

    const METRIC: &str = "libp2p_webtransport_dialer_events_total";

    #[divan::bench]
    fn flat_payload(bencher: Bencher) {
        let payload = serde_json::to_value(snapshot(7)).unwrap();
        bencher.bench(|| EventCounterSnapshot::from_payload(black_box(&payload)));
    }

    #[divan::bench]
    fn report_payload(bencher: Bencher) {
        let report = json!({
            METRIC: serde_json::to_value(snapshot(7)).unwrap(),
            "libp2p_connection_manager_connections": { "inbound": 4, "outbound": 9 },
            "libp2p_protocol_streams_total": { "/ipfs/ping/1.0.0": 12 }
        });
        bencher.bench(|| EventCounterSnapshot::from_report(black_box(&report), METRIC));
    }
}
