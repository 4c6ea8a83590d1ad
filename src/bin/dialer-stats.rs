use anyhow::Result;
use clap::Parser;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use dialer_stats::formatting::format_duration;
use dialer_stats::logging::{LogTarget, init_logging};
use dialer_stats::{
    Args, JsonLinesSource, LogSink, Pipeline, RunReport, SeriesSink, load_config_with_fallback,
};

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(if args.log_file {
        LogTarget::StderrAndFile
    } else {
        LogTarget::Stderr
    });

    // One reader task and one aggregating task; two workers are plenty
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let result = rt.block_on(run(args));
    // A pending stdin read sits on a blocking thread and never finishes on its own
    rt.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(args: Args) -> Result<()> {
    let (config, origin) = match load_config_with_fallback(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    info!("Loaded configuration from {}", origin.description());

    let config = args.apply_to(config);
    config.validate()?;
    info!(
        "Window {} samples, {} chart points, {} layout, metric {}",
        config.aggregator.window_size,
        config.aggregator.history_points,
        config.source.layout,
        config.source.metric
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    let mut pipeline = Pipeline::new(&config);
    let mut sink = (LogSink, SeriesSink::new(config.aggregator.history_points));

    let started = Instant::now();
    let summary = match &args.input {
        Some(path) => {
            info!("Reading snapshots from {}", path.display());
            let source = JsonLinesSource::open(path).await?;
            pipeline.run(source, &mut sink, shutdown_rx).await
        }
        None => {
            info!("Reading snapshots from stdin");
            pipeline
                .run(JsonLinesSource::stdin(), &mut sink, shutdown_rx)
                .await
        }
    };

    info!(
        "Stopped ({:?}) after {}: {} snapshots ingested, {} rejected, {} discontinuities, peak {} opened per window",
        summary.stop_reason,
        format_duration(started.elapsed()),
        summary.ingested,
        summary.rejected,
        summary.discontinuities,
        summary.peak_window_sum
    );

    if args.summary {
        let report = RunReport::new(&summary, &sink.1);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
