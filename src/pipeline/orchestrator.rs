use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

use crate::engine::progress::WriteProgress;
use crate::engine::transport::{Endpoints, SearchTransport, fetch_document_count};
use crate::error::{DumpError, dump_error};
use crate::pipeline::{
    Paginator, PipelineState, SinkWriter, spawn_paginator, spawn_sink_writer, work_queue,
};
use crate::{DumpOpts, DumpStats};

/// Main orchestrator: one export run.
/// Count check → create output → paginator thread → work queue → sink writer thread → stats.
pub fn run_dump<T: SearchTransport + ?Sized + 'static>(
    opts: &DumpOpts,
    transport: Arc<T>,
) -> Result<DumpStats> {
    opts.validate()?;
    info!("Starting to dump {}", opts.index);
    let start = Instant::now();

    let endpoints = Endpoints::new(&opts.base_url, &opts.index);
    let expected = fetch_document_count(transport.as_ref(), &endpoints)?;
    info!("Index {} has {} documents to dump", opts.index, expected);
    if expected == 0 {
        return Err(DumpError::EmptyIndex(opts.index.clone()).into());
    }

    let sink = SinkWriter::create(&opts.output, opts.compression)?;
    let (queue_tx, queue_rx) = work_queue(opts.queue_capacity);
    debug!("Work queue capacity {}", queue_tx.capacity());

    let paginator = Paginator::new(transport, endpoints, opts.window_size);
    let producer = spawn_paginator(paginator, queue_tx);
    let progress = opts.progress.then(|| WriteProgress::new(expected));
    let consumer = spawn_sink_writer(sink, queue_rx, progress);

    let (produced, mut queue_tx) = producer
        .join()
        .map_err(|_| anyhow::anyhow!("paginator thread panicked"))?;
    queue_tx.close();
    info!("Closed work queue");
    let written = consumer
        .join()
        .map_err(|_| anyhow::anyhow!("sink writer thread panicked"))?;

    let state = resolve_outcome(produced, written)?;
    let stats = DumpStats {
        records: state.counter,
        pages: state.pages,
        expected,
        elapsed: start.elapsed(),
    };
    report(opts, &stats);
    Ok(stats)
}

/// Pick the error to surface. A paginator that stopped only because the sink went away reports the
/// sink's error instead.
fn resolve_outcome(produced: Result<PipelineState>, written: Result<u64>) -> Result<PipelineState> {
    match (produced, written) {
        (Ok(state), Ok(written)) => {
            if written != state.counter {
                warn!(
                    "Paginator queued {} records but sink wrote {}",
                    state.counter, written
                );
            }
            Ok(state)
        }
        (Err(e), Err(sink_err)) if matches!(dump_error(&e), Some(DumpError::SinkGone)) => {
            Err(sink_err).context("write output")
        }
        (Err(e), _) => Err(e).context("paginate index"),
        (Ok(_), Err(sink_err)) => Err(sink_err).context("write output"),
    }
}

fn report(opts: &DumpOpts, stats: &DumpStats) {
    if stats.records != stats.expected {
        warn!(
            "Index {} reported {} documents before the dump, wrote {}",
            opts.index, stats.expected, stats.records
        );
    }
    info!(
        "Dumped {} records in {:.1} seconds ({} pages), average speed {}/second",
        stats.records,
        stats.elapsed.as_secs_f64(),
        stats.pages,
        stats.records_per_sec()
    );
    info!("Finished dumping {} to {}", opts.index, opts.output.display());
}
