use crossbeam_channel::bounded;
use log::debug;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::context::{
    CancelToken, FirstError, PipelineContext, PipelineHandles, PipelineResult, RunSummary,
};
use super::error_handler::{PipelineError, record_failure, resolve_outcome};
use super::source_loop::{SourceSummary, spawn_source_thread};
use crate::Record;
use crate::filter::FilterChain;
use crate::source::OpenSource;
use crate::utils::config::MERGED_CHANNEL_CAP;

/// Start one thread per source plus a coordinator thread. Returns the merged accepted-record
/// stream and the handle that resolves to the run's terminal outcome.
pub fn run_pipeline<O: OpenSource>(sources: Vec<O>, chain: Arc<FilterChain>) -> PipelineHandles {
    run_pipeline_with_cancel(sources, chain, CancelToken::new())
}

/// Same as [`run_pipeline`] with a caller-owned token (e.g. cancelled from a Ctrl+C handler).
pub fn run_pipeline_with_cancel<O: OpenSource>(
    sources: Vec<O>,
    chain: Arc<FilterChain>,
    cancel: CancelToken,
) -> PipelineHandles {
    let (record_tx, record_rx) = bounded::<Record>(MERGED_CHANNEL_CAP);
    let first_error: FirstError = Arc::new(Mutex::new(None));

    debug!("starting {} sources", sources.len());
    let handles: Vec<(String, JoinHandle<SourceSummary>)> = sources
        .into_iter()
        .map(|opener| {
            let label = opener.label();
            let ctx = PipelineContext {
                label: label.clone(),
                chain: Arc::clone(&chain),
                cancel: cancel.clone(),
                first_error: Arc::clone(&first_error),
                record_tx: record_tx.clone(),
            };
            (label, spawn_source_thread(opener, ctx))
        })
        .collect();

    // Only the source threads hold senders now; the merged stream closes when the last one exits.
    drop(record_tx);

    let coordinator = {
        let cancel = cancel.clone();
        thread::spawn(move || coordinate(handles, &first_error, &cancel))
    };

    PipelineHandles {
        record_rx,
        coordinator,
        cancel,
    }
}

/// Join every source thread, then resolve the terminal outcome.
fn coordinate(
    handles: Vec<(String, JoinHandle<SourceSummary>)>,
    first_error: &FirstError,
    cancel: &CancelToken,
) -> Result<RunSummary, PipelineError> {
    let mut summaries = Vec::with_capacity(handles.len());
    for (label, handle) in handles {
        match handle.join() {
            Ok(summary) => summaries.push(summary),
            Err(_) => record_failure(first_error, cancel, PipelineError::Panicked { label }),
        }
    }
    debug!("coordinator: all {} sources finished", summaries.len());
    resolve_outcome(first_error, cancel, summaries)
}

/// Run every source to completion and collect the accepted records.
/// Records come back in arrival order; sort afterwards if order matters.
pub fn collect_records<O: OpenSource>(sources: Vec<O>, chain: Arc<FilterChain>) -> PipelineResult {
    run_pipeline(sources, chain).collect(|_| {})
}
