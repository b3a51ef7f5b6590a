//! Per-source loop: open, read, filter, emit survivors; stop on end of source, on the
//! first read/parse error, or as soon as cancellation is observed.

use crossbeam_channel::select;
use log::debug;
use std::thread::{self, JoinHandle};

use super::context::PipelineContext;
use super::error_handler::{PipelineError, record_failure};
use crate::source::{OpenSource, RecordSource, SourceError};

/// How a source thread ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceEnd {
    /// Clean end of source.
    Exhausted,
    /// Saw the cancellation signal.
    Cancelled,
    /// Open, read or parse error (recorded in the run's first-error slot).
    Failed,
    /// The merged stream's receiver was dropped.
    Disconnected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSummary {
    pub label: String,
    /// Records evaluated through the chain (one outcome label each).
    pub examined: usize,
    /// Records sent to the merged stream.
    pub emitted: usize,
    pub end: SourceEnd,
}

impl SourceSummary {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            examined: 0,
            emitted: 0,
            end: SourceEnd::Exhausted,
        }
    }
}

fn fail(ctx: &PipelineContext, err: SourceError) {
    record_failure(
        &ctx.first_error,
        &ctx.cancel,
        PipelineError::from_source(ctx.label.clone(), err),
    );
}

/// Open `opener` and run its loop on a new thread. An open failure counts as a source failure.
pub fn spawn_source_thread<O: OpenSource>(opener: O, ctx: PipelineContext) -> JoinHandle<SourceSummary> {
    thread::spawn(move || {
        if ctx.cancel.is_cancelled() {
            return SourceSummary {
                end: SourceEnd::Cancelled,
                ..SourceSummary::new(&ctx.label)
            };
        }
        debug!("{}: opening", ctx.label);
        match opener.open() {
            Ok(mut source) => run_source_loop(&mut source, &ctx),
            Err(err) => {
                fail(&ctx, err);
                SourceSummary {
                    end: SourceEnd::Failed,
                    ..SourceSummary::new(&ctx.label)
                }
            }
        }
    })
}

/// Run one opened source to completion. Records are evaluated and emitted in read order.
/// After cancellation the loop does at most the step it is already in before returning.
pub fn run_source_loop<S>(source: &mut S, ctx: &PipelineContext) -> SourceSummary
where
    S: RecordSource + ?Sized,
{
    let mut summary = SourceSummary::new(&ctx.label);
    summary.end = loop {
        if ctx.cancel.is_cancelled() {
            break SourceEnd::Cancelled;
        }
        let record = match source.next_record() {
            Ok(Some(record)) => record,
            Ok(None) => break SourceEnd::Exhausted,
            Err(err) => {
                fail(ctx, err);
                break SourceEnd::Failed;
            }
        };
        summary.examined += 1;
        let (accepted, _) = ctx.chain.evaluate(&record);
        if !accepted {
            continue;
        }
        // Block on a full merged channel, but not past cancellation.
        select! {
            send(ctx.record_tx, record) -> res => {
                if res.is_err() {
                    // Nobody is listening any more: stop the other sources as well.
                    ctx.cancel.cancel();
                    break SourceEnd::Disconnected;
                }
                summary.emitted += 1;
            }
            recv(ctx.cancel.signal()) -> _ => break SourceEnd::Cancelled,
        }
    };
    debug!(
        "{}: {:?} after {} examined, {} emitted",
        summary.label, summary.end, summary.examined, summary.emitted
    );
    summary
}
