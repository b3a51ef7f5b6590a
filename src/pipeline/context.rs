//! Pipeline context: the cancellation latch, the first-error slot, and the shared data
//! each source thread receives.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::Record;
use crate::filter::FilterChain;
use crate::pipeline::error_handler::PipelineError;
use crate::pipeline::source_loop::SourceSummary;

/// Broadcast cancellation. Flips once from "running" to "cancelled" and stays there.
///
/// Two views of the same state: [`is_cancelled`](Self::is_cancelled) for polling, and
/// [`signal`](Self::signal), a receiver that is disconnected once cancelled, for use in
/// `crossbeam_channel::select!` next to a blocking send. Clones share the state, so every
/// holder sees the transition, including threads started after it.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    cancelled: AtomicBool,
    /// Dropped on cancel, which disconnects every clone of `signal`.
    closer: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (closer, signal) = bounded::<()>(0);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                closer: Mutex::new(Some(closer)),
                signal,
            }),
        }
    }

    /// Cancel. Returns true only for the call that performed the transition. Never blocks
    /// beyond a brief uncontended lock.
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        drop(
            self.inner
                .closer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Ready (disconnected) once cancelled; never yields a message.
    pub fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot for the run's terminal error; the first writer wins.
pub type FirstError = Arc<Mutex<Option<PipelineError>>>;

/// Shared context for one source thread.
pub struct PipelineContext {
    pub label: String,
    pub chain: Arc<FilterChain>,
    pub cancel: CancelToken,
    pub first_error: FirstError,
    pub record_tx: Sender<Record>,
}

/// Per-source summaries of a run that finished without error or cancellation.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub sources: Vec<SourceSummary>,
}

impl RunSummary {
    /// Records examined across all sources.
    pub fn examined(&self) -> usize {
        self.sources.iter().map(|s| s.examined).sum()
    }

    /// Records emitted to the merged stream across all sources.
    pub fn emitted(&self) -> usize {
        self.sources.iter().map(|s| s.emitted).sum()
    }
}

/// Accepted records plus the run's terminal outcome. On error, `records` holds whatever
/// was accepted before cancellation.
#[derive(Debug)]
pub struct PipelineResult {
    pub records: Vec<Record>,
    pub outcome: Result<RunSummary, PipelineError>,
}

/// Handles returned by [`run_pipeline`](crate::pipeline::run_pipeline) for streaming.
/// Receive from `record_rx` until it closes (every source thread has exited), then
/// [`wait`](Self::wait) for the terminal outcome.
pub struct PipelineHandles {
    pub record_rx: Receiver<Record>,
    pub coordinator: JoinHandle<Result<RunSummary, PipelineError>>,
    pub cancel: CancelToken,
}

impl PipelineHandles {
    /// Stop all sources early. The outcome becomes `Cancelled` unless a source error got there first.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Join the coordinator. Records not yet received are dropped; if sources are still
    /// running they see the closed stream and the run ends `Cancelled`.
    pub fn wait(self) -> Result<RunSummary, PipelineError> {
        drop(self.record_rx);
        self.coordinator
            .join()
            .unwrap_or_else(|_| Err(PipelineError::Panicked {
                label: "coordinator".to_string(),
            }))
    }

    /// Drain the merged stream into a Vec, calling `on_record` for each, then wait.
    pub fn collect<F>(self, mut on_record: F) -> PipelineResult
    where
        F: FnMut(&Record),
    {
        let mut records = Vec::new();
        while let Ok(record) = self.record_rx.recv() {
            on_record(&record);
            records.push(record);
        }
        log::debug!("main: merged channel closed, {} records", records.len());
        PipelineResult {
            records,
            outcome: self.wait(),
        }
    }
}
