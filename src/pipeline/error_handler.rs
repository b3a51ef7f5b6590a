use log::{debug, error};
use std::sync::PoisonError;
use thiserror::Error;

use super::context::{CancelToken, FirstError, RunSummary};
use super::source_loop::SourceSummary;
use crate::source::SourceError;

/// Terminal error of a run. Exactly one is surfaced per run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source {label} failed: {source}")]
    Source {
        label: String,
        #[source]
        source: SourceError,
    },
    #[error("{label} thread panicked")]
    Panicked { label: String },
    #[error("run cancelled before all sources finished")]
    Cancelled,
}

impl PipelineError {
    pub fn from_source(label: impl Into<String>, source: SourceError) -> Self {
        Self::Source {
            label: label.into(),
            source,
        }
    }

    /// Label of the failing source, when there is one.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Source { label, .. } | Self::Panicked { label } => Some(label.as_str()),
            Self::Cancelled => None,
        }
    }
}

/// Keep `err` if it is the first failure of the run, then cancel every source.
/// Later failures are logged and dropped. Never blocks the caller on other sources.
pub fn record_failure(first_error: &FirstError, cancel: &CancelToken, err: PipelineError) {
    {
        let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            error!("{}", err);
            *slot = Some(err);
        } else {
            debug!("superseded: {}", err);
        }
    }
    if cancel.cancel() {
        debug!("cancellation broadcast to all sources");
    }
}

/// Terminal outcome once every source thread has been joined: the first error if any,
/// `Cancelled` if cancellation happened without one, success otherwise.
pub fn resolve_outcome(
    first_error: &FirstError,
    cancel: &CancelToken,
    sources: Vec<SourceSummary>,
) -> Result<RunSummary, PipelineError> {
    if let Some(err) = first_error
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
    {
        return Err(err);
    }
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    Ok(RunSummary { sources })
}
