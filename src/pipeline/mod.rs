//! Pipeline components: cancellation and context, per-source loop, coordination, errors.

pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod source_loop;

pub use context::{
    CancelToken, FirstError, PipelineContext, PipelineHandles, PipelineResult, RunSummary,
};
pub use error_handler::{PipelineError, record_failure, resolve_outcome};
pub use orchestrator::{collect_records, run_pipeline, run_pipeline_with_cancel};
pub use source_loop::{SourceEnd, SourceSummary, run_source_loop, spawn_source_thread};
