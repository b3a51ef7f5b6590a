//! Progress counter for the merged record stream (verbose mode).

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " records"
    )))
}

/// Update progress bar if available
/// Uses try_lock to avoid blocking if mutex is contended (non-blocking)
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Callback for [`PipelineHandles::collect`](crate::pipeline::PipelineHandles::collect):
/// bumps `bar` every `chunk_size` records. Call [`flush_progress_remainder`] afterwards.
pub fn batched_counter(bar: Option<ProgressBar>, chunk_size: usize) -> impl FnMut(&crate::Record) {
    let mut seen = 0_usize;
    move |_: &crate::Record| {
        seen += 1;
        if let Some(bar) = &bar
            && seen.is_multiple_of(chunk_size)
        {
            update_progress_bar(bar, chunk_size);
        }
    }
}

/// Final progress update for the remainder after batched updates.
pub fn flush_progress_remainder(pb: Option<&ProgressBar>, total: usize, chunk_size: usize) {
    if let Some(pb) = pb {
        let remaining = total % chunk_size;
        if remaining > 0 {
            update_progress_bar(pb, remaining);
        }
        if let Ok(mut bar) = pb.try_lock() {
            let _ = bar.refresh();
        }
    }
}
