//! mboxfilter: concurrent mbox header filtering with per-filter rejection statistics

pub mod engine;
pub mod filter;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use filter::{FilterChain, StatsSnapshot};
use pipeline::{PipelineResult, collect_records};
use source::MboxFile;
use utils::Settings;

/// Result alias used by public mboxfilter API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: filter the mbox files at `paths` with the default chain built from
/// `settings`, and return the accepted records with the final statistics.
///
/// Records are in arrival order. On a source failure `outcome` holds the first error and
/// `records` whatever was accepted before the other sources stopped.
///
/// ```ignore
/// let settings = mboxfilter::utils::Settings::load(Path::new("mboxfilter.toml"))?;
/// let (result, stats) = mboxfilter::filter_mboxes(&paths, &settings);
/// let summary = result.outcome?;
/// println!("{}", stats);
/// ```
pub fn filter_mboxes(paths: &[PathBuf], settings: &Settings) -> (PipelineResult, StatsSnapshot) {
    debug!(
        "{} CONFIG:{}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        settings
    );
    let chain = Arc::new(FilterChain::from_settings(settings));
    let sources = paths.iter().map(MboxFile::new).collect();
    let result = collect_records(sources, Arc::clone(&chain));
    (result, chain.stats())
}
