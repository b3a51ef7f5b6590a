//! Record sources: the seam between archive formats and the filtering pipeline.
//!
//! A source is described by an [`OpenSource`] value (cheap, `Send`), opened inside its own
//! pipeline thread, then polled with [`RecordSource::next_record`] until it returns
//! `Ok(None)`. Closing is `Drop`.

pub mod headers;
pub mod mbox;

use std::io;
use thiserror::Error;

use crate::types::Record;

pub use headers::{HeaderError, parse_message};
pub use mbox::{MboxFile, MboxReader};

/// Fatal source failures. Each one stops its source and cancels the run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file opening error for {label}: {source}")]
    Open {
        label: String,
        #[source]
        source: io::Error,
    },
    #[error("read error for {label}: {source}")]
    Read {
        label: String,
        #[source]
        source: io::Error,
    },
    #[error("mbox format error for {label} at line {line}: {reason}")]
    Format {
        label: String,
        line: usize,
        reason: String,
    },
    #[error("header parsing error for {label} in message at line {line}: {source}")]
    Header {
        label: String,
        line: usize,
        #[source]
        source: HeaderError,
    },
}

/// An opened archive yielding records in read order.
pub trait RecordSource: Send {
    /// Next record; `Ok(None)` at end of source.
    fn next_record(&mut self) -> Result<Option<Record>, SourceError>;
}

/// Where a source lives and how to open it.
pub trait OpenSource: Send + 'static {
    type Source: RecordSource;

    /// Label attached to records and errors from this source.
    fn label(&self) -> String;

    fn open(self) -> Result<Self::Source, SourceError>;
}
