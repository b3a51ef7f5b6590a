//! Public and internal types for the mboxfilter API and pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::utils::config::DATE_FORMAT;

/// Ordered header map: name (case-sensitive, as received) → values in the order they appeared.
pub type HeaderMap = Vec<(String, Vec<String>)>;

/// One parsed message header set plus the label of the source it was read from.
///
/// Fields are private: a `Record` is not modified after construction, so clones can be
/// handed to any number of threads read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    timestamp: DateTime<Utc>,
    from: Vec<String>,
    subject: String,
    message_id: String,
    source: String,
    headers: HeaderMap,
}

impl Record {
    pub fn new(
        timestamp: DateTime<Utc>,
        from: Vec<String>,
        subject: impl Into<String>,
        message_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            from,
            subject: subject.into(),
            message_id: message_id.into(),
            source: source.into(),
            headers: Vec::new(),
        }
    }

    /// Append a raw header value, keeping first-seen order of names and per-name order of values.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.headers.push((name, vec![value])),
        }
        self
    }

    /// Replace the whole header map (used by parsers that already built it).
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn from(&self) -> &[String] {
        &self.from
    }

    /// First sender address, if any.
    pub fn sender(&self) -> Option<&str> {
        self.from.first().map(String::as_str)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Subject cut to at most `n` characters; `0` means the whole subject.
    pub fn subject_truncated(&self, n: usize) -> &str {
        if n == 0 {
            return &self.subject;
        }
        match self.subject.char_indices().nth(n) {
            Some((idx, _)) => &self.subject[..idx],
            None => &self.subject,
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// All values for header `name` (exact, case-sensitive match). Empty when absent.
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// `Received` header values joined with a single space, in stored order.
    pub fn received_joined(&self) -> String {
        self.header_values("Received").join(" ")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("holiday starts {start} after it ends {end}")]
pub struct HolidayError {
    pub start: String,
    pub end: String,
}

/// A closed holiday interval. `start <= end` is checked at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Holiday {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Holiday {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, HolidayError> {
        if end < start {
            return Err(HolidayError {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Holiday from two calendar dates, each taken at midnight UTC.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, HolidayError> {
        Self::new(start_of_day(start), start_of_day(end))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// True when `t` lies strictly inside the interval; the boundary days themselves are not covered.
    pub fn covers(&self, t: DateTime<Utc>) -> bool {
        t > self.start && t < self.end
    }
}

impl fmt::Display for Holiday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Midnight UTC of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Full options for a CLI run.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Settings file (TOML).
    pub config_path: PathBuf,
    /// Output CSV path. When None, a timestamped name in the working directory.
    pub output: Option<PathBuf>,
    /// Maximum subject length in the CSV; 0 writes the whole subject.
    pub subject_len: usize,
    /// Print the statistics snapshot as JSON as well as the text report.
    pub stats_json: bool,
    /// Debug logging and a progress counter.
    pub verbose: bool,
    /// Mbox files (directories already expanded).
    pub inputs: Vec<PathBuf>,
}
