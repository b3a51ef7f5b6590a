//! The closed set of record filters.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::types::{Holiday, Record};

/// What a filter checks. `DuplicateId` is the only stateful kind; its set lives for one run.
#[derive(Debug)]
pub enum FilterKind {
    /// Joined `Received` headers contain the fragment.
    ReceivedIp { fragment: String },
    /// Timestamp strictly inside (start, end).
    ReportDate {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Timestamp not strictly inside any holiday.
    Holidays(Vec<Holiday>),
    /// First sender matches the pattern. Case-insensitivity is part of the compiled pattern.
    Sender(Regex),
    /// Message id not seen before in this run.
    DuplicateId(Mutex<HashSet<String>>),
}

/// A named predicate over a [`Record`]. The name is the outcome label used when it rejects.
#[derive(Debug)]
pub struct Filter {
    name: String,
    kind: FilterKind,
}

impl Filter {
    pub fn new(name: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn received_ip(name: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::new(
            name,
            FilterKind::ReceivedIp {
                fragment: fragment.into(),
            },
        )
    }

    pub fn report_date(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(name, FilterKind::ReportDate { start, end })
    }

    pub fn holidays(name: impl Into<String>, holidays: Vec<Holiday>) -> Self {
        Self::new(name, FilterKind::Holidays(holidays))
    }

    pub fn sender(name: impl Into<String>, pattern: Regex) -> Self {
        Self::new(name, FilterKind::Sender(pattern))
    }

    pub fn duplicate_id(name: impl Into<String>) -> Self {
        Self::new(name, FilterKind::DuplicateId(Mutex::new(HashSet::new())))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// True when the record passes this filter.
    pub fn accepts(&self, record: &Record) -> bool {
        match &self.kind {
            FilterKind::ReceivedIp { fragment } => {
                record.received_joined().contains(fragment.as_str())
            }
            FilterKind::ReportDate { start, end } => {
                let t = record.timestamp();
                t > *start && t < *end
            }
            FilterKind::Holidays(holidays) => {
                let t = record.timestamp();
                !holidays.iter().any(|h| h.covers(t))
            }
            FilterKind::Sender(pattern) => record
                .sender()
                .is_some_and(|address| pattern.is_match(address)),
            FilterKind::DuplicateId(seen) => {
                // check-and-insert under one lock: two threads with the same id can't both win
                let mut seen = seen.lock().unwrap_or_else(PoisonError::into_inner);
                seen.insert(record.message_id().to_owned())
            }
        }
    }
}
