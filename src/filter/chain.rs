//! Ordered filter chain with short-circuit evaluation and outcome statistics.

use crate::filter::kinds::Filter;
use crate::filter::stats::{StatsAggregator, StatsSnapshot};
use crate::types::Record;
use crate::utils::Settings;
use crate::utils::config::Labels;

/// Ordered filters (insertion order = evaluation order) plus the stats aggregator they report to.
///
/// Shared between source threads behind an `Arc`; `evaluate` takes `&self`.
pub struct FilterChain {
    filters: Vec<Filter>,
    stats: StatsAggregator,
}

impl FilterChain {
    pub fn new(filters: Vec<Filter>) -> Self {
        let seed = std::iter::once(Labels::ACCEPTED.to_string())
            .chain(filters.iter().map(|f| f.name().to_string()))
            .collect::<Vec<_>>();
        Self {
            filters,
            stats: StatsAggregator::start(seed),
        }
    }

    /// Default chain: ip, report date, holidays, sender, duplicate id.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(vec![
            Filter::received_ip(Labels::IP_INVALID, settings.received_ip_fragment.clone()),
            Filter::report_date(
                Labels::OUTSIDE_DATERANGE,
                settings.report_start,
                settings.report_end,
            ),
            Filter::holidays(Labels::ON_HOLIDAY, settings.holidays.clone()),
            Filter::sender(Labels::INVALID_SENDER, settings.valid_sender.clone()),
            Filter::duplicate_id(Labels::DUPLICATE_ID),
        ])
    }

    /// Run `record` through the filters in order. Returns `(false, name)` for the first
    /// filter that rejects, `(true, "accepted")` otherwise. Exactly one label is recorded.
    pub fn evaluate(&self, record: &Record) -> (bool, &str) {
        let (accepted, label) = match self.filters.iter().find(|f| !f.accepts(record)) {
            Some(f) => (false, f.name()),
            None => (true, Labels::ACCEPTED),
        };
        self.stats.record(label);
        (accepted, label)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Counter snapshot; complete once every evaluating thread has finished.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Final snapshot, stopping the stats thread.
    pub fn finish(self) -> StatsSnapshot {
        self.stats.finish()
    }
}
