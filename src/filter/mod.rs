//! Record filters, the evaluation chain and its statistics.

pub mod chain;
pub mod kinds;
pub mod stats;

pub use chain::FilterChain;
pub use kinds::{Filter, FilterKind};
pub use stats::{StatsAggregator, StatsSnapshot};
