//! Outcome statistics. One thread owns the counter map; callers only hand it labels
//! over an unbounded channel, so recording never blocks and never races.

use crossbeam_channel::{Sender, bounded, unbounded};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::utils::config::{Labels, REPORT_LABEL_WIDTH};

enum StatsMsg {
    Outcome(String),
    Snapshot(Sender<BTreeMap<String, u64>>),
}

/// Point-in-time copy of the counters plus wall time since the aggregator started.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub counts: BTreeMap<String, u64>,
    pub elapsed: Duration,
}

impl StatsSnapshot {
    /// Count for `label`, 0 when never seen.
    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn accepted(&self) -> u64 {
        self.get(Labels::ACCEPTED)
    }

    /// Sum of every label: equals the number of records examined.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Rejection labels with counts, sorted by label.
    pub fn rejections(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts
            .iter()
            .filter(|(k, _)| k.as_str() != Labels::ACCEPTED)
            .map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = REPORT_LABEL_WIDTH;
        let rounded = Duration::from_millis((self.elapsed.as_millis() / 10 * 10) as u64);
        writeln!(f, "{:<w$}: {:>4}", "time processing", format!("{:?}", rounded))?;
        writeln!(f, "{:<w$}: {:>4}", "OK", self.accepted())?;
        writeln!(f, "skipped")?;
        for (label, count) in self.rejections() {
            writeln!(f, "{:<w$}: {:>4}", label, count)?;
        }
        Ok(())
    }
}

/// Single-owner counter store fed by a serialized stream of outcome labels.
pub struct StatsAggregator {
    tx: Option<Sender<StatsMsg>>,
    handle: Option<JoinHandle<()>>,
    start: Instant,
}

impl StatsAggregator {
    /// Start the owner thread. Every label in `seed` is reported even if it is never recorded.
    pub fn start<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: BTreeMap<String, u64> =
            seed.into_iter().map(|s| (s.into(), 0)).collect();
        let (tx, rx) = unbounded::<StatsMsg>();
        let handle = thread::spawn(move || {
            while let Ok(msg) = rx.recv() {
                match msg {
                    StatsMsg::Outcome(label) => *counts.entry(label).or_insert(0) += 1,
                    StatsMsg::Snapshot(reply) => {
                        let _ = reply.send(counts.clone());
                    }
                }
            }
            debug!("stats: channel closed, {} labels", counts.len());
        });
        Self {
            tx: Some(tx),
            handle: Some(handle),
            start: Instant::now(),
        }
    }

    /// Hand off one outcome label. Never blocks.
    pub fn record(&self, label: &str) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(StatsMsg::Outcome(label.to_owned()));
        }
    }

    /// Copy of the counters. Labels recorded before this call (from any thread that has
    /// since been joined) are included, since the owner processes messages in order.
    pub fn snapshot(&self) -> StatsSnapshot {
        let elapsed = self.start.elapsed();
        let (reply_tx, reply_rx) = bounded(1);
        let counts = self
            .tx
            .as_ref()
            .and_then(|tx| tx.send(StatsMsg::Snapshot(reply_tx)).ok())
            .and_then(|_| reply_rx.recv().ok())
            .unwrap_or_default();
        StatsSnapshot { counts, elapsed }
    }

    /// Final snapshot; stops and joins the owner thread.
    pub fn finish(mut self) -> StatsSnapshot {
        let snap = self.snapshot();
        self.shutdown();
        snap
    }

    fn shutdown(&mut self) {
        // Dropping the only sender ends the owner's recv loop.
        drop(self.tx.take());
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for StatsAggregator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
