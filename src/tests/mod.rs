//! Crate-level tests and shared fixtures.
//!
//! - Integration tests (server, cache and sources end to end)
//! - Fuzz tests (range round-trips, search agreement)

pub mod integration;
pub mod fuzz;

use crate::config::Config;
use crate::ledger::{LedgerId, LedgerName, RangeSet};
use crate::source::DataSource;
use crate::utils::{LedgerToolError, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-process data source. `closed` and `validated` are the last complete
/// ledger, `current` the one after it.
pub(crate) struct FakeSource {
    complete: RangeSet,
    failing: RangeSet,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(complete: &str) -> Self {
        Self {
            complete: complete.parse().unwrap(),
            failing: RangeSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Ledgers whose fetch fails with a backend error.
    pub fn failing(mut self, ledgers: &str) -> Self {
        self.failing = ledgers.parse().unwrap();
        self
    }

    /// Number of `get_ledger` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn ledger(number: u64, full: bool) -> Value {
        json!({
            "ledger_index": number.to_string(),
            "close_time": number * 10,
            "full": full,
        })
    }
}

impl DataSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn complete(&self) -> &RangeSet {
        &self.complete
    }

    fn info(&self) -> Value {
        json!({ "complete_ledgers": self.complete.to_string() })
    }

    fn resolve_name(&self, name: LedgerName) -> Result<Option<u64>> {
        Ok(match name {
            LedgerName::Closed | LedgerName::Validated => self.complete.last(),
            LedgerName::Current => self.complete.last().map(|n| n + 1),
            LedgerName::First | LedgerName::Last => None,
        })
    }

    fn get_ledger(&self, id: LedgerId, full: bool) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let number = match id {
            LedgerId::Number(n) => n,
            LedgerId::Name(name) => self
                .resolve_name(name)?
                .ok_or_else(|| LedgerToolError::backend(format!("ledger {}", id), "no ledger found (lgrNotFound)"))?,
        };
        if self.failing.contains(number) {
            return Err(LedgerToolError::backend(format!("ledger {}", id), "no ledger found (lgrNotFound)"));
        }
        Ok(Self::ledger(number, full))
    }
}

/// Default configuration with the cache under `dir` and the given ledger specs.
pub(crate) fn test_config(dir: &Path, ledgers: &[&str]) -> Config {
    Config {
        cache_dir: dir.join("cache"),
        ledgers: ledgers.iter().map(|s| s.to_string()).collect(),
        ..Config::default()
    }
}
