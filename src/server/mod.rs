//! LedgerServer: wires the data source, named ledgers, the requested
//! working set and the summary/full caches together.
//!
//! Built once per run from a `Config`; only cache contents change afterwards.

pub mod search;

pub use search::{search_ledgers, Position, SearchOptions};

use crate::config::Config;
use crate::ledger::{LedgerId, LedgerName, NamedLedgers, RangeSet};
use crate::source::{self, DataSource};
use crate::storage::{self, Creator, FileCache};
use crate::utils::{Result, METRICS};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Detail level of a ledger. Each level has its own cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fidelity {
    Summary,
    Full,
}

impl Fidelity {
    pub const ALL: [Fidelity; 2] = [Fidelity::Summary, Fidelity::Full];

    pub fn from_full(full: bool) -> Self {
        if full {
            Fidelity::Full
        } else {
            Fidelity::Summary
        }
    }

    pub fn is_full(self) -> bool {
        self == Fidelity::Full
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Fidelity::Summary => "summary",
            Fidelity::Full => "full",
        }
    }

    fn index(self) -> usize {
        match self {
            Fidelity::Summary => 0,
            Fidelity::Full => 1,
        }
    }
}

/// How a cache miss for one ledger number may be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// The ledger is complete; a fetched copy is final and goes to disk.
    pub save_in_cache: bool,
    /// The source may be asked for the ledger.
    pub can_create: bool,
}

pub struct LedgerServer {
    source: Arc<dyn DataSource>,
    names: NamedLedgers,
    ledgers: RangeSet,
    caches: [FileCache<Value>; 2],
    offline: bool,
}

impl LedgerServer {
    /// Open the configured data source and build the server around it.
    pub fn new(config: &Config) -> Result<Self> {
        let source = source::open(config)?;
        Self::with_source(config, source)
    }

    pub fn with_source(config: &Config, source: Arc<dyn DataSource>) -> Result<Self> {
        let names = resolve_names(source.as_ref());
        let ledgers = RangeSet::join(&config.ledgers, &names.aliases())?;
        METRICS.set_gauge("ledgers.requested", ledgers.len() as f64);

        let caches = [
            make_cache(config, &source, Fidelity::Summary)?,
            make_cache(config, &source, Fidelity::Full)?,
        ];
        info!(
            source = source.name(),
            complete = %source.complete(),
            ledgers = %ledgers,
            runs = ledgers.run_count(),
            offline = config.offline,
            "ledger server ready"
        );
        Ok(Self {
            source,
            names,
            ledgers,
            caches,
            offline: config.offline,
        })
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn info(&self) -> Value {
        self.source.info()
    }

    pub fn complete(&self) -> &RangeSet {
        self.source.complete()
    }

    pub fn names(&self) -> &NamedLedgers {
        &self.names
    }

    /// The sorted working set of ledger numbers requested for this run.
    pub fn ledgers(&self) -> &RangeSet {
        &self.ledgers
    }

    pub fn cache(&self, fidelity: Fidelity) -> &FileCache<Value> {
        &self.caches[fidelity.index()]
    }

    pub fn fetch_policy(&self, number: u64) -> FetchPolicy {
        let complete = self.complete();
        // Speculative fetches are allowed strictly above the first complete
        // ledger; the `number - 1` bound is kept as the tool has always had it.
        let above_boundary = match (complete.first(), number.checked_sub(1)) {
            (Some(first), Some(previous)) => first <= previous,
            _ => false,
        };
        FetchPolicy {
            save_in_cache: complete.contains(number),
            can_create: !self.offline && above_boundary,
        }
    }

    /// Ledger `number` from the cache, falling back to the source when the
    /// fetch policy allows. `None` when it cannot be obtained.
    pub fn get_ledger(&self, number: u64, fidelity: Fidelity) -> Result<Option<Value>> {
        let policy = self.fetch_policy(number);
        self.cache(fidelity)
            .get_data(&number.to_string(), policy.save_in_cache, policy.can_create)
    }
}

fn resolve_names(source: &dyn DataSource) -> NamedLedgers {
    let mut names = NamedLedgers::default();
    for name in LedgerName::ALL.iter().copied().filter(LedgerName::is_server_side) {
        match source.resolve_name(name) {
            Ok(number) => names.set(name, number),
            Err(e) => warn!(%name, error = %e, "cannot resolve ledger name"),
        }
    }
    names.first = source.complete().first();
    names.last = source.complete().last();
    names
}

fn make_cache(config: &Config, source: &Arc<dyn DataSource>, fidelity: Fidelity) -> Result<FileCache<Value>> {
    let source = Arc::clone(source);
    let creator: Creator<Value> = Box::new(move |name: &str| {
        let id: LedgerId = name.parse()?;
        source.get_ledger(id, fidelity.is_full())
    });
    storage::open(config.cache_dir.join(fidelity.dir_name()), config.codec, creator)
}
