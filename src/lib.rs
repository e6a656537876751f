//! ledger-tool: fetch, cache and search ledger history.
//!
//! - `ledger`: ledger names, range specifications, search and conditions
//! - `storage`: the compressed read-through file cache
//! - `source`: subprocess, database and JSON-RPC data sources
//! - `server`: the `LedgerServer` tying sources and caches together
//! - `config`, `cli`, `utils`: configuration, front end, errors/logging/metrics

pub mod utils;
pub mod ledger;
pub mod storage;
pub mod source;
pub mod config;
pub mod server;
pub mod cli;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use ledger::{Condition, LedgerId, LedgerName, RangeSet};
pub use server::{Fidelity, LedgerServer};
pub use source::DataSource;
pub use utils::{LedgerToolError, Result};
