//! Data sources: where ledgers come from when the cache cannot answer.
//!
//! Sources: the ledger server binary run as a subprocess (default), the
//! server's SQLite database for completeness plus the binary for content,
//! or a JSON-RPC endpoint. Use `source::open(&config)` to get an
//! `Arc<dyn DataSource>` for the `LedgerServer`.

pub mod process;
pub mod database;
pub mod rpc;

pub use database::DatabaseReader;
pub use process::{RippledCommand, RippledReader};
pub use rpc::JsonRpcReader;

use crate::config::Config;
use crate::ledger::{LedgerId, LedgerName, RangeSet};
use crate::utils::{LedgerToolError, Result, METRICS};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// A backing store of ledgers. Implementations fail fast: no retries.
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Ledgers the source can serve deterministically forever.
    fn complete(&self) -> &RangeSet;

    /// Source description for the `info` command.
    fn info(&self) -> Value;

    /// Resolve `closed`, `current` or `validated`. Other names, and names
    /// with no fixed number, resolve to `None`.
    fn resolve_name(&self, name: LedgerName) -> Result<Option<u64>>;

    /// Fetch one ledger's JSON.
    fn get_ledger(&self, id: LedgerId, full: bool) -> Result<Value>;
}

/// Source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Rippled,
    Database,
    JsonRpc,
}

/// Pick the source named by the configuration. Naming more than one is an
/// error; naming none means the subprocess source.
pub fn select(config: &Config) -> Result<SourceKind> {
    let mut chosen = Vec::new();
    if config.database.is_some() {
        chosen.push((SourceKind::Database, "database"));
    }
    if config.rippled.is_some() {
        chosen.push((SourceKind::Rippled, "rippled"));
    }
    if config.server.is_some() {
        chosen.push((SourceKind::JsonRpc, "server"));
    }
    match chosen.as_slice() {
        [] => Ok(SourceKind::Rippled),
        [(kind, _)] => Ok(*kind),
        many => Err(LedgerToolError::ConfigAmbiguity(
            many.iter().map(|(_, flag)| *flag).collect(),
        )),
    }
}

/// Open the configured source.
pub fn open(config: &Config) -> Result<Arc<dyn DataSource>> {
    let kind = select(config)?;
    let source: Arc<dyn DataSource> = match kind {
        SourceKind::Rippled => Arc::new(RippledReader::open(config)?),
        SourceKind::Database => Arc::new(DatabaseReader::open(config)?),
        SourceKind::JsonRpc => Arc::new(JsonRpcReader::open(config)?),
    };
    info!(source = source.name(), complete = %source.complete(), "data source opened");
    Ok(source)
}

// Server error codes with a readable explanation.
const ERROR_TEXT: &[(&str, &str)] = &[
    ("lgrNotFound", "no ledger found"),
    ("lgrIdxMalformed", "malformed ledger index"),
    ("noCurrent", "no current ledger"),
    ("noClosed", "no closed ledger"),
    ("noNetwork", "server is not connected to the network"),
    ("notSynced", "server is not synced"),
    ("notReady", "server is not ready"),
    ("tooBusy", "server is too busy"),
    ("noPermission", "request needs admin access"),
];

// Exit statuses of the server binary when used as a client.
const EXIT_REASON: &[(i32, &str)] = &[(62, "server not running")];

pub const DEFAULT_REASON: &str = "couldn't connect to server";
const UNKNOWN_ERROR: &str = "request failed";

/// Readable reason for a server error code, keeping the code for reference.
pub fn error_reason(code: &str) -> String {
    match ERROR_TEXT.iter().find(|(c, _)| *c == code) {
        Some((_, text)) => format!("{} ({})", text, code),
        None => format!("{} ({})", UNKNOWN_ERROR, code),
    }
}

/// Reason for a failed subprocess exit.
pub fn exit_reason(code: Option<i32>) -> &'static str {
    code.and_then(|c| EXIT_REASON.iter().find(|(known, _)| *known == c))
        .map_or(DEFAULT_REASON, |(_, reason)| *reason)
}

pub(crate) fn error_code(reply: &Value) -> &str {
    reply
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

/// The ledger object of a `ledger` reply, or a backend error naming `id`.
pub(crate) fn ledger_from_result(id: LedgerId, result: &Value) -> Result<Value> {
    match result.get("ledger") {
        Some(ledger) if !ledger.is_null() => Ok(ledger.clone()),
        _ => {
            METRICS.inc_counter("source.error");
            Err(LedgerToolError::backend(
                format!("ledger {}", id),
                error_reason(error_code(result)),
            ))
        }
    }
}

/// `ledger_index` of a ledger object; servers send it as a number or a string.
pub(crate) fn ledger_index(ledger: &Value) -> Option<u64> {
    match ledger.get("ledger_index")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Complete ledgers from a `server_info` info object. `"empty"` or a missing
/// field means none.
pub(crate) fn complete_from_info(info: &Value) -> Result<RangeSet> {
    match info.get("complete_ledgers").and_then(Value::as_str) {
        None | Some("empty") | Some("") => Ok(RangeSet::new()),
        Some(ranges) => ranges.parse().map_err(|_| {
            LedgerToolError::backend("server_info", format!("bad complete_ledgers '{}'", ranges))
        }),
    }
}
