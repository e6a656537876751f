//! Database-backed source: completeness comes from the server's SQLite
//! ledger database (ledgers with at least `validation_quorum` validations);
//! ledger content is still fetched through the server binary.

use crate::config::Config;
use crate::ledger::{LedgerId, LedgerName, RangeSet};
use crate::source::{DataSource, RippledCommand};
use crate::utils::{LedgerToolError, Result};
use rusqlite::{params, Connection, OpenFlags};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DATABASE_NAME: &str = "ledger.db";

const COMPLETE_QUERY: &str = "
    SELECT L.LedgerSeq, COUNT(*) AS validations
    FROM Ledgers L
    JOIN Validations V ON V.LedgerHash = L.LedgerHash
    GROUP BY L.LedgerHash, L.LedgerSeq
    HAVING COUNT(*) >= ?1
    ORDER BY L.LedgerSeq";

pub struct DatabaseReader {
    path: PathBuf,
    quorum: u64,
    complete: RangeSet,
    client: RippledCommand,
}

impl DatabaseReader {
    pub fn open(config: &Config) -> Result<Self> {
        let path = database_path(config)?;
        let quorum = validation_quorum(config)?;
        let complete = complete_ledgers(&path, quorum)?;
        info!(path = %path.display(), quorum, complete = %complete, "read ledger database");
        Ok(Self {
            path,
            quorum,
            complete,
            client: RippledCommand::new(config)?,
        })
    }
}

/// `--database PATH`, else `[database_path]`; `ledger.db` is appended to
/// directories.
pub fn database_path(config: &Config) -> Result<PathBuf> {
    let base = match config.database.as_deref() {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => config
            .server_config
            .get_str("database_path")
            .map(PathBuf::from)
            .ok_or_else(|| {
                LedgerToolError::Config(
                    "no database: pass --database PATH or set [database_path]".into(),
                )
            })?,
    };
    if base.file_name().map_or(false, |n| n == DATABASE_NAME) {
        Ok(base)
    } else {
        Ok(base.join(DATABASE_NAME))
    }
}

/// `--validations N`, else `[validation_quorum]`.
pub fn validation_quorum(config: &Config) -> Result<u64> {
    if let Some(n) = config.validations {
        return Ok(n);
    }
    config
        .server_config
        .get_u64("validation_quorum")?
        .ok_or_else(|| {
            LedgerToolError::Config("no quorum: pass --validations N or set [validation_quorum]".into())
        })
}

/// Ledger sequence numbers validated by at least `quorum` validators.
pub fn complete_ledgers(path: &Path, quorum: u64) -> Result<RangeSet> {
    let db_err = |e: rusqlite::Error| LedgerToolError::backend(path.display(), e);
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(db_err)?;
    let quorum = i64::try_from(quorum).unwrap_or(i64::MAX);

    let mut stmt = conn.prepare(COMPLETE_QUERY).map_err(db_err)?;
    let rows = stmt
        .query_map(params![quorum], |row| row.get::<_, i64>(0))
        .map_err(db_err)?;

    let mut complete = RangeSet::new();
    for seq in rows {
        if let Ok(n) = u64::try_from(seq.map_err(db_err)?) {
            complete.insert(n);
        }
    }
    Ok(complete)
}

impl DataSource for DatabaseReader {
    fn name(&self) -> &'static str {
        "database"
    }

    fn complete(&self) -> &RangeSet {
        &self.complete
    }

    fn info(&self) -> Value {
        json!({
            "database": self.path.display().to_string(),
            "validation_quorum": self.quorum,
            "complete_ledgers": self.complete.to_string(),
        })
    }

    fn resolve_name(&self, name: LedgerName) -> Result<Option<u64>> {
        Ok(match name {
            LedgerName::Closed | LedgerName::Validated => self.complete.last(),
            _ => None,
        })
    }

    fn get_ledger(&self, id: LedgerId, full: bool) -> Result<Value> {
        self.client.get_ledger(id, full)
    }
}
