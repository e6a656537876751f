use crate::ledger::Condition;
use crate::server::{search_ledgers, Fidelity, LedgerServer, SearchOptions};
use crate::utils::{Result, METRICS};
use serde_json::json;
use std::io::Write;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Source information, named ledgers and cache state.
    Info,
    /// Every ledger in the working set as pretty JSON.
    Print,
    Cache(CacheAction),
    /// Ledgers in the working set matching a condition.
    Search(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    Count,
    List,
    Clear,
}

pub fn run_command<W: Write>(
    server: &LedgerServer,
    command: &Command,
    fidelity: Fidelity,
    search: &SearchOptions,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Info => info_command(server, out),
        Command::Print => print_command(server, fidelity, out),
        Command::Cache(action) => cache_command(server, *action, fidelity, out),
        Command::Search(condition) => {
            let condition: Condition = condition.parse()?;
            let found = search_ledgers(server, &condition, search)?;
            info!(%condition, matches = found.len(), "search finished");
            writeln!(out, "{}", found)?;
            Ok(())
        }
    }
}

fn info_command<W: Write>(server: &LedgerServer, out: &mut W) -> Result<()> {
    let mut caches = serde_json::Map::new();
    for fidelity in Fidelity::ALL {
        let cache = server.cache(fidelity);
        caches.insert(
            fidelity.dir_name().to_string(),
            json!({
                "directory": cache.dir().display().to_string(),
                "files": cache.file_count()?,
            }),
        );
    }
    let report = json!({
        "source": server.source_name(),
        "info": server.info(),
        "complete_ledgers": server.complete().to_string(),
        "names": server.names(),
        "ledgers": server.ledgers().to_string(),
        "cache": caches,
        "metrics": METRICS.to_json(),
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

fn print_command<W: Write>(server: &LedgerServer, fidelity: Fidelity, out: &mut W) -> Result<()> {
    for number in server.ledgers().iter() {
        match server.get_ledger(number, fidelity) {
            Ok(Some(ledger)) => writeln!(out, "{}", serde_json::to_string_pretty(&ledger)?)?,
            Ok(None) => warn!(ledger = number, "ledger not available"),
            Err(e) if e.is_recoverable() => error!(ledger = number, error = %e, "skipping ledger"),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn cache_command<W: Write>(
    server: &LedgerServer,
    action: CacheAction,
    fidelity: Fidelity,
    out: &mut W,
) -> Result<()> {
    let cache = server.cache(fidelity);
    match action {
        CacheAction::Count => writeln!(out, "{}", cache.file_count()?)?,
        CacheAction::List => {
            for name in cache.cache_list()? {
                writeln!(out, "{}", name)?;
            }
        }
        CacheAction::Clear => {
            let count = cache.file_count()?;
            cache.clear()?;
            info!(dir = %cache.dir().display(), count, "cache cleared");
            writeln!(out, "removed {} files from {}", count, cache.dir().display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{test_config, FakeSource};
    use serde_json::Value;
    use std::sync::Arc;

    fn run(server: &LedgerServer, command: Command) -> String {
        let mut out = Vec::new();
        run_command(server, &command, Fidelity::Summary, &SearchOptions::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn server(dir: &std::path::Path, ledgers: &[&str], fake: FakeSource) -> LedgerServer {
        LedgerServer::with_source(&test_config(dir, ledgers), Arc::new(fake)).unwrap()
    }

    #[test]
    fn print_skips_failed_ledgers() {
        let dir = tempfile::tempdir().expect("temp dir");
        let server = server(dir.path(), &["11-13"], FakeSource::new("10-20").failing("12"));
        let text = run(&server, Command::Print);

        let printed: Vec<Value> = serde_json::Deserializer::from_str(&text)
            .into_iter::<Value>()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(printed, vec![FakeSource::ledger(11, false), FakeSource::ledger(13, false)]);
    }

    #[test]
    fn cache_count_list_and_clear() {
        let dir = tempfile::tempdir().expect("temp dir");
        let server = server(dir.path(), &["11-12,9"], FakeSource::new("10-20"));
        run(&server, Command::Print);

        assert_eq!(run(&server, Command::Cache(CacheAction::Count)), "2\n");
        assert_eq!(run(&server, Command::Cache(CacheAction::List)), "11\n12\n");
        assert!(run(&server, Command::Cache(CacheAction::Clear)).starts_with("removed 2 files"));
        assert_eq!(run(&server, Command::Cache(CacheAction::Count)), "0\n");
    }

    #[test]
    fn info_reports_source_and_names() {
        let dir = tempfile::tempdir().expect("temp dir");
        let server = server(dir.path(), &["closed"], FakeSource::new("10-20"));
        let report: Value = serde_json::from_str(&run(&server, Command::Info)).unwrap();

        assert_eq!(report["source"], "fake");
        assert_eq!(report["complete_ledgers"], "10-20");
        assert_eq!(report["ledgers"], "20");
        assert_eq!(report["names"]["current"], 21);
        assert_eq!(report["names"]["first"], 10);
        assert_eq!(report["cache"]["full"]["files"], 0);
    }

    #[test]
    fn search_prints_matching_ranges() {
        let dir = tempfile::tempdir().expect("temp dir");
        let server = server(dir.path(), &["11-19"], FakeSource::new("10-20"));
        assert_eq!(run(&server, Command::Search("/close_time >= 170".into())), "17-19\n");
    }

    #[test]
    fn bad_conditions_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let server = server(dir.path(), &["11"], FakeSource::new("10-20"));
        let mut out = Vec::new();
        let err = run_command(
            &server,
            &Command::Search("close_time > 1".into()),
            Fidelity::Summary,
            &SearchOptions::default(),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, crate::utils::LedgerToolError::Condition(_)));
    }
}
