//! Integration tests: a ledger server over a fake source and a real cache
//! directory, across several runs.

use crate::config::Config;
use crate::server::{Fidelity, LedgerServer};
use crate::tests::{test_config, FakeSource};
use crate::utils::LedgerToolError;
use std::fs;
use std::sync::Arc;

#[test]
fn test_complete_ledgers_persist_and_provisional_ones_do_not() {
    let dir = tempfile::tempdir().expect("temp dir");
    let fake = Arc::new(FakeSource::new("10-12"));
    let server = LedgerServer::with_source(&test_config(dir.path(), &["11-13"]), fake.clone()).unwrap();

    for n in server.ledgers().iter() {
        let ledger = server.get_ledger(n, Fidelity::Summary).unwrap();
        assert_eq!(ledger, Some(FakeSource::ledger(n, false)));
    }
    assert_eq!(fake.calls(), 3);

    let cache = server.cache(Fidelity::Summary);
    assert_eq!(cache.cache_list().unwrap(), vec!["11", "12"]);
    assert!(!dir.path().join("cache/summary/13.gz").exists());
}

#[test]
fn test_second_run_reads_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(dir.path(), &["11-13"]);
    {
        let first_run = LedgerServer::with_source(&config, Arc::new(FakeSource::new("10-12"))).unwrap();
        for n in 11..=13 {
            first_run.get_ledger(n, Fidelity::Summary).unwrap();
        }
    }

    let fake = Arc::new(FakeSource::new("10-12"));
    let second_run = LedgerServer::with_source(&config, fake.clone()).unwrap();
    assert!(second_run.get_ledger(11, Fidelity::Summary).unwrap().is_some());
    assert!(second_run.get_ledger(12, Fidelity::Summary).unwrap().is_some());
    assert_eq!(fake.calls(), 0);

    // 13 was never persisted, so each request goes back to the source
    second_run.get_ledger(13, Fidelity::Summary).unwrap();
    second_run.get_ledger(13, Fidelity::Summary).unwrap();
    assert_eq!(fake.calls(), 2);
}

#[test]
fn test_offline_run_serves_only_cached_ledgers() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let online = LedgerServer::with_source(&test_config(dir.path(), &[]), Arc::new(FakeSource::new("10-12"))).unwrap();
        online.get_ledger(12, Fidelity::Summary).unwrap();
    }

    let config = Config {
        offline: true,
        ..test_config(dir.path(), &["10-13"])
    };
    let fake = Arc::new(FakeSource::new("10-12"));
    let offline = LedgerServer::with_source(&config, fake.clone()).unwrap();
    let found: Vec<u64> = offline
        .ledgers()
        .iter()
        .filter(|&n| offline.get_ledger(n, Fidelity::Summary).unwrap().is_some())
        .collect();
    assert_eq!(found, vec![12]);
    assert_eq!(fake.calls(), 0);
}

#[test]
fn test_corrupt_cache_file_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let server = LedgerServer::with_source(&test_config(dir.path(), &[]), Arc::new(FakeSource::new("10-12"))).unwrap();
    fs::write(dir.path().join("cache/summary/11.gz"), b"truncated").unwrap();

    let err = server.get_ledger(11, Fidelity::Summary).unwrap_err();
    assert!(matches!(err, LedgerToolError::CacheCorruption { .. }), "{}", err);
    assert!(!err.is_recoverable());
}

#[test]
fn test_clearing_one_fidelity_keeps_the_other() {
    let dir = tempfile::tempdir().expect("temp dir");
    let server = LedgerServer::with_source(&test_config(dir.path(), &[]), Arc::new(FakeSource::new("10-12"))).unwrap();
    for fidelity in Fidelity::ALL {
        server.get_ledger(11, fidelity).unwrap();
        server.get_ledger(12, fidelity).unwrap();
    }

    server.cache(Fidelity::Full).clear().unwrap();
    assert_eq!(server.cache(Fidelity::Full).file_count().unwrap(), 0);
    assert_eq!(server.cache(Fidelity::Summary).file_count().unwrap(), 2);
}

#[test]
fn test_conflicting_sources_are_rejected_before_opening() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config {
        database: Some(dir.path().display().to_string()),
        rippled: Some(dir.path().join("rippled")),
        ..test_config(dir.path(), &[])
    };
    match LedgerServer::new(&config) {
        Err(LedgerToolError::ConfigAmbiguity(flags)) => assert_eq!(flags, vec!["database", "rippled"]),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("two sources accepted"),
    }
}
