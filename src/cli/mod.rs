//! Command line front end.
//!
//! ```text
//! ledger-tool [FLAGS] [RANGE ...] [COMMAND [ARGS ...]]
//! ```
//!
//! Arguments before the first command word are ledger ranges ("10-19",
//! "closed", "first-last,500") selecting the working set. With no range the
//! `closed` ledger is used, with no command the ledgers are printed.

pub mod commands;

pub use commands::{run_command, CacheAction, Command};

use crate::config::{Config, Settings};
use crate::ledger::range::is_range_like;
use crate::ledger::LedgerName;
use crate::server::{Fidelity, LedgerServer, Position, SearchOptions};
use crate::utils::{init_logging, LedgerToolError, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Inspect ledger history through a cache of completed ledgers.
#[derive(Parser, Debug)]
#[clap(name = "ledger-tool", version)]
pub struct Cli {
    /// Never contact the data source; answer from the cache only
    #[clap(long)]
    pub offline: bool,

    /// Fetch and print full ledgers instead of summaries
    #[clap(long)]
    pub full: bool,

    /// Read complete ledgers from the server database (default: `database_path`
    /// from the server config). Write `--database=PATH` when ledger ranges
    /// follow; a range-like value is rejected.
    #[clap(long, num_args = 0..=1, default_missing_value = "")]
    pub database: Option<String>,

    /// Path to the ledger server binary
    #[clap(long)]
    pub rippled: Option<PathBuf>,

    /// JSON-RPC endpoint of a running server
    #[clap(long)]
    pub server: Option<String>,

    /// Server config file
    #[clap(long)]
    pub conf: Option<PathBuf>,

    /// Cache directory
    #[clap(long)]
    pub cache: Option<PathBuf>,

    /// TOML file with defaults for these flags
    #[clap(long)]
    pub settings: Option<PathBuf>,

    /// Neighbouring ledgers to include around each search match
    #[clap(long, default_value_t = 0)]
    pub window: u64,

    /// Which search matches to report
    #[clap(long, value_enum, default_value_t = Position::All)]
    pub position: Position,

    /// Validations needed for a ledger to count as complete
    #[clap(long)]
    pub validations: Option<u64>,

    /// Seconds to wait for each request to the data source
    #[clap(long)]
    pub timeout: Option<u64>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Ledger ranges, then a command: info, print, cache [list|clear],
    /// search <condition>
    pub args: Vec<String>,
}

const COMMANDS: &[&str] = &["info", "print", "cache", "search"];

fn ledger_names() -> Vec<&'static str> {
    LedgerName::ALL.iter().map(|n| n.as_str()).collect()
}

/// Split positional arguments into ledger specifications and a command.
/// Range words are checked when the working set is built, so a bad range
/// reports `MalformedRange` or `UnknownName` rather than a usage error.
pub fn parse_positionals(args: &[String]) -> Result<(Vec<String>, Command)> {
    let split = args
        .iter()
        .position(|arg| COMMANDS.contains(&arg.as_str()))
        .unwrap_or(args.len());
    let (ranges, rest) = args.split_at(split);

    let command = match rest.split_first() {
        None => Command::Print,
        Some((word, tail)) => parse_command(word, tail)
            .ok_or_else(|| LedgerToolError::Config(format!("bad arguments to '{}': '{}'", word, rest.join(" "))))?,
    };
    Ok((ranges.to_vec(), command))
}

fn parse_command(word: &str, tail: &[String]) -> Option<Command> {
    let tail: Vec<&str> = tail.iter().map(String::as_str).collect();
    match (word, tail.as_slice()) {
        ("info", []) => Some(Command::Info),
        ("print", []) => Some(Command::Print),
        ("cache", []) => Some(Command::Cache(CacheAction::Count)),
        ("cache", ["list"]) => Some(Command::Cache(CacheAction::List)),
        ("cache", ["clear"]) => Some(Command::Cache(CacheAction::Clear)),
        ("search", words) if !words.is_empty() => Some(Command::Search(words.join(" "))),
        _ => None,
    }
}

/// Defaults, then the settings file, then flags, then the server config.
pub fn build_config(cli: &Cli, ranges: Vec<String>) -> Result<Config> {
    let mut config = Config::default();
    if let Some(path) = &cli.settings {
        config.apply_settings(Settings::load(path)?);
    }
    if let Some(cache) = &cli.cache {
        config.cache_dir = cache.clone();
    }
    if cli.server.is_some() {
        config.server = cli.server.clone();
    }
    if cli.conf.is_some() {
        config.conf = cli.conf.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config.rippled = cli.rippled.clone();
    if let Some(database) = cli.database.as_deref() {
        // `--database 10-12 print` takes the range as the path
        if is_range_like(database, &ledger_names()) && !Path::new(database).exists() {
            return Err(LedgerToolError::Config(format!(
                "--database value '{}' looks like a ledger range; use --database=PATH",
                database
            )));
        }
    }
    config.database = cli.database.clone();
    config.offline = cli.offline;
    config.full = cli.full;
    config.validations = cli.validations;
    if !ranges.is_empty() {
        config.ledgers = ranges;
    }
    config.load_server_config()?;
    Ok(config)
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let (ranges, command) = parse_positionals(&cli.args)?;
    let config = build_config(&cli, ranges)?;
    debug!(?config, ?command, "starting");

    let server = LedgerServer::new(&config)?;
    let fidelity = Fidelity::from_full(config.full);
    let search = SearchOptions {
        position: cli.position,
        window: cli.window,
        fidelity,
    };
    run_command(&server, &command, fidelity, &search, out)
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)?;
    Ok(())
}
