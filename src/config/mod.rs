//! Run configuration.
//!
//! `Config` is built once from the command line (plus an optional settings
//! file) and handed by reference to the data source, the caches and the
//! `LedgerServer`. Nothing here is global.

pub mod rippled_cfg;
pub mod settings;

pub use rippled_cfg::{ConfigValue, RippledConfig};
pub use settings::Settings;

use crate::storage::Codec;
use crate::utils::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROGRAM: &str = "rippled";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LEDGERS: &str = "closed";

#[derive(Debug, Clone)]
pub struct Config {
    /// `--rippled`: explicitly selects the subprocess source.
    pub rippled: Option<PathBuf>,
    /// `--database [PATH]`: selects the database source. An empty string
    /// means "use `database_path` from the server config".
    pub database: Option<String>,
    /// `--server URL`: selects the JSON-RPC source.
    pub server: Option<String>,
    /// Ledger server binary when `--rippled` is not given.
    pub program: PathBuf,
    /// Server config file passed through to the binary as `--conf`.
    pub conf: Option<PathBuf>,
    pub server_config: RippledConfig,
    pub cache_dir: PathBuf,
    pub offline: bool,
    pub full: bool,
    /// `--validations`: overrides `validation_quorum`.
    pub validations: Option<u64>,
    pub timeout: Duration,
    /// Encoding of cache entries on disk.
    pub codec: Codec,
    /// Requested ledger specifications, e.g. `["10-19", "closed"]`.
    pub ledgers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rippled: None,
            database: None,
            server: None,
            program: PathBuf::from(DEFAULT_PROGRAM),
            conf: None,
            server_config: RippledConfig::default(),
            cache_dir: default_cache_dir(),
            offline: false,
            full: false,
            validations: None,
            timeout: DEFAULT_TIMEOUT,
            codec: Codec::default(),
            ledgers: vec![DEFAULT_LEDGERS.to_string()],
        }
    }
}

impl Config {
    /// Binary to run for subprocess requests.
    pub fn program(&self) -> &Path {
        self.rippled.as_deref().unwrap_or(&self.program)
    }

    /// Overlay values from a settings file. Command line flags are applied
    /// afterwards and take precedence.
    pub fn apply_settings(&mut self, settings: Settings) {
        if let Some(cache) = settings.cache {
            self.cache_dir = cache;
        }
        if let Some(program) = settings.rippled {
            self.program = program;
        }
        if settings.conf.is_some() {
            self.conf = settings.conf;
        }
        if settings.server.is_some() {
            self.server = settings.server;
        }
        if let Some(secs) = settings.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(compress) = settings.compress {
            self.codec = if compress { Codec::Gzip } else { Codec::Plain };
        }
    }

    /// Read the server config named by `conf`, if any.
    pub fn load_server_config(&mut self) -> Result<()> {
        if let Some(path) = &self.conf {
            self.server_config = RippledConfig::load(path)?;
        }
        Ok(())
    }
}

/// `$HOME/.ledger-tool/cache`, or `./ledger-cache` without a home directory.
pub fn default_cache_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".ledger-tool").join("cache"),
        None => PathBuf::from("ledger-cache"),
    }
}
