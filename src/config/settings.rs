use crate::utils::{LedgerToolError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional TOML file with defaults for the command line flags.
///
/// ```toml
/// cache = "/var/cache/ledger-tool"
/// rippled = "/opt/ripple/bin/rippled"
/// conf = "/etc/opt/ripple/rippled.cfg"
/// timeout_secs = 60
/// compress = false
/// ```
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub cache: Option<PathBuf>,
    /// Ledger server binary used for subprocess requests.
    pub rippled: Option<PathBuf>,
    pub conf: Option<PathBuf>,
    /// JSON-RPC endpoint; selects the RPC data source like `--server`.
    pub server: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Gzip cache entries (default). `false` stores plain `.json` files.
    pub compress: Option<bool>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            LedgerToolError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&data)
            .map_err(|e| LedgerToolError::Config(format!("{}: {}", path.display(), e)))
    }
}
