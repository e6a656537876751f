//! Subprocess-backed source: runs the ledger server binary as a client
//! (`rippled [--conf FILE] ledger <id> [full]`) and reads its JSON reply.

use crate::config::Config;
use crate::ledger::{LedgerId, LedgerName, RangeSet};
use crate::source::{complete_from_info, error_code, error_reason, exit_reason, ledger_from_result, ledger_index, DataSource};
use crate::utils::{LedgerToolError, Result, METRICS};
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Runs one client command at a time against the server binary, each under
/// a timeout. The child is killed when the timeout fires.
pub struct RippledCommand {
    program: PathBuf,
    conf: Option<PathBuf>,
    timeout: Duration,
    runtime: Runtime,
}

impl RippledCommand {
    pub fn new(config: &Config) -> Result<Self> {
        let program = config.program().to_path_buf();
        // bare names are looked up on PATH at spawn time
        if program.components().count() > 1 && !program.exists() {
            return Err(LedgerToolError::Config(format!(
                "no rippled found at {}",
                program.display()
            )));
        }
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            program,
            conf: config.conf.clone(),
            timeout: config.timeout,
            runtime,
        })
    }

    /// Run the binary with `args` and return the `result` object of its reply.
    pub fn command(&self, args: &[&str]) -> Result<Value> {
        let target = args.join(" ");
        METRICS.inc_counter("source.request");
        debug!(program = %self.program.display(), command = %target, "running");

        let mut cmd = Command::new(&self.program);
        if let Some(conf) = &self.conf {
            cmd.arg("--conf").arg(conf);
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout = self.timeout;
        let output = self
            .runtime
            .block_on(async move { tokio::time::timeout(timeout, cmd.output()).await });
        let output = match output {
            Err(_) => {
                METRICS.inc_counter("source.error");
                return Err(LedgerToolError::backend(
                    target,
                    format!("timed out after {:?}", timeout),
                ));
            }
            Ok(Err(e)) => {
                METRICS.inc_counter("source.error");
                return Err(LedgerToolError::backend(target, format!("cannot run {}: {}", self.program.display(), e)));
            }
            Ok(Ok(output)) => output,
        };
        if !output.status.success() {
            METRICS.inc_counter("source.error");
            debug!(stderr = %String::from_utf8_lossy(&output.stderr), "command failed");
            return Err(LedgerToolError::backend(target, exit_reason(output.status.code())));
        }
        parse_reply(&output.stdout).map_err(|reason| {
            METRICS.inc_counter("source.error");
            LedgerToolError::backend(target, reason)
        })
    }

    pub fn get_ledger(&self, id: LedgerId, full: bool) -> Result<Value> {
        let id_arg = id.to_string();
        let mut args = vec!["ledger", id_arg.as_str()];
        if full {
            args.push("full");
        }
        let result = self.command(&args)?;
        ledger_from_result(id, &result)
    }
}

// The client may print banner lines before the JSON document.
fn parse_reply(stdout: &[u8]) -> std::result::Result<Value, String> {
    let text = String::from_utf8_lossy(stdout);
    let start = text
        .find('{')
        .ok_or_else(|| "no JSON in server reply".to_string())?;
    let reply: Value = serde_json::from_str(&text[start..])
        .map_err(|e| format!("malformed server reply: {}", e))?;
    match reply.get("result") {
        Some(result) => Ok(result.clone()),
        None => Err(error_reason(error_code(&reply))),
    }
}

/// Source backed entirely by the server binary. Completeness comes from one
/// `server_info` call at construction.
pub struct RippledReader {
    client: RippledCommand,
    info: Value,
    complete: RangeSet,
}

impl RippledReader {
    pub fn open(config: &Config) -> Result<Self> {
        let client = RippledCommand::new(config)?;
        let result = client.command(&["server_info"])?;
        let info = result
            .get("info")
            .cloned()
            .ok_or_else(|| LedgerToolError::backend("server_info", error_reason(error_code(&result))))?;
        let complete = complete_from_info(&info)?;
        Ok(Self { client, info, complete })
    }
}

impl DataSource for RippledReader {
    fn name(&self) -> &'static str {
        "rippled"
    }

    fn complete(&self) -> &RangeSet {
        &self.complete
    }

    fn info(&self) -> Value {
        self.info.clone()
    }

    fn resolve_name(&self, name: LedgerName) -> Result<Option<u64>> {
        if !name.is_server_side() {
            return Ok(None);
        }
        let ledger = self.client.get_ledger(name.into(), false)?;
        Ok(ledger_index(&ledger))
    }

    fn get_ledger(&self, id: LedgerId, full: bool) -> Result<Value> {
        self.client.get_ledger(id, full)
    }
}
