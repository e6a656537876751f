//! JSON-RPC source: talks to a running server over HTTP
//! (`server_info` and `ledger` methods).

use crate::config::Config;
use crate::ledger::{LedgerId, LedgerName, RangeSet};
use crate::source::{complete_from_info, error_code, error_reason, ledger_from_result, ledger_index, DataSource};
use crate::utils::{LedgerToolError, Result, METRICS};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde_json::{json, Value};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

pub struct JsonRpcReader {
    url: String,
    client: HttpClient,
    runtime: Runtime,
    info: Value,
    complete: RangeSet,
}

impl JsonRpcReader {
    pub fn open(config: &Config) -> Result<Self> {
        let url = config
            .server
            .clone()
            .ok_or_else(|| LedgerToolError::Config("no server URL given".into()))?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let client = {
            let _guard = runtime.enter();
            HttpClientBuilder::default()
                .request_timeout(config.timeout)
                .build(&url)
                .map_err(|e| LedgerToolError::Config(format!("bad server URL {}: {}", url, e)))?
        };
        let mut reader = Self {
            url,
            client,
            runtime,
            info: Value::Null,
            complete: RangeSet::new(),
        };

        let result = reader.request("server_info", json!({}))?;
        reader.info = result
            .get("info")
            .cloned()
            .ok_or_else(|| LedgerToolError::backend("server_info", error_reason(error_code(&result))))?;
        reader.complete = complete_from_info(&reader.info)?;
        Ok(reader)
    }

    fn request(&self, method: &str, params: Value) -> Result<Value> {
        METRICS.inc_counter("source.request");
        debug!(url = %self.url, method, %params, "json-rpc request");
        let call = self.client.request::<Value, _>(method, rpc_params![params]);
        self.runtime.block_on(call).map_err(|e| {
            METRICS.inc_counter("source.error");
            LedgerToolError::backend(format!("{} {}", self.url, method), client_error_reason(&e))
        })
    }
}

fn client_error_reason(e: &ClientError) -> String {
    match e {
        ClientError::Call(obj) => error_reason(obj.message()),
        ClientError::RequestTimeout => "request timed out".to_string(),
        other => other.to_string(),
    }
}

/// Parameters of the `ledger` method.
pub(crate) fn ledger_params(id: LedgerId, full: bool) -> Value {
    let index = match id {
        LedgerId::Number(n) => json!(n),
        LedgerId::Name(name) => json!(name.as_str()),
    };
    json!({ "ledger_index": index, "full": full })
}

impl DataSource for JsonRpcReader {
    fn name(&self) -> &'static str {
        "server"
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
        Ok(ledger_index(&self.get_ledger(name.into(), false)?))
    }

    fn get_ledger(&self, id: LedgerId, full: bool) -> Result<Value> {
        let result = self
            .request("ledger", ledger_params(id, full))
            .map_err(|e| match e {
                LedgerToolError::Backend { reason, .. } => {
                    LedgerToolError::backend(format!("ledger {}", id), reason)
                }
                other => other,
            })?;
        ledger_from_result(id, &result)
    }
}
