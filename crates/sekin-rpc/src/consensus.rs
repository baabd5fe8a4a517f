use std::time::Duration;

use sekin_config::SupervisorError;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{normalize_scheme, BlockInfo, ConsensusStatus, NetInfo, BLOCK_PROBE_TIMEOUT, DEFAULT_TIMEOUT};

/// Client for the Tendermint-style consensus RPC (`/status`, `/net_info`,
/// `/block`, `/genesis`).
#[derive(Debug, Clone)]
pub struct ConsensusClient {
    base: String,
    http: reqwest::Client,
}

impl ConsensusClient {
    pub fn new(address: impl AsRef<str>, port: u16) -> Self {
        let base = format!("{}:{}", normalize_scheme(address.as_ref()).trim_end_matches('/'), port);
        ConsensusClient {
            base,
            http: reqwest::Client::new(),
        }
    }

    /// Builds a client from a base address that already carries its port
    /// (e.g. a server string derived during join planning as `ip:rpc_port`).
    pub fn from_base(base: impl AsRef<str>) -> Self {
        ConsensusClient {
            base: normalize_scheme(base.as_ref()).trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, timeout: Duration) -> Result<T, SupervisorError> {
        let url = format!("{}{}", self.base, path);
        let response = self
            .http
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| SupervisorError::NetworkUnreachable(format!("{url}: {e}")))?;
        if !response.status().is_success() {
            return Err(SupervisorError::ProtocolDecode(format!(
                "{url}: unexpected status {}",
                response.status()
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| SupervisorError::ProtocolDecode(format!("{url}: {e}")))?;
        let result = body.get("result").cloned().unwrap_or(body);
        serde_json::from_value(result).map_err(|e| SupervisorError::ProtocolDecode(format!("{url}: {e}")))
    }

    pub async fn status(&self) -> Result<ConsensusStatus, SupervisorError> {
        self.get_json("/status", DEFAULT_TIMEOUT).await
    }

    pub async fn net_info(&self) -> Result<NetInfo, SupervisorError> {
        self.get_json("/net_info", DEFAULT_TIMEOUT).await
    }

    pub async fn block(&self, height: u64) -> Result<BlockInfo, SupervisorError> {
        self.get_json(&format!("/block?height={height}"), BLOCK_PROBE_TIMEOUT).await
    }

    pub async fn genesis(&self) -> Result<Value, SupervisorError> {
        self.get_json("/genesis", crate::GENESIS_TIMEOUT).await
    }
}
