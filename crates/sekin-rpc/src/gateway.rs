use std::time::Duration;

use sekin_config::SupervisorError;
use serde::de::DeserializeOwned;

use crate::{normalize_scheme, GatewayStatus, NetInfo, PlanEnvelope, UpgradePlan, DEFAULT_TIMEOUT};

/// Client for the gateway's HTTP API (`/api/status`, `/api/netinfo`,
/// peer listing, and upgrade plan endpoints).
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base: String,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(address: impl AsRef<str>, port: u16) -> Self {
        let base = format!("{}:{}", normalize_scheme(address.as_ref()).trim_end_matches('/'), port);
        GatewayClient {
            base,
            http: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SupervisorError> {
        let url = format!("{}{}", self.base, path);
        let response = self
            .http
            .get(&url)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(|e| SupervisorError::NetworkUnreachable(format!("{url}: {e}")))?;
        if !response.status().is_success() {
            return Err(SupervisorError::ProtocolDecode(format!(
                "{url}: unexpected status {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| SupervisorError::ProtocolDecode(format!("{url}: {e}")))
    }

    pub async fn status(&self) -> Result<GatewayStatus, SupervisorError> {
        self.get_json("/api/status").await
    }

    pub async fn net_info(&self) -> Result<NetInfo, SupervisorError> {
        self.get_json("/api/netinfo").await
    }

    /// Plain-text peer list, one `tcp://nodeID@ip:port` seed per line.
    pub async fn peer_list(&self) -> Result<Vec<String>, SupervisorError> {
        let url = format!("{}/api/pub_p2p_list?peers_only=true", self.base);
        let response = self
            .http
            .get(&url)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(|e| SupervisorError::NetworkUnreachable(format!("{url}: {e}")))?;
        if !response.status().is_success() {
            return Err(SupervisorError::ProtocolDecode(format!(
                "{url}: unexpected status {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| SupervisorError::ProtocolDecode(format!("{url}: {e}")))?;
        Ok(body.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
    }

    pub async fn current_plan(&self) -> Result<Option<UpgradePlan>, SupervisorError> {
        self.plan("/api/kira/upgrade/current_plan").await
    }

    pub async fn next_plan(&self) -> Result<Option<UpgradePlan>, SupervisorError> {
        self.plan("/api/kira/upgrade/next_plan").await
    }

    async fn plan(&self, path: &str) -> Result<Option<UpgradePlan>, SupervisorError> {
        let envelope: PlanEnvelope = self.get_json(path).await?;
        Ok(envelope.plan.filter(|p| !p.is_none()))
    }

    /// Generic GET used for the external-IP echo services, which return a
    /// bare IP as plain text rather than JSON.
    pub async fn get_text(url: &str, timeout: Duration) -> Result<String, SupervisorError> {
        let response = reqwest::Client::new()
            .get(url)
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
        response
            .text()
            .await
            .map(|s| s.trim().to_string())
            .map_err(|e| SupervisorError::ProtocolDecode(format!("{url}: {e}")))
    }
}
