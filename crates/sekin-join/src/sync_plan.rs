use std::sync::Arc;

use sekin_config::SupervisorError;
use sekin_rpc::ConsensusClient;
use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::debug;

use crate::types::SyncPlan;

/// Minimum number of independently-confirming RPC servers required before
/// state-sync is enabled. Below this, the node falls back to full sync.
pub const QUORUM: usize = 2;

/// Derives the state-sync plan from a set of candidate RPC servers. The
/// first server to answer the trust-height query establishes the expected
/// hash (first-writer-wins); every later response is checked against it.
pub async fn derive_sync_plan(
    rpc_servers: &[String],
    snapshot_interval: u64,
    latest_height: u64,
) -> Result<SyncPlan, SupervisorError> {
    if snapshot_interval == 0 {
        return Err(SupervisorError::InvalidInput("snapshot_interval must be > 0".to_string()));
    }
    let trust_height = latest_height.saturating_sub(latest_height % snapshot_interval);
    if trust_height == 0 {
        debug!("trust height resolved to 0, skipping state-sync entirely");
        return Ok(SyncPlan {
            enabled: false,
            rpc_servers: Vec::new(),
            trust_height: 0,
            trust_hash: String::new(),
        });
    }

    let expected_hash: Arc<OnceCell<String>> = Arc::new(OnceCell::new());
    let mut join_set: JoinSet<Option<(String, String)>> = JoinSet::new();
    for server in rpc_servers {
        let server = server.clone();
        join_set.spawn(async move {
            let client = ConsensusClient::from_base(&server);
            match client.block(trust_height).await {
                Ok(block) if block.header.height == trust_height => Some((server, block.block_id.hash)),
                _ => None,
            }
        });
    }

    let mut qualifiers = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        let Ok(Some((server, hash))) = joined else { continue };
        let established = expected_hash.get_or_init(|| async { hash.clone() }).await;
        if *established == hash {
            qualifiers.push(server);
        }
    }

    let trust_hash = expected_hash.get().cloned().unwrap_or_default();
    Ok(SyncPlan {
        enabled: qualifiers.len() >= QUORUM,
        rpc_servers: if qualifiers.len() >= QUORUM { qualifiers } else { Vec::new() },
        trust_height,
        trust_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_height_rounds_down_to_snapshot_boundary() {
        let trust_height = 10_523u64.saturating_sub(10_523u64 % 200);
        assert_eq!(trust_height, 10_400);
    }

    #[tokio::test]
    async fn zero_snapshot_interval_is_rejected() {
        let result = derive_sync_plan(&[], 0, 1000).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn trust_height_below_snapshot_interval_skips_state_sync() {
        let plan = derive_sync_plan(&[], 200, 50).await.unwrap();
        assert!(!plan.enabled);
        assert_eq!(plan.trust_height, 0);
    }

    fn block_body(hash: &str, height: u64) -> String {
        format!(r#"{{"result":{{"block_id":{{"hash":"{hash}"}},"header":{{"height":{height}}}}}}}"#)
    }

    #[tokio::test]
    async fn three_of_four_servers_agreeing_enables_state_sync_with_quorum() {
        let mut agreeing = Vec::new();
        for _ in 0..3 {
            let mut server = mockito::Server::new_async().await;
            server.mock("GET", "/block?height=12000").with_status(200).with_body(block_body("H0", 12000)).create_async().await;
            agreeing.push(server);
        }
        let mut dissenting = mockito::Server::new_async().await;
        dissenting.mock("GET", "/block?height=12000").with_status(200).with_body(block_body("H1", 12000)).create_async().await;

        let rpc_servers: Vec<String> = agreeing.iter().map(|s| s.host_with_port()).chain(std::iter::once(dissenting.host_with_port())).collect();

        let plan = derive_sync_plan(&rpc_servers, 1000, 12345).await.unwrap();
        assert!(plan.enabled);
        assert_eq!(plan.trust_height, 12000);
        assert_eq!(plan.trust_hash, "H0");
        assert_eq!(plan.rpc_servers.len(), 3);
    }

    #[tokio::test]
    async fn no_two_servers_agreeing_leaves_state_sync_disabled() {
        let mut servers = Vec::new();
        for hash in ["H0", "H1", "H2", "H3"] {
            let mut server = mockito::Server::new_async().await;
            server.mock("GET", "/block?height=12000").with_status(200).with_body(block_body(hash, 12000)).create_async().await;
            servers.push(server);
        }
        let rpc_servers: Vec<String> = servers.iter().map(|s| s.host_with_port()).collect();

        let plan = derive_sync_plan(&rpc_servers, 1000, 12345).await.unwrap();
        assert!(!plan.enabled);
        assert!(plan.rpc_servers.is_empty());
    }
}
