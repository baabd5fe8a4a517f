use std::time::Duration;

use sekin_config::SupervisorError;
use sekin_rpc::ConsensusClient;

/// Samples the chain height every 5 seconds until `window` elapses,
/// returning `true` as soon as the height strictly increases.
pub async fn alive(rpc: &ConsensusClient, window: Duration) -> Result<bool, SupervisorError> {
    let deadline = tokio::time::Instant::now() + window;
    let baseline = rpc.status().await?.sync_info.latest_block_height;
    loop {
        if tokio::time::Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(Duration::from_secs(5).min(deadline.saturating_duration_since(tokio::time::Instant::now()))).await;
        let height = rpc.status().await?.sync_info.latest_block_height;
        if height > baseline {
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn status_body(height: u64) -> String {
        format!(
            r#"{{"result":{{"node_info":{{"id":"x","network":"testnet-1","listen_addr":"0.0.0.0:26656"}},"sync_info":{{"latest_block_height":{height},"catching_up":false}}}}}}"#
        )
    }

    #[tokio::test]
    async fn live_consensus_reports_true_once_height_advances() {
        let mut server = mockito::Server::new_async().await;
        let calls = Arc::new(Mutex::new(0u64));
        server
            .mock("GET", "/status")
            .with_status(200)
            .with_body_from_request(move |_req| {
                let mut n = calls.lock().unwrap();
                let body = status_body(100 + *n);
                *n += 1;
                body.into_bytes()
            })
            .create_async()
            .await;

        let rpc = ConsensusClient::from_base(server.url());
        assert!(alive(&rpc, Duration::from_secs(2)).await.unwrap());
    }

    #[tokio::test]
    async fn halted_consensus_reports_false_once_window_elapses() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/status").with_status(200).with_body(status_body(100)).create_async().await;

        let rpc = ConsensusClient::from_base(server.url());
        assert!(!alive(&rpc, Duration::from_secs(2)).await.unwrap());
    }
}
