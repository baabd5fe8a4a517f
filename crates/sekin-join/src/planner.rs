use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use sekin_config::{Seed, SupervisorError, EXTERNAL_IP_ECHO_SERVICES};
use sekin_crawler::{CrawlerPorts, HttpProber};
use sekin_rpc::{ConsensusClient, GatewayClient};
use tracing::{info, warn};

use crate::configfile::write_node_configs;
use crate::sync_plan::derive_sync_plan;
use crate::types::{JoinOptions, JoinOutcome, TargetSeed};

pub struct JoinPlanner;

impl JoinPlanner {
    /// Runs the full join sequence against `target`, writing
    /// `config.toml`/`app.toml` under `home/config`.
    pub async fn plan(target: &TargetSeed, home: &Path, opts: &JoinOptions) -> Result<JoinOutcome, SupervisorError> {
        let target_client = ConsensusClient::new(target.ip.to_string(), target.rpc_port);
        let status = target_client.status().await?;
        let chain_id = status.node_info.network.clone();
        let latest_height = status.sync_info.latest_block_height;

        // The crawled network is assumed to share the target's port
        // convention, not this supervisor's own local defaults.
        let crawler_ports = CrawlerPorts {
            gateway: target.gateway_port,
            rpc: target.rpc_port,
            p2p: target.p2p_port,
        };
        let prober = Arc::new(HttpProber { ports: crawler_ports });
        let (pool, _blacklist) = sekin_crawler::crawl(target.ip, prober, opts.crawl_depth, false, opts.crawl_concurrency).await?;

        let mut seed_set: BTreeSet<String> = BTreeSet::new();
        for node in pool.values() {
            let gateway = GatewayClient::new(node.ip.to_string(), target.gateway_port);
            match gateway.peer_list().await {
                Ok(lines) => seed_set.extend(lines),
                Err(e) => warn!(ip = %node.ip, error = %e, "failed to fetch peer list from crawled node"),
            }
        }

        let seeds: Vec<String> = if seed_set.is_empty() {
            info!("crawl produced no seeds, falling back to the join target itself");
            vec![format!("tcp://{}@{}:{}", target.node_id, target.ip, target.p2p_port)]
        } else {
            seed_set.into_iter().collect()
        };

        let rpc_servers: Vec<String> = seeds
            .iter()
            .filter_map(|s| s.parse::<Seed>().ok())
            .map(|seed| seed.with_port(target.rpc_port).to_string())
            .map(|s| s.trim_start_matches("tcp://").rsplit_once('@').map(|(_, addr)| addr.to_string()).unwrap_or(s))
            .collect();

        let sync_plan = derive_sync_plan(&rpc_servers, opts.snapshot_interval, latest_height).await?;

        let external_address = resolve_external_address().await?;

        write_node_configs(home, &chain_id, &seeds, &sync_plan, opts).await?;

        Ok(JoinOutcome {
            chain_id,
            node_id: status.node_info.id,
            seeds,
            sync_plan,
            external_address,
        })
    }
}

async fn resolve_external_address() -> Result<String, SupervisorError> {
    let mut last_err = None;
    for service in EXTERNAL_IP_ECHO_SERVICES {
        match GatewayClient::get_text(service, std::time::Duration::from_secs(5)).await {
            Ok(address) if !address.is_empty() => return Ok(address),
            Ok(_) => continue,
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| SupervisorError::NetworkUnreachable("no external IP echo service reachable".to_string())))
}
