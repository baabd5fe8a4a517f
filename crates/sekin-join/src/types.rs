use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct TargetSeed {
    pub ip: IpAddr,
    pub node_id: String,
    pub rpc_port: u16,
    pub p2p_port: u16,
    pub gateway_port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PruningProfile {
    Default,
    Nothing,
    Everything,
    Custom { keep_recent: u64, interval: u64, keep_every: u64 },
}

#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub enabled: bool,
    pub rpc_servers: Vec<String>,
    pub trust_height: u64,
    pub trust_hash: String,
}

#[derive(Debug, Clone)]
pub struct JoinOptions {
    pub pruning: PruningProfile,
    pub snapshot_interval: u64,
    pub crawl_depth: u32,
    pub crawl_concurrency: usize,
    pub rpc_port: u16,
    pub gateway_port: u16,
    pub p2p_port: u16,
    pub grpc_port: u16,
}

impl Default for JoinOptions {
    fn default() -> Self {
        let ports = sekin_config::Ports::default();
        JoinOptions {
            pruning: PruningProfile::Default,
            snapshot_interval: 200,
            crawl_depth: 3,
            crawl_concurrency: sekin_crawler::DEFAULT_CONCURRENCY,
            rpc_port: ports.rpc,
            gateway_port: ports.gateway,
            p2p_port: ports.p2p,
            grpc_port: ports.grpc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub chain_id: String,
    pub node_id: String,
    pub seeds: Vec<String>,
    pub sync_plan: SyncPlan,
    pub external_address: String,
}
