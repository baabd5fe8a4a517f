use serde::{Deserialize, Serialize};

/// A peer as reported by either the consensus `/net_info` or the gateway's
/// netinfo equivalent, identified by its advertised listen address rather
/// than the socket it was seen on.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPeer {
    pub node_id: String,
    pub remote_ip: String,
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetInfo {
    pub n_peers: usize,
    pub peers: Vec<RawPeer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncInfo {
    pub latest_block_height: u64,
    pub catching_up: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub network: String,
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusStatus {
    pub node_info: NodeInfo,
    pub sync_info: SyncInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockId {
    pub hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
    pub height: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockInfo {
    pub block_id: BlockId,
    pub header: BlockHeader,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayAppInfo {
    pub version: String,
    pub infra: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayStatus {
    pub node_info: NodeInfo,
    pub sync_info: SyncInfo,
}

/// A single resource named in an upgrade plan (the binary/image whose
/// version must change).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeResource {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub url: String,
}

/// An upgrade plan as returned by the gateway's current/next plan
/// endpoints. Fields present in the upstream schema but not acted on by
/// any classification logic here (`name`, `max_enrolment_duration`,
/// `processed_no_vote_validators`, `rollback_checksum`) are kept as
/// passthrough so deserializing a real response never fails on them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradePlan {
    #[serde(default)]
    pub proposal_id: String,
    #[serde(default)]
    pub instate_upgrade: bool,
    #[serde(default)]
    pub skip_handler: bool,
    #[serde(default)]
    pub reboot_required: bool,
    #[serde(default)]
    pub new_chain_id: String,
    #[serde(default)]
    pub old_chain_id: String,
    #[serde(default)]
    pub upgrade_time: String,
    #[serde(default)]
    pub resources: Vec<UpgradeResource>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub max_enrolment_duration: String,
    #[serde(default)]
    pub processed_no_vote_validators: bool,
    #[serde(default)]
    pub rollback_checksum: String,
}

impl UpgradePlan {
    /// A plan whose `proposal_id` is empty is "no plan at all" and is
    /// treated as a silent no-op, distinct from a plan that exists but has
    /// an empty `resources` list (which is always surfaced as an error).
    pub fn is_none(&self) -> bool {
        self.proposal_id.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanEnvelope {
    pub plan: Option<UpgradePlan>,
}
