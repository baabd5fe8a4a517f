use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// The supervisor's own `:8282` surface only ever reaches `join`/`start`/
/// `status` (§6). Unlike a string-keyed registry, an unknown `command`
/// value fails to deserialize at all rather than reaching a runtime
/// "not registered" branch.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Command {
    Join(JoinArgs),
    Start,
    Status,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinArgs {
    pub target_ip: IpAddr,
    pub target_node_id: String,
    #[serde(default)]
    pub target_p2p_port: Option<u16>,
    #[serde(default)]
    pub snapshot_interval: Option<u64>,
    #[serde(default)]
    pub crawl_depth: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteResponse {
    pub status: Status,
    pub message: String,
}

impl ExecuteResponse {
    pub fn success(message: impl Into<String>) -> Self {
        ExecuteResponse { status: Status::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ExecuteResponse { status: Status::Error, message: message.into() }
    }
}
