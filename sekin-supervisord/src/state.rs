use std::path::PathBuf;
use std::sync::Arc;

use sekin_config::{Paths, Ports, Versions};
use sekin_container::ContainerDriver;
use sekin_rpc::{ConsensusClient, GatewayClient};

/// Shared handle every route handler receives through `axum::extract::State`.
#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<dyn ContainerDriver>,
    pub versions: Versions,
    pub ports: Ports,
    pub home: PathBuf,
    pub compose_path: PathBuf,
    pub chain_id: String,
}

impl AppState {
    pub fn sekai_rpc(&self) -> ConsensusClient {
        ConsensusClient::new(sekin_config::NodeAddresses::SEKAI, self.ports.rpc)
    }

    pub fn interx_gateway(&self) -> GatewayClient {
        GatewayClient::new(sekin_config::NodeAddresses::INTERX, self.ports.gateway)
    }

    pub fn sekai_caller(&self) -> String {
        format!("http://{}:{}", sekin_config::NodeAddresses::SEKAI, self.ports.sekai_caller)
    }

    pub fn interx_caller(&self) -> String {
        format!("http://{}:{}", sekin_config::NodeAddresses::INTERX, self.ports.interx_caller)
    }

    pub fn container_for(&self, name: &str) -> Option<&'static str> {
        match name {
            "sekai" => Some(Paths::SEKAI_CONTAINER),
            "interx" => Some(Paths::INTERX_CONTAINER),
            "supervisor" => None,
            _ => None,
        }
    }
}
