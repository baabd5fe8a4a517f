//! Shared constants, settings layering, and the top-level error taxonomy
//! used across every `sekin-*` crate.

mod error;
mod logging;
mod seed;
mod settings;
mod version;

pub use error::SupervisorError;
pub use logging::init_tracing;
pub use seed::Seed;
pub use settings::Settings;
pub use version::{Version, VersionOrdering};

/// Default TCP ports for every surface the supervisor talks to or exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ports {
    pub rpc: u16,
    pub p2p: u16,
    pub grpc: u16,
    pub gateway: u16,
    pub supervisor: u16,
    pub sekai_caller: u16,
    pub interx_caller: u16,
}

impl Default for Ports {
    fn default() -> Self {
        Ports {
            rpc: 26657,
            p2p: 26656,
            grpc: 9090,
            gateway: 11000,
            supervisor: 8282,
            sekai_caller: 8080,
            interx_caller: 8081,
        }
    }
}

/// Well-known in-cluster hostnames for the two supervised services.
pub struct NodeAddresses;

impl NodeAddresses {
    pub const SEKAI: &'static str = "sekai.local";
    pub const INTERX: &'static str = "interx.local";
}

/// Container identity and filesystem layout, mirrored from the upstream
/// compose manifest's service names and volume mounts.
pub struct Paths;

impl Paths {
    pub const SEKAI_CONTAINER: &'static str = "sekin-sekai-1";
    pub const INTERX_CONTAINER: &'static str = "sekin-interx-1";
    pub const SEKAI_CONTAINER_HOME: &'static str = "/sekai";
    pub const SEKAI_CONTAINER_CONFIG: &'static str = "/sekai/config";
    pub const SEKAI_CONTAINER_DATA: &'static str = "/sekai/data";
    pub const INTERX_CONTAINER_HOME: &'static str = "/interx";
    pub const SEKAI_IMAGE: &'static str = "ghcr.io/kiracore/sekin/sekai";
    pub const INTERX_IMAGE: &'static str = "ghcr.io/kiracore/sekin/interx";
    pub const UPGRADE_PLAN_FILE: &'static str = "upgrade_plan.json";
}

/// Echo services tried in order when resolving this node's externally
/// visible address.
pub const EXTERNAL_IP_ECHO_SERVICES: &[&str] = &[
    "https://ifconfig.me",
    "https://api.ipify.org",
    "https://checkip.amazonaws.com",
];

/// Versions of the three components the supervisor tracks and compares
/// against upstream during the self-update check.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Versions {
    pub sekai: Version,
    pub interx: Version,
    pub supervisor: Version,
}
