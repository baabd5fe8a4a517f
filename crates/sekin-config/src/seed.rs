use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SupervisorError;

/// A canonical `tcp://<node-id>@<ip>:<port>` seed string. Once constructed
/// it is guaranteed well-formed; there is no way to hold a malformed
/// `Seed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Seed {
    node_id: String,
    ip: Ipv4Addr,
    port: u16,
}

impl Seed {
    pub fn new(node_id: impl Into<String>, ip: Ipv4Addr, port: u16) -> Result<Self, SupervisorError> {
        let node_id = node_id.into();
        if node_id.len() != 40 || !node_id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SupervisorError::InvalidInput(format!(
                "seed node id must be 40 hex characters, got {node_id:?}"
            )));
        }
        Ok(Seed {
            node_id: node_id.to_ascii_lowercase(),
            ip,
            port,
        })
    }

    pub fn with_port(&self, port: u16) -> Seed {
        Seed {
            node_id: self.node_id.clone(),
            ip: self.ip,
            port,
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcp://{}@{}:{}", self.node_id, self.ip, self.port)
    }
}

impl FromStr for Seed {
    type Err = SupervisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("tcp://")
            .ok_or_else(|| SupervisorError::InvalidInput(format!("seed missing tcp:// scheme: {s}")))?;
        let (node_id, host_port) = rest
            .split_once('@')
            .ok_or_else(|| SupervisorError::InvalidInput(format!("seed missing @: {s}")))?;
        let (ip, port) = host_port
            .split_once(':')
            .ok_or_else(|| SupervisorError::InvalidInput(format!("seed missing port: {s}")))?;
        let ip: Ipv4Addr = ip
            .parse()
            .map_err(|_| SupervisorError::InvalidInput(format!("seed has invalid ip: {s}")))?;
        let port: u16 = port
            .parse()
            .map_err(|_| SupervisorError::InvalidInput(format!("seed has invalid port: {s}")))?;
        Seed::new(node_id, ip, port)
    }
}

impl TryFrom<String> for Seed {
    type Error = SupervisorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Seed> for String {
    fn from(value: Seed) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_canonical_form() {
        let node_id = "a".repeat(40);
        let seed: Seed = format!("tcp://{node_id}@10.0.0.1:26656").parse().unwrap();
        assert_eq!(seed.to_string(), format!("tcp://{node_id}@10.0.0.1:26656"));
    }

    #[test]
    fn rejects_short_node_id() {
        let result: Result<Seed, _> = "tcp://abc@10.0.0.1:26656".parse();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_scheme() {
        let node_id = "b".repeat(40);
        let result: Result<Seed, _> = format!("{node_id}@10.0.0.1:26656").parse();
        assert!(result.is_err());
    }

    #[test]
    fn with_port_rewrites_only_port() {
        let node_id = "c".repeat(40);
        let seed: Seed = format!("tcp://{node_id}@10.0.0.1:26656").parse().unwrap();
        let rpc_seed = seed.with_port(26657);
        assert_eq!(rpc_seed.to_string(), format!("tcp://{node_id}@10.0.0.1:26657"));
    }
}
