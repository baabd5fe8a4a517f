//! Typed clients for the two upstream protocols the supervisor consumes:
//! the Tendermint-style consensus RPC and the gateway's HTTP API.

mod consensus;
mod gateway;
mod types;

pub use consensus::ConsensusClient;
pub use gateway::GatewayClient;
pub use types::*;

use std::time::Duration;

/// Default per-call timeout for status/net-info style probes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Tighter timeout for the block-height probes used during trust-hash
/// quorum derivation, where a dozen servers may be queried concurrently.
pub const BLOCK_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// Generous timeout for genesis downloads, which can be tens of megabytes.
pub const GENESIS_TIMEOUT: Duration = Duration::from_secs(60);

/// Prepends `http://` to an address that doesn't already declare a scheme.
pub fn normalize_scheme(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_scheme_adds_http_when_missing() {
        assert_eq!(normalize_scheme("1.2.3.4:26657"), "http://1.2.3.4:26657");
        assert_eq!(normalize_scheme("https://x"), "https://x");
    }
}
