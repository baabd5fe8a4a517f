use std::net::IpAddr;
use std::str::FromStr;

use async_trait::async_trait;
use sekin_config::SupervisorError;
use sekin_rpc::{ConsensusClient, GatewayClient, RawPeer};

use crate::types::{CrawlerPorts, Node, PeerAddress, ProbeError};

/// A single node's probe: gateway-first, consensus RPC as fallback. Kept as
/// a trait so tests can supply a scripted fixture instead of real HTTP.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, ip: IpAddr) -> Result<Node, Vec<ProbeError>>;
}

pub struct HttpProber {
    pub ports: CrawlerPorts,
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, ip: IpAddr) -> Result<Node, Vec<ProbeError>> {
        let mut errors = Vec::new();

        let gateway = GatewayClient::new(ip.to_string(), self.ports.gateway);
        match tokio::try_join!(gateway.status(), gateway.net_info()) {
            Ok((status, net_info)) => {
                return Ok(build_node(ip, status.node_info.id, net_info.peers, self.ports.p2p));
            }
            Err(e) => errors.push(classify(&e)),
        }

        let consensus = ConsensusClient::new(ip.to_string(), self.ports.rpc);
        match tokio::try_join!(consensus.status(), consensus.net_info()) {
            Ok((status, net_info)) => {
                Ok(build_node(ip, status.node_info.id, net_info.peers, self.ports.p2p))
            }
            Err(e) => {
                errors.push(classify(&e));
                Err(errors)
            }
        }
    }
}

fn classify(e: &SupervisorError) -> ProbeError {
    match e {
        SupervisorError::Timeout(_) => ProbeError::Timeout,
        SupervisorError::NetworkUnreachable(_) => ProbeError::ConnectionRefused,
        SupervisorError::ProtocolDecode(msg) if msg.contains("status") => {
            ProbeError::NonSuccessStatus(0)
        }
        _ => ProbeError::ParseError,
    }
}

/// Converts the raw peer list into [`PeerAddress`] entries, emitting both
/// the socket a peer was observed on and its separately-announced listen
/// address when the two differ (NAT reconciliation).
fn build_node(ip: IpAddr, id: String, raw_peers: Vec<RawPeer>, default_port: u16) -> Node {
    let mut peers = Vec::with_capacity(raw_peers.len() * 2);
    for peer in &raw_peers {
        if let Ok(remote_ip) = IpAddr::from_str(&peer.remote_ip) {
            peers.push(PeerAddress {
                ip: remote_ip,
                port: default_port,
                node_id: Some(peer.node_id.clone()),
            });
        }
        if let Some((listen_ip, listen_port)) = split_listen_addr(&peer.listen_addr) {
            if peer.remote_ip != listen_ip {
                if let Ok(ip_addr) = IpAddr::from_str(&listen_ip) {
                    peers.push(PeerAddress {
                        ip: ip_addr,
                        port: listen_port.unwrap_or(default_port),
                        node_id: Some(peer.node_id.clone()),
                    });
                }
            }
        }
    }
    Node {
        ip,
        id,
        declared_peer_count: raw_peers.len(),
        peers,
    }
}

fn split_listen_addr(addr: &str) -> Option<(String, Option<u16>)> {
    let stripped = addr.rsplit_once("://").map(|(_, rest)| rest).unwrap_or(addr);
    match stripped.rsplit_once(':') {
        Some((host, port)) => Some((host.to_string(), port.parse().ok())),
        None => Some((stripped.to_string(), None)),
    }
}
