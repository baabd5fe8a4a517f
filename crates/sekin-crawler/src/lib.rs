//! Bounded-concurrency BFS over the sekai/interx peer graph: gateway-first
//! probing with consensus-RPC fallback, NAT-aware peer expansion, and a
//! single lock protecting the three disjoint pool/blacklist/in-flight maps.

mod crawl;
mod prober;
mod types;

pub use crawl::{crawl, DEFAULT_CONCURRENCY};
pub use prober::{HttpProber, Prober};
pub use types::{BlacklistedNode, CrawlerPorts, Node, PeerAddress, ProbeError};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::{Arc, Mutex};

    fn ip(n: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, n))
    }

    struct FixtureProber {
        graph: HashMap<IpAddr, Vec<IpAddr>>,
        unreachable: Vec<IpAddr>,
        probe_counts: Mutex<HashMap<IpAddr, usize>>,
    }

    #[async_trait]
    impl Prober for FixtureProber {
        async fn probe(&self, addr: IpAddr) -> Result<Node, Vec<ProbeError>> {
            *self.probe_counts.lock().unwrap().entry(addr).or_insert(0) += 1;
            if self.unreachable.contains(&addr) {
                return Err(vec![ProbeError::ConnectionRefused]);
            }
            let peers = self
                .graph
                .get(&addr)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|p| PeerAddress { ip: p, port: 26656, node_id: None })
                .collect();
            Ok(Node { ip: addr, id: addr.to_string(), declared_peer_count: 0, peers })
        }
    }

    #[tokio::test]
    async fn partitions_pool_and_blacklist_disjointly() {
        let mut graph = HashMap::new();
        graph.insert(ip(1), vec![ip(2), ip(3)]);
        graph.insert(ip(2), vec![ip(1), ip(4)]);
        graph.insert(ip(3), vec![ip(1)]);
        graph.insert(ip(4), vec![ip(2)]);

        let prober = Arc::new(FixtureProber {
            graph,
            unreachable: vec![ip(5)],
            probe_counts: Mutex::new(HashMap::new()),
        });

        let (pool, blacklist) = crawl(ip(1), prober.clone(), 5, false, 4).await.unwrap();

        assert!(pool.contains_key(&ip(1)));
        assert!(pool.contains_key(&ip(4)));
        assert!(blacklist.is_empty());
        for k in pool.keys() {
            assert!(!blacklist.contains_key(k));
        }

        let counts = prober.probe_counts.lock().unwrap();
        for (addr, count) in counts.iter() {
            assert_eq!(*count, 1, "ip {addr} probed more than once");
        }
    }

    #[tokio::test]
    async fn unreachable_peer_lands_in_blacklist_not_pool() {
        let mut graph = HashMap::new();
        graph.insert(ip(1), vec![ip(5)]);

        let prober = Arc::new(FixtureProber {
            graph,
            unreachable: vec![ip(5)],
            probe_counts: Mutex::new(HashMap::new()),
        });

        let (pool, blacklist) = crawl(ip(1), prober, 3, false, 4).await.unwrap();
        assert!(pool.contains_key(&ip(1)));
        assert!(!pool.contains_key(&ip(5)));
        assert!(blacklist.contains_key(&ip(5)));
    }

    #[tokio::test]
    async fn seed_unreachable_fails_the_whole_crawl() {
        let prober = Arc::new(FixtureProber {
            graph: HashMap::new(),
            unreachable: vec![ip(1)],
            probe_counts: Mutex::new(HashMap::new()),
        });
        let result = crawl(ip(1), prober, 3, false, 4).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn respects_depth_limit() {
        let mut graph = HashMap::new();
        graph.insert(ip(1), vec![ip(2)]);
        graph.insert(ip(2), vec![ip(3)]);
        graph.insert(ip(3), vec![ip(4)]);

        let prober = Arc::new(FixtureProber {
            graph,
            unreachable: vec![],
            probe_counts: Mutex::new(HashMap::new()),
        });

        let (pool, _) = crawl(ip(1), prober, 1, false, 4).await.unwrap();
        assert!(pool.contains_key(&ip(1)));
        assert!(pool.contains_key(&ip(2)));
        assert!(!pool.contains_key(&ip(3)));
    }

    use proptest::collection::{hash_set, vec as pvec};
    use proptest::prelude::*;

    proptest! {
        /// Over randomly generated 6-node peer graphs with a random unreachable
        /// subset, no ip ever ends up in both the pool and the blacklist.
        #[test]
        fn pool_and_blacklist_stay_disjoint_over_random_graphs(
            edges in pvec(pvec(1u8..=6, 0..4), 6),
            unreachable_idx in hash_set(2u8..=6, 0..5),
        ) {
            let mut graph = HashMap::new();
            for (i, peers) in edges.iter().enumerate() {
                let node_ip = ip(i as u8 + 1);
                let peer_ips = peers.iter().copied().filter(|&p| p != i as u8 + 1).map(ip).collect();
                graph.insert(node_ip, peer_ips);
            }
            let unreachable: Vec<IpAddr> = unreachable_idx.into_iter().map(ip).collect();

            let prober = Arc::new(FixtureProber {
                graph,
                unreachable,
                probe_counts: Mutex::new(HashMap::new()),
            });

            let rt = tokio::runtime::Runtime::new().unwrap();
            if let Ok((pool, blacklist)) = rt.block_on(crawl(ip(1), prober, 6, false, 4)) {
                for k in pool.keys() {
                    prop_assert!(!blacklist.contains_key(k));
                }
                for k in blacklist.keys() {
                    prop_assert!(!pool.contains_key(k));
                }
            }
        }
    }
}
