use std::collections::{HashMap, HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use sekin_config::SupervisorError;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::prober::Prober;
use crate::types::{BlacklistedNode, Node, ProbeError};

/// Default cap on concurrently in-flight probes, independent of how many
/// ips are queued at any point in the BFS.
pub const DEFAULT_CONCURRENCY: usize = 32;

#[derive(Default)]
struct CrawlState {
    pool: HashMap<IpAddr, Node>,
    blacklist: HashMap<IpAddr, BlacklistedNode>,
    in_flight: HashSet<IpAddr>,
}

type ProbeResult = (IpAddr, u32, Result<Node, Vec<ProbeError>>);

/// Crawls the peer graph starting at `seed`. Fails only if the seed itself
/// is unreachable; every subsequent probe failure just blacklists that ip.
pub async fn crawl(
    seed: IpAddr,
    prober: Arc<dyn Prober>,
    depth: u32,
    ignore_depth: bool,
    concurrency: usize,
) -> Result<(HashMap<IpAddr, Node>, HashMap<IpAddr, BlacklistedNode>), SupervisorError> {
    let seed_node = prober
        .probe(seed)
        .await
        .map_err(|errors| SupervisorError::NetworkUnreachable(format!("seed {seed} unreachable: {errors:?}")))?;

    let state = Mutex::new(CrawlState::default());
    let mut queue: VecDeque<(IpAddr, u32)> = seed_node.peers.iter().map(|p| (p.ip, 1)).collect();
    state.lock().unwrap().pool.insert(seed, seed_node);

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set: JoinSet<ProbeResult> = JoinSet::new();

    loop {
        while let Some((ip, item_depth)) = queue.pop_front() {
            let claimed = {
                let mut st = state.lock().unwrap();
                if st.pool.contains_key(&ip) || st.blacklist.contains_key(&ip) || st.in_flight.contains(&ip) {
                    false
                } else {
                    st.in_flight.insert(ip);
                    true
                }
            };
            if !claimed {
                continue;
            }
            let prober = Arc::clone(&prober);
            let permit = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore never closed");
                let result = prober.probe(ip).await;
                (ip, item_depth, result)
            });
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let (ip, item_depth, result) = joined.expect("probe task panicked");

        let mut st = state.lock().unwrap();
        st.in_flight.remove(&ip);
        match result {
            Ok(node) => {
                debug!(%ip, peers = node.peers.len(), "probe succeeded");
                let expand = item_depth < depth || ignore_depth;
                let next = if expand { node.peers.iter().map(|p| p.ip).collect::<Vec<_>>() } else { Vec::new() };
                st.pool.insert(ip, node);
                drop(st);
                for next_ip in next {
                    queue.push_back((next_ip, item_depth + 1));
                }
            }
            Err(errors) => {
                warn!(%ip, ?errors, "probe failed, blacklisting");
                st.blacklist.insert(ip, BlacklistedNode { ip, errors });
            }
        }
    }

    let st = state.into_inner().unwrap();
    Ok((st.pool, st.blacklist))
}
