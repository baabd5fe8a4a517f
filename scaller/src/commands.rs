use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bip39::Mnemonic;
use sekin_join::{JoinOptions, JoinPlanner, PruningProfile, TargetSeed};
use sekin_rpc::ConsensusClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

pub async fn wait(rpc_node: &str, timeout: Duration) -> Result<()> {
    let client = ConsensusClient::from_base(rpc_node);
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if client.status().await.is_ok() {
            println!("{rpc_node} is reachable");
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            bail!("{rpc_node} did not become reachable within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

pub async fn init(binary: &Path, home: &Path, moniker: &str, chain_id: &str) -> Result<()> {
    run(binary, &["init".to_string(), moniker.to_string(), "--chain-id".to_string(), chain_id.to_string(), home_flag(home)]).await
}

pub async fn add_genesis_account(binary: &Path, home: &Path, address: &str, coins: &str) -> Result<()> {
    run(binary, &["add-genesis-account".to_string(), address.to_string(), coins.to_string(), home_flag(home)]).await
}

pub async fn gentx_claim(binary: &Path, home: &Path, name: &str) -> Result<()> {
    run(binary, &["gentx-claim".to_string(), name.to_string(), home_flag(home)]).await
}

/// Reads a mnemonic from stdin, validates it, and writes it directly into
/// the spawned `keys add --recover` child's stdin. Never touches a temp
/// file, so the phrase has no window on disk between entry and consumption.
pub async fn keys_add(binary: &Path, home: &Path, name: &str) -> Result<()> {
    let mut raw = String::new();
    tokio::io::stdin().read_to_string(&mut raw).await.context("reading mnemonic from stdin")?;
    let phrase = raw.trim();
    Mnemonic::parse(phrase).context("mnemonic failed BIP-39 validation")?;

    let mut child = Command::new(binary)
        .args(["keys", "add", name, "--recover", "--home"])
        .arg(home)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning {}", binary.display()))?;
    let mut stdin = child.stdin.take().expect("stdin was piped");
    stdin.write_all(phrase.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    drop(stdin);

    let status = child.wait().await?;
    if !status.success() {
        bail!("{} keys add failed", binary.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn join(
    home: &Path,
    rpc_node: &str,
    target_node_id: &str,
    target_p2p_port: u16,
    target_gateway_port: u16,
    statesync: bool,
    snapshot_interval: u64,
    prune: &str,
) -> Result<()> {
    let (ip_str, port_str) = rpc_node.rsplit_once(':').context("--rpc-node must be ip:port")?;
    let ip = ip_str.parse().context("--rpc-node host must be an IP address")?;
    let rpc_port: u16 = port_str.parse().context("--rpc-node port must be numeric")?;

    let target = TargetSeed { ip, node_id: target_node_id.to_string(), rpc_port, p2p_port: target_p2p_port, gateway_port: target_gateway_port };
    let pruning = match prune {
        "nothing" => PruningProfile::Nothing,
        "everything" => PruningProfile::Everything,
        _ => PruningProfile::Default,
    };
    if !statesync {
        tracing::info!("--statesync=false has no effect on the quorum-derived plan; disable it by routing around a quorum of rpc servers instead");
    }
    let opts = JoinOptions { pruning, snapshot_interval, ..JoinOptions::default() };

    let outcome = JoinPlanner::plan(&target, home, &opts).await?;
    println!(
        "joined chain_id={} seeds={} statesync={} external_address={}",
        outcome.chain_id,
        outcome.seeds.len(),
        outcome.sync_plan.enabled,
        outcome.external_address
    );
    Ok(())
}

pub async fn start(binary: &Path, home: &Path, restart: &str) -> Result<()> {
    let always = restart == "always";
    let max_restarts: u32 = if always { 0 } else { restart.parse().context("--restart must be a number or \"always\"")? };

    let mut attempt = 0u32;
    loop {
        let status = Command::new(binary).args(["start", "--home"]).arg(home).status().await.with_context(|| format!("spawning {}", binary.display()))?;
        if status.success() {
            return Ok(());
        }
        if !always && attempt >= max_restarts {
            bail!("{} exited with {status}", binary.display());
        }
        attempt += 1;
        tracing::warn!(attempt, "{} exited, restarting", binary.display());
    }
}

pub async fn status(rpc_node: &str) -> Result<()> {
    let client = ConsensusClient::from_base(rpc_node);
    let status = client.status().await?;
    println!(
        "chain_id={} height={} catching_up={}",
        status.node_info.network, status.sync_info.latest_block_height, status.sync_info.catching_up
    );
    Ok(())
}

pub fn version() {
    println!("scaller {}", env!("CARGO_PKG_VERSION"));
}

async fn run(binary: &Path, args: &[String]) -> Result<()> {
    let status = Command::new(binary).args(args).status().await.with_context(|| format!("spawning {}", binary.display()))?;
    if !status.success() {
        bail!("{} exited with {status}", binary.display());
    }
    Ok(())
}

fn home_flag(home: &Path) -> String {
    format!("--home={}", home.display())
}
