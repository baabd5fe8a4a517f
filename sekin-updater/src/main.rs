//! Out-of-process upgrade runner. The supervisor's controller writes
//! `upgrade_plan.json` and spawns this binary rather than carrying out the
//! hard-fork or gateway-upgrade procedure in its own process, so a crash or
//! container restart mid-upgrade can't take the long-lived supervisor with it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sekin_config::Paths;
use sekin_container::ProcessComposeDriver;
use sekin_rpc::UpgradePlan;
use sekin_upgrade::UpgradeExecutor;

#[derive(Parser, Debug)]
struct Args {
    /// Path to the plan file written by the supervisor. Defaults to the
    /// well-known name in the current directory.
    #[arg(long, default_value = Paths::UPGRADE_PLAN_FILE)]
    plan_file: PathBuf,

    #[arg(long, default_value = "/sekin/compose.yml")]
    compose_path: PathBuf,

    #[arg(long, default_value = "/sekai")]
    sekai_host_home: PathBuf,

    #[arg(long, default_value = "http://sekai.local:8080")]
    sekai_caller: String,

    #[arg(long, default_value = "http://interx.local:8081")]
    interx_caller: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sekin_config::init_tracing();
    let args = Args::parse();

    let raw = tokio::fs::read(&args.plan_file)
        .await
        .with_context(|| format!("reading plan file at {}", args.plan_file.display()))?;
    let plan: UpgradePlan = serde_json::from_slice(&raw).context("decoding upgrade plan")?;

    let executor = UpgradeExecutor {
        driver: Arc::new(ProcessComposeDriver),
        compose_path: args.compose_path,
        sekai_host_home: args.sekai_host_home,
        sekai_caller: args.sekai_caller,
        interx_caller: args.interx_caller,
    };

    tracing::info!(proposal_id = %plan.proposal_id, "carrying out upgrade plan");
    executor.execute(&plan).await.context("upgrade execution failed")?;

    // plan file has been acted on; remove it so a restart doesn't re-run it
    if let Err(e) = tokio::fs::remove_file(&args.plan_file).await {
        tracing::warn!(error = %e, "failed to remove consumed plan file");
    }

    tracing::info!("upgrade complete");
    Ok(())
}
