mod command;
mod dashboard;
mod handlers;
mod router;
mod self_update;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sekin_config::{Paths, Ports, Versions};
use sekin_container::ProcessComposeDriver;
use sekin_rpc::{ConsensusClient, GatewayClient};
use sekin_upgrade::UpgradeController;
use tokio::sync::watch;

use crate::self_update::ComposeManifestSource;
use crate::state::AppState;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "/sekin")]
    home: PathBuf,

    #[arg(long, default_value = "/sekin/compose.yml")]
    compose_path: PathBuf,

    #[arg(long)]
    chain_id: String,

    #[arg(long, default_value = "v0.1.0")]
    supervisor_version: String,

    #[arg(long, default_value = "v0.0.0")]
    sekai_version: String,

    #[arg(long, default_value = "v0.0.0")]
    interx_version: String,

    #[arg(long, default_value = "https://raw.githubusercontent.com/KiraCore/sekin/master/compose.yml")]
    manifest_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sekin_config::init_tracing();
    let args = Args::parse();
    let ports = Ports::default();

    let versions = Versions {
        sekai: sekin_config::Version::parse(&args.sekai_version)?,
        interx: sekin_config::Version::parse(&args.interx_version)?,
        supervisor: sekin_config::Version::parse(&args.supervisor_version)?,
    };

    let driver: Arc<dyn sekin_container::ContainerDriver> = Arc::new(ProcessComposeDriver);

    let app_state = AppState {
        driver: driver.clone(),
        versions: versions.clone(),
        ports,
        home: args.home.clone(),
        compose_path: args.compose_path.clone(),
        chain_id: args.chain_id.clone(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let controller = UpgradeController {
        current_versions: versions,
        current_chain_id: args.chain_id,
        gateway: GatewayClient::new(sekin_config::NodeAddresses::INTERX, ports.gateway),
        sekai_rpc: ConsensusClient::new(sekin_config::NodeAddresses::SEKAI, ports.rpc),
        self_update_source: Arc::new(ComposeManifestSource { manifest_url: args.manifest_url }),
        updater_bin: PathBuf::from("/usr/local/bin/sekin-updater"),
        plan_path: args.home.join(Paths::UPGRADE_PLAN_FILE),
    };
    let controller_handle = tokio::spawn(controller.run(shutdown_rx));

    let app = router::build_router(app_state);
    let addr = format!("0.0.0.0:{}", ports.supervisor);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "sekin-supervisord listening");

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = controller_handle.await;
    Ok(())
}
