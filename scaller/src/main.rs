mod cli;
mod commands;

use std::time::Duration;

use clap::Parser;

use cli::{Cli, Command};

#[tokio::main]
async fn main() {
    sekin_config::init_tracing();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Wait { rpc_node, timeout_secs } => commands::wait(rpc_node, Duration::from_secs(*timeout_secs)).await,
        Command::Init { moniker, chain_id } => commands::init(&cli.binary, &cli.home, moniker, chain_id).await,
        Command::KeysAdd { name } => commands::keys_add(&cli.binary, &cli.home, name).await,
        Command::AddGenesisAccount { address, coins } => commands::add_genesis_account(&cli.binary, &cli.home, address, coins).await,
        Command::GentxClaim { name } => commands::gentx_claim(&cli.binary, &cli.home, name).await,
        Command::Join { rpc_node, target_node_id, target_p2p_port, target_gateway_port, statesync, snapshot_interval, prune } => {
            commands::join(&cli.home, rpc_node, target_node_id, *target_p2p_port, *target_gateway_port, *statesync, *snapshot_interval, prune).await
        }
        Command::Start { restart } => commands::start(&cli.binary, &cli.home, restart).await,
        Command::Status { rpc_node } => commands::status(rpc_node).await,
        Command::Version => {
            commands::version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("scaller: {e}");
        std::process::exit(1);
    }
}
