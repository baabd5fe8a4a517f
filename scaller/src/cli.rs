use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scaller", about = "scaffolding wrapper around the node lifecycle")]
pub struct Cli {
    /// Chain home directory, passed through to the wrapped binary as --home.
    #[arg(long, global = true, default_value = "/sekai")]
    pub home: PathBuf,

    /// Underlying chain binary this wrapper scaffolds (e.g. sekaid, interxd).
    #[arg(long, global = true, default_value = "sekaid")]
    pub binary: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Polls a target RPC node until it answers or the timeout elapses.
    Wait {
        #[arg(long)]
        rpc_node: String,
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },
    /// `<binary> init <moniker> --chain-id <chain-id> --home <home>`.
    Init {
        #[arg(long)]
        moniker: String,
        #[arg(long)]
        chain_id: String,
    },
    /// Reads a mnemonic from stdin and pipes it directly into the
    /// underlying binary's `keys add --recover` stdin.
    KeysAdd {
        #[arg(long)]
        name: String,
    },
    AddGenesisAccount {
        #[arg(long)]
        address: String,
        #[arg(long)]
        coins: String,
    },
    GentxClaim {
        #[arg(long)]
        name: String,
    },
    /// Crawls from `--rpc-node`, derives seeds and a state-sync plan, and
    /// writes `config.toml`/`app.toml` under `--home`.
    Join {
        #[arg(long)]
        rpc_node: String,
        #[arg(long)]
        target_node_id: String,
        #[arg(long, default_value_t = sekin_config::Ports::default().p2p)]
        target_p2p_port: u16,
        #[arg(long, default_value_t = sekin_config::Ports::default().gateway)]
        target_gateway_port: u16,
        #[arg(long, default_value_t = true)]
        statesync: bool,
        #[arg(long, default_value_t = 200)]
        snapshot_interval: u64,
        #[arg(long, default_value = "default")]
        prune: String,
    },
    /// Starts the underlying binary, optionally restarting it on exit.
    Start {
        /// `N` to restart up to N times on failure, or `always`.
        #[arg(long, default_value = "0")]
        restart: String,
    },
    Status {
        #[arg(long)]
        rpc_node: String,
    },
    Version,
}
