use serde::{Deserialize, Serialize};

use crate::error::SupervisorError;
use crate::Ports;

/// Runtime settings, layered: built-in defaults, then
/// `/etc/sekin/supervisor.toml` if present, then `SEKIN_`-prefixed
/// environment variables. The CLI layer applies on top by constructing a
/// `config::Config` builder the same way and overriding fields directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub home: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default = "default_ports")]
    pub ports: PortsConfig,
}

/// Plain serializable mirror of [`Ports`]; `Ports` itself has no serde
/// impls because it is meant to be a fixed, code-level default, not user
/// tunable through arbitrary config merges beyond the fields named here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortsConfig {
    pub rpc: u16,
    pub p2p: u16,
    pub grpc: u16,
    pub gateway: u16,
    pub supervisor: u16,
}

fn default_ports() -> PortsConfig {
    let p = Ports::default();
    PortsConfig {
        rpc: p.rpc,
        p2p: p.p2p,
        grpc: p.grpc,
        gateway: p.gateway,
        supervisor: p.supervisor,
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            home: "/sekin".to_string(),
            chain_id: String::new(),
            ports: default_ports(),
        }
    }
}

impl Settings {
    /// Loads settings from the default file location, overlaid with
    /// `SEKIN_`-prefixed environment variables. Missing config file is not
    /// an error; missing env vars just fall through to the built-in
    /// defaults.
    pub fn load() -> Result<Self, SupervisorError> {
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default()).map_err(config_err)?)
            .add_source(
                config::File::with_name("/etc/sekin/supervisor")
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix("SEKIN").separator("__"));
        let built = builder.build().map_err(config_err)?;
        built.try_deserialize().map_err(config_err)
    }
}

fn config_err(e: config::ConfigError) -> SupervisorError {
    SupervisorError::InvalidInput(format!("config: {e}"))
}
