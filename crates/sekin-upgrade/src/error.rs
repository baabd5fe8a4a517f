use sekin_config::SupervisorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("network error: {0}")]
    Net(#[from] SupervisorError),
    #[error("failed to decode upgrade plan: {0}")]
    Decode(String),
    #[error("upgrade plan resources list is empty")]
    PlanEmpty,
    #[error("failed to parse version: {0}")]
    VersionParse(String),
    #[error("container operation failed: {0}")]
    Container(String),
    #[error("manifest operation failed: {0}")]
    Manifest(String),
}
