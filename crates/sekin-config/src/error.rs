use thiserror::Error;

/// Top-level error taxonomy shared by every `sekin-*` crate. Library code
/// returns this directly or a crate-local error that converts into it at
/// the HTTP/CLI boundary.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("failed to decode protocol response: {0}")]
    ProtocolDecode(String),

    #[error("upgrade plan is empty")]
    PlanEmpty,

    #[error("failed to parse version: {0}")]
    VersionParse(String),

    #[error("container operation failed: {0}")]
    ContainerOp(String),

    #[error("manifest I/O failed: {0}")]
    ManifestIo(String),

    #[error("node operation failed: {0}")]
    NodeOpFailed(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
