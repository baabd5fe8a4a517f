use tracing_subscriber::EnvFilter;

/// Initializes the process-wide tracing subscriber. Called once from each
/// binary's `main`; library code never constructs or threads a logger
/// handle of its own.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
