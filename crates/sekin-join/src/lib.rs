//! Join planning: crawl for seeds, derive a quorum-backed state-sync plan,
//! resolve this node's external address, and emit `config.toml`/`app.toml`.

mod configfile;
mod planner;
mod sync_plan;
mod types;

pub use planner::JoinPlanner;
pub use sync_plan::{derive_sync_plan, QUORUM};
pub use types::{JoinOptions, JoinOutcome, PruningProfile, SyncPlan, TargetSeed};
