//! The upgrade controller (a periodic reconciler) and the upgrade executor
//! (the hard-fork and gateway-upgrade procedures it hands off to).

mod controller;
mod error;
mod executor;
mod liveness;
mod plan_class;

pub use controller::{
    IntervalClass, SelfUpdateSource, UpgradeController, CONSENSUS_LIVENESS_WINDOW, ERROR_INTERVAL, NORMAL_INTERVAL, STAGED_INTERVAL,
};
pub use error::ControllerError;
pub use executor::UpgradeExecutor;
pub use liveness::alive;
pub use plan_class::{is_gateway_upgrade, is_hard_fork, prefer_current, PlanClass, PlanClassCandidate};
