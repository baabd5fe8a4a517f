use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sekin_config::{Version, VersionOrdering, Versions};
use sekin_rpc::{ConsensusClient, GatewayClient, UpgradePlan, UpgradeResource};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::ControllerError;
use crate::liveness;
use crate::plan_class::{is_gateway_upgrade, is_hard_fork, prefer_current, PlanClassCandidate};

pub const NORMAL_INTERVAL: Duration = Duration::from_secs(6 * 3600);
pub const ERROR_INTERVAL: Duration = Duration::from_secs(3 * 3600);
pub const STAGED_INTERVAL: Duration = Duration::from_secs(20 * 60);
pub const CONSENSUS_LIVENESS_WINDOW: Duration = Duration::from_secs(30);

/// The interval a tick settles on. Declaration order doubles as
/// precedence: `Error` outranks `Staged` outranks `Normal`, so taking the
/// max of the three per-check outcomes picks the right interval without
/// relying on call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntervalClass {
    Normal,
    Staged,
    Error,
}

impl IntervalClass {
    pub fn duration(self) -> Duration {
        match self {
            IntervalClass::Normal => NORMAL_INTERVAL,
            IntervalClass::Staged => STAGED_INTERVAL,
            IntervalClass::Error => ERROR_INTERVAL,
        }
    }
}

/// Supplies the latest published versions of the supervised stack. In
/// production this resolves the upstream compose manifest; tests supply a
/// scripted value.
#[async_trait]
pub trait SelfUpdateSource: Send + Sync {
    async fn latest_versions(&self) -> Result<Versions, ControllerError>;
}

pub struct UpgradeController {
    pub current_versions: Versions,
    pub current_chain_id: String,
    pub gateway: GatewayClient,
    pub sekai_rpc: ConsensusClient,
    pub self_update_source: Arc<dyn SelfUpdateSource>,
    pub updater_bin: PathBuf,
    pub plan_path: PathBuf,
}

impl UpgradeController {
    /// Runs until `shutdown` reports true, ticking at an interval that
    /// adapts after every check.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = IntervalClass::Normal.duration();
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("upgrade controller shutting down");
                        return;
                    }
                }
                _ = tokio::time::sleep(interval) => {
                    let class = self.tick().await;
                    interval = class.duration();
                }
            }
        }
    }

    /// Runs the three checks in order, never crashing the controller on a
    /// tick error. Returns the most urgent interval class observed.
    pub async fn tick(&self) -> IntervalClass {
        let mut worst = IntervalClass::Normal;

        if let Err(e) = self.check_self_update().await {
            warn!(error = %e, "self-update check failed");
            worst = worst.max(IntervalClass::Error);
        }

        match self.check_hard_fork().await {
            Ok(class) => worst = worst.max(class),
            Err(e) => {
                warn!(error = %e, "hard-fork check failed");
                worst = worst.max(IntervalClass::Error);
            }
        }

        match self.check_gateway_upgrade().await {
            Ok(class) => worst = worst.max(class),
            Err(e) => {
                warn!(error = %e, "gateway-upgrade check failed");
                worst = worst.max(IntervalClass::Error);
            }
        }

        worst
    }

    async fn check_self_update(&self) -> Result<(), ControllerError> {
        let latest = self.self_update_source.latest_versions().await?;
        if matches!(self.current_versions.supervisor.compare(&latest.supervisor), VersionOrdering::Lower) {
            info!(to = %latest.supervisor, "supervisor self-update available");
            self.invoke_updater(None).await?;
        }
        Ok(())
    }

    async fn check_hard_fork(&self) -> Result<IntervalClass, ControllerError> {
        let current = self.gateway.current_plan().await?;
        let next = self.gateway.next_plan().await?;
        reject_empty_resources(&current, &next)?;

        let plan = match prefer_current(current, next, |p| is_hard_fork(p, &self.current_chain_id)) {
            PlanClassCandidate::Some(plan) => plan,
            PlanClassCandidate::None => return Ok(IntervalClass::Normal),
        };

        let target = Version::parse(&plan.resources[0].version).map_err(|e| ControllerError::VersionParse(e.to_string()))?;
        if !matches!(self.current_versions.sekai.compare(&target), VersionOrdering::Lower) {
            return Ok(IntervalClass::Normal);
        }

        if liveness::alive(&self.sekai_rpc, CONSENSUS_LIVENESS_WINDOW).await? {
            info!("hard fork staged, consensus still producing blocks");
            return Ok(IntervalClass::Staged);
        }

        info!(target = %target, "executing hard fork");
        self.invoke_updater(Some(&plan)).await?;
        Ok(IntervalClass::Normal)
    }

    async fn check_gateway_upgrade(&self) -> Result<IntervalClass, ControllerError> {
        let current = self.gateway.current_plan().await?;
        let next = self.gateway.next_plan().await?;
        reject_empty_resources(&current, &next)?;

        let plan = match prefer_current(current, next, is_gateway_upgrade) {
            PlanClassCandidate::Some(plan) => plan,
            PlanClassCandidate::None => return Ok(IntervalClass::Normal),
        };

        let upgrade_time: i64 = plan
            .upgrade_time
            .parse()
            .map_err(|_| ControllerError::Decode(format!("invalid upgrade_time {:?}", plan.upgrade_time)))?;
        if now_unix() >= upgrade_time {
            info!("executing gateway upgrade");
            self.invoke_updater(Some(&plan)).await?;
            Ok(IntervalClass::Normal)
        } else {
            Ok(IntervalClass::Staged)
        }
    }

    async fn invoke_updater(&self, plan: Option<&UpgradePlan>) -> Result<(), ControllerError> {
        if let Some(plan) = plan {
            let json = serde_json::to_vec_pretty(plan).map_err(|e| ControllerError::Decode(e.to_string()))?;
            tokio::fs::write(&self.plan_path, json)
                .await
                .map_err(|e| ControllerError::Manifest(e.to_string()))?;
        }
        let status = tokio::process::Command::new(&self.updater_bin)
            .status()
            .await
            .map_err(|e| ControllerError::Container(e.to_string()))?;
        if !status.success() {
            return Err(ControllerError::Container("updater binary exited with a failure status".to_string()));
        }
        Ok(())
    }
}

fn reject_empty_resources(current: &Option<UpgradePlan>, next: &Option<UpgradePlan>) -> Result<(), ControllerError> {
    for plan in [current, next].into_iter().flatten() {
        if plan.is_none() {
            continue;
        }
        let empty = plan.resources.is_empty() || plan.resources[0] == UpgradeResource::default();
        if empty {
            return Err(ControllerError::PlanEmpty);
        }
    }
    Ok(())
}

fn now_unix() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_class_precedence_is_error_over_staged_over_normal() {
        assert!(IntervalClass::Error > IntervalClass::Staged);
        assert!(IntervalClass::Staged > IntervalClass::Normal);
        assert_eq!(
            [IntervalClass::Normal, IntervalClass::Staged, IntervalClass::Error]
                .into_iter()
                .max()
                .unwrap(),
            IntervalClass::Error
        );
    }

    #[test]
    fn interval_durations_match_documented_constants() {
        assert_eq!(IntervalClass::Normal.duration(), Duration::from_secs(6 * 3600));
        assert_eq!(IntervalClass::Error.duration(), Duration::from_secs(3 * 3600));
        assert_eq!(IntervalClass::Staged.duration(), Duration::from_secs(20 * 60));
    }

    fn plan_with_resources(resources: Vec<UpgradeResource>) -> UpgradePlan {
        UpgradePlan {
            proposal_id: "42".to_string(),
            resources,
            ..Default::default()
        }
    }

    #[test]
    fn no_plan_at_all_is_not_an_error() {
        assert!(reject_empty_resources(&None, &None).is_ok());
    }

    #[test]
    fn empty_resources_vec_is_rejected() {
        let plan = Some(plan_with_resources(Vec::new()));
        assert!(matches!(reject_empty_resources(&plan, &None), Err(ControllerError::PlanEmpty)));
    }

    #[test]
    fn zero_value_first_resource_is_rejected_even_though_the_vec_is_non_empty() {
        let plan = Some(plan_with_resources(vec![UpgradeResource::default()]));
        assert!(matches!(reject_empty_resources(&None, &plan), Err(ControllerError::PlanEmpty)));
    }

    #[test]
    fn a_real_resource_passes() {
        let resource = UpgradeResource {
            id: "sekai".to_string(),
            version: "v0.4.1".to_string(),
            ..Default::default()
        };
        let plan = Some(plan_with_resources(vec![resource]));
        assert!(reject_empty_resources(&plan, &None).is_ok());
    }
}
