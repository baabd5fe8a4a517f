use sekin_config::Version;
use sekin_rpc::UpgradePlan;

/// Which procedure, if any, a qualifying upgrade plan calls for.
#[derive(Debug, Clone)]
pub enum PlanClass {
    HardFork(UpgradePlan),
    GatewayUpgrade(UpgradePlan),
    Ignore,
}

/// True iff `plan` describes a sekai hard fork: not instated by governance
/// yet, not flagged to skip the handler, requires a reboot, targets the
/// `sekai` resource with a parseable version, and actually changes the
/// chain id (a plan that keeps the same chain id is not a fork).
pub fn is_hard_fork(plan: &UpgradePlan, current_chain_id: &str) -> bool {
    if plan.is_none() || plan.instate_upgrade || plan.skip_handler || !plan.reboot_required {
        return false;
    }
    let Some(resource) = plan.resources.first() else { return false };
    resource.id == "sekai" && Version::parse(&resource.version).is_ok() && plan.new_chain_id != current_chain_id
}

/// True iff `plan` describes an interx (gateway) upgrade: targets the
/// `interx` resource with a parseable version. Timing (has `upgrade_time`
/// arrived yet) is evaluated separately by the controller.
pub fn is_gateway_upgrade(plan: &UpgradePlan) -> bool {
    if plan.is_none() {
        return false;
    }
    let Some(resource) = plan.resources.first() else { return false };
    resource.id == "interx" && Version::parse(&resource.version).is_ok()
}

/// Prefers `current` over `next`; falls back to `next` only if `current`
/// doesn't qualify under `predicate`; never considers both simultaneously
/// active.
pub fn prefer_current<F>(current: Option<UpgradePlan>, next: Option<UpgradePlan>, predicate: F) -> PlanClassCandidate
where
    F: Fn(&UpgradePlan) -> bool,
{
    if let Some(plan) = current {
        if predicate(&plan) {
            return PlanClassCandidate::Some(plan);
        }
    }
    if let Some(plan) = next {
        if predicate(&plan) {
            return PlanClassCandidate::Some(plan);
        }
    }
    PlanClassCandidate::None
}

pub enum PlanClassCandidate {
    Some(UpgradePlan),
    None,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sekin_rpc::UpgradeResource;

    fn base_plan() -> UpgradePlan {
        UpgradePlan {
            proposal_id: "1".to_string(),
            instate_upgrade: false,
            skip_handler: false,
            reboot_required: true,
            new_chain_id: "testnet-2".to_string(),
            old_chain_id: "testnet-1".to_string(),
            upgrade_time: "0".to_string(),
            resources: vec![UpgradeResource {
                id: "sekai".to_string(),
                version: "v0.5.0".to_string(),
                checksum: String::new(),
                url: String::new(),
            }],
            name: String::new(),
            max_enrolment_duration: String::new(),
            processed_no_vote_validators: false,
            rollback_checksum: String::new(),
        }
    }

    #[test]
    fn qualifies_as_hard_fork_when_all_conditions_hold() {
        let plan = base_plan();
        assert!(is_hard_fork(&plan, "testnet-1"));
    }

    #[test]
    fn same_chain_id_is_not_a_fork() {
        let mut plan = base_plan();
        plan.new_chain_id = "testnet-1".to_string();
        assert!(!is_hard_fork(&plan, "testnet-1"));
    }

    #[test]
    fn instate_upgrade_disqualifies() {
        let mut plan = base_plan();
        plan.instate_upgrade = true;
        assert!(!is_hard_fork(&plan, "testnet-1"));
    }

    #[test]
    fn skip_handler_disqualifies() {
        let mut plan = base_plan();
        plan.skip_handler = true;
        assert!(!is_hard_fork(&plan, "testnet-1"));
    }

    #[test]
    fn not_reboot_required_disqualifies() {
        let mut plan = base_plan();
        plan.reboot_required = false;
        assert!(!is_hard_fork(&plan, "testnet-1"));
    }

    #[test]
    fn wrong_resource_id_disqualifies() {
        let mut plan = base_plan();
        plan.resources[0].id = "interx".to_string();
        assert!(!is_hard_fork(&plan, "testnet-1"));
        assert!(is_gateway_upgrade(&plan));
    }

    #[test]
    fn unparseable_version_disqualifies() {
        let mut plan = base_plan();
        plan.resources[0].version = "not-a-version".to_string();
        assert!(!is_hard_fork(&plan, "testnet-1"));
    }

    #[test]
    fn empty_resources_disqualifies_but_is_not_the_plan_empty_error_path() {
        let mut plan = base_plan();
        plan.resources.clear();
        assert!(!is_hard_fork(&plan, "testnet-1"));
    }

    #[test]
    fn prefer_current_never_evaluates_both() {
        let current = base_plan();
        let mut next = base_plan();
        next.new_chain_id = "testnet-3".to_string();
        match prefer_current(Some(current.clone()), Some(next), |p| is_hard_fork(p, "testnet-1")) {
            PlanClassCandidate::Some(p) => assert_eq!(p.new_chain_id, current.new_chain_id),
            PlanClassCandidate::None => panic!("expected current to qualify"),
        }
    }

    #[test]
    fn falls_back_to_next_when_current_does_not_qualify() {
        let mut current = base_plan();
        current.reboot_required = false;
        let next = base_plan();
        match prefer_current(Some(current), Some(next.clone()), |p| is_hard_fork(p, "testnet-1")) {
            PlanClassCandidate::Some(p) => assert_eq!(p.new_chain_id, next.new_chain_id),
            PlanClassCandidate::None => panic!("expected next to qualify"),
        }
    }
}
