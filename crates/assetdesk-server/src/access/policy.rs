//! Security-label clearance policies

use assetdesk_common::types::SecurityLabel;

use crate::models::Principal;

/// Decides whether a principal may see content carrying a security label
///
/// Consulted after the publish-status, view-scope and ACL gates have passed.
pub trait ClearancePolicy: Send + Sync + std::fmt::Debug {
    fn permits(&self, principal: &Principal, label: SecurityLabel) -> bool;
}

/// Labels are informational only; never refuses
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvisoryLabels;

impl ClearancePolicy for AdvisoryLabels {
    fn permits(&self, _principal: &Principal, _label: SecurityLabel) -> bool {
        true
    }
}

/// Refuses labels at or above `threshold` to non-administrative principals
#[derive(Debug, Clone, Copy)]
pub struct LabelThreshold {
    pub threshold: SecurityLabel,
}

impl LabelThreshold {
    pub fn new(threshold: SecurityLabel) -> Self {
        Self { threshold }
    }
}

impl ClearancePolicy for LabelThreshold {
    fn permits(&self, principal: &Principal, label: SecurityLabel) -> bool {
        label < self.threshold || principal.is_administrative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_common::types::RoleCode;
    use uuid::Uuid;

    #[test]
    fn test_advisory_permits_everything() {
        let principal = Principal::new(Uuid::new_v4());
        for label in SecurityLabel::ALL {
            assert!(AdvisoryLabels.permits(&principal, *label));
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = LabelThreshold::new(SecurityLabel::L3);
        let user = Principal::new(Uuid::new_v4()).with_role(RoleCode::User);

        assert!(policy.permits(&user, SecurityLabel::L1));
        assert!(policy.permits(&user, SecurityLabel::L2));
        assert!(!policy.permits(&user, SecurityLabel::L3));
        assert!(!policy.permits(&user, SecurityLabel::L4));
    }

    #[test]
    fn test_threshold_admin_bypass() {
        let policy = LabelThreshold::new(SecurityLabel::L1);
        let admin = Principal::new(Uuid::new_v4()).with_role(RoleCode::Admin);
        assert!(policy.permits(&admin, SecurityLabel::L4));
    }
}
