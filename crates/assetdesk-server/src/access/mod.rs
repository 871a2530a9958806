//! Access evaluation
//!
//! [`AccessEvaluator`] answers "may this principal view / download this
//! asset" from values already in memory: the principal, the asset and the
//! asset's rule set. It never touches storage and never fails; a refusal is
//! an ordinary [`AccessDecision`] naming the gate that refused.
//!
//! `can_view` runs these gates in order. Each gate can only deny or pass:
//!
//! 1. publish status: anything but PUBLISHED is admin-only
//! 2. view scope: ADMIN_ONLY is admin-only, CUSTOM defers to the ACL
//! 3. ACL (CUSTOM only): some rule matching the principal grants view
//! 4. clearance: the configured [`ClearancePolicy`] accepts the label
//!
//! Administrative principals pass gates 1 to 3. When several rules match a
//! principal, any granting rule wins.

mod policy;

pub use policy::{AdvisoryLabels, ClearancePolicy, LabelThreshold};

use std::sync::Arc;

use assetdesk_common::types::{DenialReason, PublishStatus, ViewScope};
use serde::Serialize;

use crate::models::{AccessRule, Asset, Principal};

/// Outcome of an access check. `reason` is set exactly when access is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub granted: bool,
    pub reason: Option<DenialReason>,
}

impl AccessDecision {
    pub const GRANTED: AccessDecision = AccessDecision {
        granted: true,
        reason: None,
    };

    pub fn deny(reason: DenialReason) -> Self {
        Self {
            granted: false,
            reason: Some(reason),
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }
}

#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    clearance: Arc<dyn ClearancePolicy>,
}

impl Default for AccessEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(AdvisoryLabels))
    }
}

impl AccessEvaluator {
    pub fn new(clearance: Arc<dyn ClearancePolicy>) -> Self {
        Self { clearance }
    }

    pub fn is_admin(principal: &Principal) -> bool {
        principal.is_administrative()
    }

    pub fn can_view(
        &self,
        principal: &Principal,
        asset: &Asset,
        rules: &[AccessRule],
    ) -> AccessDecision {
        let admin = Self::is_admin(principal);

        if asset.publish_status != PublishStatus::Published && !admin {
            return AccessDecision::deny(DenialReason::PublishStatus);
        }

        match asset.view_scope {
            ViewScope::AllUsers => {},
            ViewScope::AdminOnly => {
                if !admin {
                    return AccessDecision::deny(DenialReason::ViewScope);
                }
            },
            ViewScope::Custom => {
                let granted = admin || matching(principal, rules).any(|rule| rule.can_view);
                if !granted {
                    return AccessDecision::deny(DenialReason::Acl);
                }
            },
        }

        if !self.clearance.permits(principal, asset.security_label) {
            return AccessDecision::deny(DenialReason::Clearance);
        }

        AccessDecision::GRANTED
    }

    /// Requires `can_view`, the asset's download flag, and for CUSTOM scope a
    /// matching rule that allows download.
    pub fn can_download(
        &self,
        principal: &Principal,
        asset: &Asset,
        rules: &[AccessRule],
    ) -> AccessDecision {
        let view = self.can_view(principal, asset, rules);
        if !view.granted {
            return view;
        }

        if !asset.download_allowed {
            return AccessDecision::deny(DenialReason::DownloadNotAllowed);
        }

        if asset.view_scope == ViewScope::Custom
            && !Self::is_admin(principal)
            && !matching(principal, rules).any(|rule| rule.can_download)
        {
            return AccessDecision::deny(DenialReason::Acl);
        }

        AccessDecision::GRANTED
    }
}

fn matching<'a>(
    principal: &'a Principal,
    rules: &'a [AccessRule],
) -> impl Iterator<Item = &'a AccessRule> + 'a {
    rules.iter().filter(move |rule| rule.subject.matches(principal))
}
