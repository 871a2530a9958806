//! Replace an asset's access rules
//!
//! Every submitted rule is parsed into its subject variant before anything is
//! written. The store then deletes the old set and inserts the new one in a
//! single atomic step, so concurrent access checks see either the old or the
//! new rules. An empty list revokes all rule-based access.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::shared::gate::{require_admin, GateError};
use crate::features::FeatureState;
use crate::models::{AccessRule, Principal, RuleInput, RuleSpec, RuleValidationError};
use crate::store::{RuleStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetPermissionsCommand {
    #[serde(default)]
    pub rules: Vec<RuleInput>,
}

#[derive(Debug, thiserror::Error)]
pub enum SetPermissionsError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("Rule {index}: {source}")]
    InvalidRule {
        index: usize,
        source: RuleValidationError,
    },

    #[error("Asset '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for SetPermissionsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

pub fn parse_rules(inputs: &[RuleInput]) -> Result<Vec<RuleSpec>, SetPermissionsError> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            input
                .parse()
                .map_err(|source| SetPermissionsError::InvalidRule { index, source })
        })
        .collect()
}

/// Validate `inputs` and atomically replace the rule set of `asset_id`
pub async fn set_permissions(
    rules: &dyn RuleStore,
    asset_id: Uuid,
    inputs: &[RuleInput],
) -> Result<Vec<AccessRule>, SetPermissionsError> {
    let specs = parse_rules(inputs)?;
    Ok(rules.replace_rules(asset_id, specs).await?)
}

#[tracing::instrument(
    skip(state, principal, command),
    fields(principal_id = %principal.id, rule_count = command.rules.len())
)]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
    command: SetPermissionsCommand,
) -> Result<Vec<AccessRule>, SetPermissionsError> {
    require_admin(principal)?;
    let stored = set_permissions(state.rules.as_ref(), asset_id, &command.rules).await?;

    tracing::info!(asset_id = %asset_id, rules = stored.len(), "Access rules replaced");
    Ok(stored)
}
