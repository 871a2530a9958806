//! Version history and current version queries
//!
//! Both require `can_view` on the asset.

use uuid::Uuid;

use crate::features::shared::gate::{require_view, GateError};
use crate::features::FeatureState;
use crate::ledger::LedgerError;
use crate::models::{AssetVersion, Principal};

#[derive(Debug, thiserror::Error)]
pub enum VersionQueryError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),
}

/// Highest version number first
#[tracing::instrument(skip(state, principal), fields(principal_id = %principal.id))]
pub async fn list(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
) -> Result<Vec<AssetVersion>, VersionQueryError> {
    require_view(state, principal, asset_id).await?;
    Ok(state.ledger.list_versions(asset_id).await?)
}

#[tracing::instrument(skip(state, principal), fields(principal_id = %principal.id))]
pub async fn current(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
) -> Result<Option<AssetVersion>, VersionQueryError> {
    require_view(state, principal, asset_id).await?;
    Ok(state.ledger.get_current(asset_id).await?)
}
