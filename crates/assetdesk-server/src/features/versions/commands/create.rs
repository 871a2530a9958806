//! Create version command
//!
//! Admin-only entry point to [`VersionLedger::create_version`](crate::ledger::VersionLedger::create_version).

use uuid::Uuid;

use crate::features::shared::gate::{require_admin, GateError};
use crate::features::FeatureState;
use crate::ledger::{LedgerError, VersionDraft};
use crate::models::{AssetVersion, Principal};

#[derive(Debug, thiserror::Error)]
pub enum CreateVersionError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),
}

#[tracing::instrument(skip(state, principal, draft), fields(principal_id = %principal.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
    draft: VersionDraft,
) -> Result<AssetVersion, CreateVersionError> {
    require_admin(principal)?;
    Ok(state.ledger.create_version(asset_id, draft, principal).await?)
}
