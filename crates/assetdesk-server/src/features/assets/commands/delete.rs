//! Delete asset command
//!
//! Admin-only. Versions, rules, tag links and share requests go with the
//! asset; access log entries survive with their asset reference cleared.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::shared::gate::{require_admin, GateError};
use crate::features::FeatureState;
use crate::models::Principal;
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAssetResponse {
    pub id: Uuid,
    pub deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteAssetError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("Asset '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DeleteAssetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

#[tracing::instrument(skip(state, principal), fields(principal_id = %principal.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    id: Uuid,
) -> Result<DeleteAssetResponse, DeleteAssetError> {
    require_admin(principal)?;
    state.assets.delete_asset(id).await?;

    tracing::info!("Asset deleted");
    Ok(DeleteAssetResponse { id, deleted: true })
}
