//! Update asset command
//!
//! Admin-only partial update. At least one field must be present; the
//! current version pointer is never touched here.

use assetdesk_common::types::{PublishStatus, SecurityLabel, ViewScope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::assets::types::AssetDetail;
use crate::features::shared::gate::{require_admin, GateError};
use crate::features::shared::validation::{validate_title, TextValidationError};
use crate::features::FeatureState;
use crate::ledger::LedgerError;
use crate::models::{Principal, MAX_TITLE_LENGTH};
use crate::store::{AssetPatch, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssetCommand {
    #[serde(skip)]
    pub id: Uuid,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub publish_status: Option<PublishStatus>,

    #[serde(default)]
    pub view_scope: Option<ViewScope>,

    #[serde(default)]
    pub download_allowed: Option<bool>,

    #[serde(default)]
    pub security_label: Option<SecurityLabel>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateAssetError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("At least one field must be provided")]
    NoFieldsToUpdate,

    #[error("{0}")]
    Field(#[from] TextValidationError),

    #[error("Asset '{0}' not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Version(#[from] LedgerError),

    #[error("Database error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for UpdateAssetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl UpdateAssetCommand {
    fn into_patch(self) -> Result<AssetPatch, UpdateAssetError> {
        if let Some(ref title) = self.title {
            validate_title(title, MAX_TITLE_LENGTH)?;
        }

        let patch = AssetPatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            publish_status: self.publish_status,
            view_scope: self.view_scope,
            download_allowed: self.download_allowed,
            security_label: self.security_label,
        };
        if patch.is_empty() {
            return Err(UpdateAssetError::NoFieldsToUpdate);
        }
        Ok(patch)
    }
}

#[tracing::instrument(skip(state, principal, command), fields(asset_id = %command.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    command: UpdateAssetCommand,
) -> Result<AssetDetail, UpdateAssetError> {
    require_admin(principal)?;

    let id = command.id;
    let patch = command.into_patch()?;
    let asset = state.assets.update_asset(id, patch).await?;
    let current = state.ledger.get_current(id).await?;

    tracing::info!(
        publish_status = %asset.publish_status,
        view_scope = %asset.view_scope,
        "Asset updated"
    );

    Ok(AssetDetail::new(asset, current))
}
