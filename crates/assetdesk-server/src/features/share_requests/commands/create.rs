//! Create share request command
//!
//! Any principal who can view an asset may ask to share it externally.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::shared::gate::{require_view, GateError};
use crate::features::shared::validation::{validate_required_text, TextValidationError};
use crate::features::FeatureState;
use crate::models::{Principal, ShareRequest};
use crate::store::{NewShareRequest, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareRequestCommand {
    #[serde(alias = "assetId")]
    pub asset_id: Uuid,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateShareRequestError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("{0}")]
    Field(#[from] TextValidationError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(
    skip(state, principal, command),
    fields(principal_id = %principal.id, asset_id = %command.asset_id)
)]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    command: CreateShareRequestCommand,
) -> Result<ShareRequest, CreateShareRequestError> {
    validate_required_text(&command.reason, "reason")?;
    require_view(state, principal, command.asset_id).await?;

    let request = state
        .share_requests
        .insert_share_request(NewShareRequest {
            asset_id: command.asset_id,
            requester_id: principal.id,
            reason: command.reason.trim().to_string(),
        })
        .await?;

    tracing::info!(share_request_id = %request.id, "Share request created");
    Ok(request)
}
