//! Share request workflow transitions
//!
//! Only PENDING requests move. Approval and rejection are admin decisions;
//! cancellation belongs to the requester. Approval re-checks that the
//! requester can still view the asset, so nothing is approved for someone
//! who has since lost access.

use assetdesk_common::types::ShareStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::shared::gate::{require_admin, require_view, GateError};
use crate::features::FeatureState;
use crate::models::{Principal, ShareRequest};
use crate::store::{ShareTransition, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecideShareRequestCommand {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DecideShareRequestError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("Share request '{0}' not found")]
    NotFound(Uuid),

    #[error("Only the requester can cancel a share request")]
    NotRequester,

    #[error("Requester no longer has access to the asset")]
    RequesterLostAccess,

    #[error("Share request '{id}' is already {status}")]
    NotPending { id: Uuid, status: ShareStatus },

    #[error("Database error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DecideShareRequestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

async fn load_pending(
    state: &FeatureState,
    id: Uuid,
) -> Result<ShareRequest, DecideShareRequestError> {
    let request = state
        .share_requests
        .get_share_request(id)
        .await?
        .ok_or(DecideShareRequestError::NotFound(id))?;

    if request.status != ShareStatus::Pending {
        return Err(DecideShareRequestError::NotPending {
            id,
            status: request.status,
        });
    }
    Ok(request)
}

async fn transition(
    state: &FeatureState,
    id: Uuid,
    transition: ShareTransition,
) -> Result<ShareRequest, DecideShareRequestError> {
    match state.share_requests.transition_share_request(id, transition).await {
        Ok(request) => {
            tracing::info!(share_request_id = %id, status = %request.status, "Share request decided");
            Ok(request)
        },
        // Lost a race with another decision
        Err(StoreError::Conflict(_)) => {
            let status = state
                .share_requests
                .get_share_request(id)
                .await?
                .map_or(ShareStatus::Cancelled, |r| r.status);
            Err(DecideShareRequestError::NotPending { id, status })
        },
        Err(err) => Err(err.into()),
    }
}

#[tracing::instrument(skip(state, principal, command), fields(principal_id = %principal.id))]
pub async fn approve(
    state: &FeatureState,
    principal: &Principal,
    id: Uuid,
    command: DecideShareRequestCommand,
) -> Result<ShareRequest, DecideShareRequestError> {
    require_admin(principal)?;
    let request = load_pending(state, id).await?;

    let requester = state
        .principals
        .resolve_principal(request.requester_id)
        .await?
        .filter(|p| p.active)
        .ok_or(DecideShareRequestError::RequesterLostAccess)?;

    match require_view(state, &requester, request.asset_id).await {
        Ok(_) => {},
        Err(GateError::Denied(reason)) => {
            tracing::info!(
                share_request_id = %id,
                requester_id = %requester.id,
                reason = %reason,
                "Approval refused, requester lost access"
            );
            return Err(DecideShareRequestError::RequesterLostAccess);
        },
        Err(err) => return Err(err.into()),
    }

    transition(
        state,
        id,
        ShareTransition {
            to: ShareStatus::Approved,
            decided_by: Some(principal.id),
            comment: command.comment.unwrap_or_default(),
        },
    )
    .await
}

#[tracing::instrument(skip(state, principal, command), fields(principal_id = %principal.id))]
pub async fn reject(
    state: &FeatureState,
    principal: &Principal,
    id: Uuid,
    command: DecideShareRequestCommand,
) -> Result<ShareRequest, DecideShareRequestError> {
    require_admin(principal)?;
    load_pending(state, id).await?;

    transition(
        state,
        id,
        ShareTransition {
            to: ShareStatus::Rejected,
            decided_by: Some(principal.id),
            comment: command.comment.unwrap_or_default(),
        },
    )
    .await
}

#[tracing::instrument(skip(state, principal), fields(principal_id = %principal.id))]
pub async fn cancel(
    state: &FeatureState,
    principal: &Principal,
    id: Uuid,
) -> Result<ShareRequest, DecideShareRequestError> {
    let request = state
        .share_requests
        .get_share_request(id)
        .await?
        .ok_or(DecideShareRequestError::NotFound(id))?;
    if request.requester_id != principal.id {
        return Err(DecideShareRequestError::NotRequester);
    }
    load_pending(state, id).await?;

    transition(
        state,
        id,
        ShareTransition {
            to: ShareStatus::Cancelled,
            decided_by: None,
            comment: String::new(),
        },
    )
    .await
}
