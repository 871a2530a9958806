//! Asset access gates shared by the feature handlers
//!
//! Every path that discloses an asset goes through [`require_view`] or
//! [`require_download`]. Both load the asset and its rules, ask the
//! [`AccessEvaluator`](crate::access::AccessEvaluator), and turn a refusal
//! into [`GateError::Denied`]. A missing asset is reported before any access
//! decision is made.

use assetdesk_common::types::{AccessAction, DenialReason};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::principal::ClientInfo;
use crate::access::{AccessDecision, AccessEvaluator};
use crate::api::response::ErrorResponse;
use crate::audit::NewAccessLogEntry;
use crate::features::FeatureState;
use crate::models::{AccessRule, Asset, Principal};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Asset '{0}' not found")]
    NotFound(Uuid),

    #[error("Access denied ({0})")]
    Denied(DenialReason),

    #[error("Administrator role required")]
    AdminRequired,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::NotFound(_) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            // The refusing gate is never disclosed to the caller
            GateError::Denied(_) | GateError::AdminRequired => {
                let error = ErrorResponse::new("FORBIDDEN", "You do not have access to this resource");
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            GateError::Store(ref err) => {
                tracing::error!(error = %err, "Storage error in access gate");
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

/// An asset that passed a gate, with the rules it was judged against
#[derive(Debug, Clone)]
pub struct GatedAsset {
    pub asset: Asset,
    pub rules: Vec<AccessRule>,
}

pub fn require_admin(principal: &Principal) -> Result<(), GateError> {
    if AccessEvaluator::is_admin(principal) {
        Ok(())
    } else {
        Err(GateError::AdminRequired)
    }
}

pub async fn load_asset(state: &FeatureState, asset_id: Uuid) -> Result<GatedAsset, GateError> {
    let asset = state
        .assets
        .get_asset(asset_id)
        .await?
        .ok_or(GateError::NotFound(asset_id))?;
    let rules = state.rules.rules_for(asset_id).await?;
    Ok(GatedAsset { asset, rules })
}

/// `can_view` without writing an access log entry
pub async fn require_view(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
) -> Result<GatedAsset, GateError> {
    let gated = load_asset(state, asset_id).await?;
    let decision = state.evaluator.can_view(principal, &gated.asset, &gated.rules);
    into_result(decision, gated)
}

/// `can_view` that records VIEW/SUCCESS or a DENIED entry
pub async fn require_view_logged(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
    client: &ClientInfo,
) -> Result<GatedAsset, GateError> {
    let gated = load_asset(state, asset_id).await?;
    let decision = state.evaluator.can_view(principal, &gated.asset, &gated.rules);
    record_decision(state, principal, asset_id, AccessAction::View, decision, client).await;
    into_result(decision, gated)
}

/// `can_download` that records DOWNLOAD/SUCCESS or a DENIED entry
pub async fn require_download(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
    client: &ClientInfo,
) -> Result<GatedAsset, GateError> {
    let gated = load_asset(state, asset_id).await?;
    let decision = state.evaluator.can_download(principal, &gated.asset, &gated.rules);
    record_decision(state, principal, asset_id, AccessAction::Download, decision, client).await;
    into_result(decision, gated)
}

fn into_result(decision: AccessDecision, gated: GatedAsset) -> Result<GatedAsset, GateError> {
    match decision.reason {
        None => Ok(gated),
        Some(reason) => Err(GateError::Denied(reason)),
    }
}

/// Access logging never fails the request; write errors are traced
async fn record_decision(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
    action: AccessAction,
    decision: AccessDecision,
    client: &ClientInfo,
) {
    let entry = match decision.reason {
        None => NewAccessLogEntry::success(principal.id, asset_id, action),
        Some(reason) => {
            tracing::info!(
                principal_id = %principal.id,
                asset_id = %asset_id,
                action = %action,
                reason = %reason,
                "Access denied"
            );
            NewAccessLogEntry::denied(principal.id, asset_id, reason)
        },
    };
    let entry = NewAccessLogEntry {
        ip: client.ip.clone(),
        user_agent: client.user_agent.clone(),
        ..entry
    };

    if let Err(err) = state.access_logs.record_access(entry).await {
        tracing::error!(error = %err, asset_id = %asset_id, "Failed to write access log entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{admin, seed_asset, user, TestFixture};
    use crate::audit::AccessLogQuery;
    use assetdesk_common::types::{AccessResult, PublishStatus, ViewScope};

    #[tokio::test]
    async fn test_missing_asset_is_not_found_for_everyone() {
        let fixture = TestFixture::new().await;
        let err = require_view(&fixture.state, &admin(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_view_denial_is_logged_with_reason() {
        let fixture = TestFixture::new().await;
        let asset = seed_asset(&fixture, PublishStatus::Published, ViewScope::AdminOnly).await;
        let viewer = user();

        let err = require_view_logged(&fixture.state, &viewer, asset.id, &ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Denied(DenialReason::ViewScope)));

        let logs = fixture
            .state
            .access_logs
            .query_access_logs(&AccessLogQuery::default())
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, AccessAction::Denied);
        assert_eq!(logs[0].result, AccessResult::Denied);
        assert_eq!(logs[0].metadata.as_ref().unwrap()["reason"], "VIEW_SCOPE");
    }

    #[tokio::test]
    async fn test_download_success_is_logged() {
        let fixture = TestFixture::new().await;
        let asset = seed_asset(&fixture, PublishStatus::Published, ViewScope::AllUsers).await;
        let client = ClientInfo {
            ip: Some("10.1.2.3".to_string()),
            user_agent: None,
        };

        // download flag is off by default, admins included
        let err = require_download(&fixture.state, &admin(), asset.id, &client)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Denied(DenialReason::DownloadNotAllowed)));

        fixture.allow_download(asset.id).await;
        require_download(&fixture.state, &user(), asset.id, &client).await.unwrap();

        let logs = fixture
            .state
            .access_logs
            .query_access_logs(&AccessLogQuery::default())
            .await
            .unwrap();
        assert_eq!(logs[0].action, AccessAction::Download);
        assert_eq!(logs[0].result, AccessResult::Success);
        assert_eq!(logs[0].ip.as_deref(), Some("10.1.2.3"));
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&admin()).is_ok());
        assert!(matches!(require_admin(&user()), Err(GateError::AdminRequired)));
    }
}
