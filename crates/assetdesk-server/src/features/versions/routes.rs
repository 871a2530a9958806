//! Version API routes
//!
//! Merged into the `/assets` router:
//!
//! - `GET /api/v1/assets/:id/versions` - History, newest first
//! - `POST /api/v1/assets/:id/versions` - Append a version (admin)
//! - `GET /api/v1/assets/:id/versions/current` - Current version or `null`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use uuid::Uuid;

use super::{commands::CreateVersionError, queries::VersionQueryError};
use crate::api::response::{
    not_found, store_error_response, validation_error, ApiResponse, ErrorResponse,
};
use crate::features::shared::{ApiJson, CurrentPrincipal};
use crate::features::FeatureState;
use crate::ledger::{LedgerError, VersionDraft};

pub fn versions_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:id/versions", get(list_versions).post(create_version))
        .route("/:id/versions/current", get(current_version))
}

/// `POST /api/v1/assets/:id/versions`
///
/// - `201 Created` - version appended and made current
/// - `400 Bad Request` - invalid source locator or file id
/// - `404 Not Found` - no such asset
/// - `503 Service Unavailable` - version number still contended after retries
#[tracing::instrument(skip(state, principal, draft), fields(asset_id = %id))]
async fn create_version(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    ApiJson(draft): ApiJson<VersionDraft>,
) -> Result<Response, VersionApiError> {
    let version = super::commands::create::handle(&state, &principal, id, draft).await?;
    Ok(ApiResponse::success(version).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(state, principal), fields(asset_id = %id))]
async fn list_versions(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Response, VersionApiError> {
    let versions = super::queries::list::list(&state, &principal, id).await?;
    Ok(ApiResponse::success(versions).into_response())
}

#[tracing::instrument(skip(state, principal), fields(asset_id = %id))]
async fn current_version(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Response, VersionApiError> {
    let version = super::queries::list::current(&state, &principal, id).await?;
    Ok(ApiResponse::success(version).into_response())
}

/// HTTP mapping shared by every handler that goes through the ledger
pub(crate) fn ledger_error_response(err: &LedgerError) -> Response {
    match err {
        LedgerError::InvalidSource(_) | LedgerError::InvalidField(_) => {
            validation_error(err.to_string())
        },
        LedgerError::AssetNotFound(_) => not_found(err.to_string()),
        LedgerError::ConflictRetriesExhausted { .. } => {
            tracing::error!(error = %err, "Version conflict retries exhausted");
            ErrorResponse::new(
                "VERSION_CONFLICT",
                "The asset is being versioned concurrently; please retry",
            )
            .with_status(StatusCode::SERVICE_UNAVAILABLE)
        },
        LedgerError::Store(store_err) => {
            store_error_response("Storage error in version ledger", store_err)
        },
    }
}

#[derive(Debug, thiserror::Error)]
enum VersionApiError {
    #[error(transparent)]
    Create(#[from] CreateVersionError),
    #[error(transparent)]
    Query(#[from] VersionQueryError),
}

impl IntoResponse for VersionApiError {
    fn into_response(self) -> Response {
        match self {
            VersionApiError::Create(CreateVersionError::Gate(err))
            | VersionApiError::Query(VersionQueryError::Gate(err)) => err.into_response(),
            VersionApiError::Create(CreateVersionError::Ledger(ref err))
            | VersionApiError::Query(VersionQueryError::Ledger(ref err)) => {
                ledger_error_response(err)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_statuses() {
        let exhausted = LedgerError::ConflictRetriesExhausted {
            asset_id: Uuid::nil(),
            attempts: 3,
        };
        assert_eq!(
            ledger_error_response(&exhausted).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ledger_error_response(&LedgerError::AssetNotFound(Uuid::nil())).status(),
            StatusCode::NOT_FOUND
        );
    }
}
