//! Asset API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/assets` - List assets visible to the caller
//! - `POST /api/v1/assets` - Create an asset (admin)
//! - `GET /api/v1/assets/:id` - Asset detail, access logged
//! - `PATCH /api/v1/assets/:id` - Partial update (admin)
//! - `DELETE /api/v1/assets/:id` - Delete (admin)
//! - `GET /api/v1/assets/:id/download` - Download gate, access logged

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use uuid::Uuid;

use super::{
    commands::{
        CreateAssetCommand, CreateAssetError, DeleteAssetError, UpdateAssetCommand,
        UpdateAssetError,
    },
    queries::{DownloadAssetError, GetAssetError, ListAssetsError, ListAssetsQuery},
};
use crate::api::response::{
    internal_error, not_found, store_error_response, validation_error, ApiResponse,
};
use crate::features::shared::{ApiJson, ApiQuery, ClientInfo, CurrentPrincipal};
use crate::features::versions::routes::ledger_error_response;
use crate::features::FeatureState;

pub fn assets_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route("/:id", get(get_asset).patch(update_asset).delete(delete_asset))
        .route("/:id/download", get(download_asset))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// `POST /api/v1/assets`
///
/// - `201 Created` - asset created (with version 1 when `initial_version` is given)
/// - `400 Bad Request` - validation error
/// - `403 Forbidden` - caller is not an administrator
#[tracing::instrument(skip(state, principal, command))]
async fn create_asset(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiJson(command): ApiJson<CreateAssetCommand>,
) -> Result<Response, AssetApiError> {
    let detail = super::commands::create::handle(&state, &principal, command).await?;
    Ok(ApiResponse::success(detail).with_status(StatusCode::CREATED))
}

/// `PATCH /api/v1/assets/:id`
#[tracing::instrument(skip(state, principal, command), fields(asset_id = %id))]
async fn update_asset(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    ApiJson(mut command): ApiJson<UpdateAssetCommand>,
) -> Result<Response, AssetApiError> {
    command.id = id;
    let detail = super::commands::update::handle(&state, &principal, command).await?;
    Ok(ApiResponse::success(detail).into_response())
}

/// `DELETE /api/v1/assets/:id`
#[tracing::instrument(skip(state, principal), fields(asset_id = %id))]
async fn delete_asset(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Response, AssetApiError> {
    let response = super::commands::delete::handle(&state, &principal, id).await?;
    Ok(ApiResponse::success(response).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// `GET /api/v1/assets?type=VIDEO&categoryId=..&tag=..&q=..&page=1&per_page=20`
#[tracing::instrument(skip(state, principal, query))]
async fn list_assets(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiQuery(query): ApiQuery<ListAssetsQuery>,
) -> Result<Response, AssetApiError> {
    let page = super::queries::list::handle(&state, &principal, query).await?;
    let meta = json!({ "pagination": page.pagination });
    Ok(ApiResponse::success_with_meta(page.items, meta).into_response())
}

/// `GET /api/v1/assets/:id`
///
/// - `404 Not Found` - no such asset
/// - `403 Forbidden` - asset exists but the caller may not view it
#[tracing::instrument(skip(state, principal, client), fields(asset_id = %id))]
async fn get_asset(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<Response, AssetApiError> {
    let detail = super::queries::get::handle(&state, &principal, id, &client).await?;
    Ok(ApiResponse::success(detail).into_response())
}

/// `GET /api/v1/assets/:id/download`
#[tracing::instrument(skip(state, principal, client), fields(asset_id = %id))]
async fn download_asset(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<Response, AssetApiError> {
    let response = super::queries::download::handle(&state, &principal, id, &client).await?;
    Ok(ApiResponse::success(response).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum AssetApiError {
    #[error(transparent)]
    Create(#[from] CreateAssetError),
    #[error(transparent)]
    Update(#[from] UpdateAssetError),
    #[error(transparent)]
    Delete(#[from] DeleteAssetError),
    #[error(transparent)]
    Get(#[from] GetAssetError),
    #[error(transparent)]
    List(#[from] ListAssetsError),
    #[error(transparent)]
    Download(#[from] DownloadAssetError),
}

impl IntoResponse for AssetApiError {
    fn into_response(self) -> Response {
        match self {
            // Create errors
            AssetApiError::Create(CreateAssetError::Gate(err)) => err.into_response(),
            AssetApiError::Create(CreateAssetError::Field(err)) => {
                validation_error(err.to_string())
            },
            AssetApiError::Create(CreateAssetError::Version(ref err)) => ledger_error_response(err),
            AssetApiError::Create(CreateAssetError::Store(ref err)) => {
                store_error_response("Storage error during asset creation", err)
            },

            // Update errors
            AssetApiError::Update(UpdateAssetError::Gate(err)) => err.into_response(),
            AssetApiError::Update(
                ref err @ (UpdateAssetError::NoFieldsToUpdate | UpdateAssetError::Field(_)),
            ) => validation_error(err.to_string()),
            AssetApiError::Update(ref err @ UpdateAssetError::NotFound(_)) => {
                not_found(err.to_string())
            },
            AssetApiError::Update(UpdateAssetError::Version(ref err)) => ledger_error_response(err),
            AssetApiError::Update(UpdateAssetError::Store(ref err)) => {
                store_error_response("Storage error during asset update", err)
            },

            // Delete errors
            AssetApiError::Delete(DeleteAssetError::Gate(err)) => err.into_response(),
            AssetApiError::Delete(ref err @ DeleteAssetError::NotFound(_)) => {
                not_found(err.to_string())
            },
            AssetApiError::Delete(DeleteAssetError::Store(ref err)) => {
                internal_error("Storage error during asset deletion", err)
            },

            // Query errors
            AssetApiError::Get(GetAssetError::Gate(err)) => err.into_response(),
            AssetApiError::Get(GetAssetError::Version(ref err)) => ledger_error_response(err),

            AssetApiError::List(
                ref err @ (ListAssetsError::InvalidType(_) | ListAssetsError::InvalidPagination(_)),
            ) => validation_error(err.to_string()),
            AssetApiError::List(ListAssetsError::Store(ref err)) => {
                internal_error("Storage error during asset listing", err)
            },

            AssetApiError::Download(DownloadAssetError::Gate(err)) => err.into_response(),
            AssetApiError::Download(ref err @ DownloadAssetError::NoVersion(_)) => {
                not_found(err.to_string())
            },
            AssetApiError::Download(DownloadAssetError::Version(ref err)) => {
                ledger_error_response(err)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::GateError;
    use assetdesk_common::types::DenialReason;

    #[test]
    fn test_error_statuses() {
        let cases = [
            (
                AssetApiError::Get(GetAssetError::Gate(GateError::NotFound(Uuid::nil()))),
                StatusCode::NOT_FOUND,
            ),
            (
                AssetApiError::Get(GetAssetError::Gate(GateError::Denied(DenialReason::Acl))),
                StatusCode::FORBIDDEN,
            ),
            (
                AssetApiError::Update(UpdateAssetError::NoFieldsToUpdate),
                StatusCode::BAD_REQUEST,
            ),
            (
                AssetApiError::Download(DownloadAssetError::NoVersion(Uuid::nil())),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
