//! Permission API routes
//!
//! Merged into the `/assets` router:
//!
//! - `GET /api/v1/assets/:id/permissions` - Current rules (admin)
//! - `PUT /api/v1/assets/:id/permissions` - Replace all rules (admin)
//!
//! ```json
//! {
//!   "rules": [
//!     {"subject_type": "DEPT", "subject_id": "6f1c...", "can_view": true, "can_download": false},
//!     {"subject_type": "ROLE", "subject_id": "USER"}
//!   ]
//! }
//! ```

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use uuid::Uuid;

use super::commands::{SetPermissionsCommand, SetPermissionsError};
use crate::api::response::{internal_error, not_found, validation_error, ApiResponse};
use crate::features::shared::{ApiJson, CurrentPrincipal, GateError};
use crate::features::FeatureState;

pub fn permissions_routes() -> Router<FeatureState> {
    Router::new().route("/:id/permissions", get(list_permissions).put(set_permissions))
}

#[tracing::instrument(skip(state, principal, command), fields(asset_id = %id))]
async fn set_permissions(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    ApiJson(command): ApiJson<SetPermissionsCommand>,
) -> Result<Response, PermissionApiError> {
    let rules = super::commands::set::handle(&state, &principal, id, command).await?;
    Ok(ApiResponse::success(rules).into_response())
}

#[tracing::instrument(skip(state, principal), fields(asset_id = %id))]
async fn list_permissions(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Response, PermissionApiError> {
    let rules = super::queries::list::handle(&state, &principal, id).await?;
    Ok(ApiResponse::success(rules).into_response())
}

#[derive(Debug, thiserror::Error)]
enum PermissionApiError {
    #[error(transparent)]
    Set(#[from] SetPermissionsError),
    #[error(transparent)]
    Gate(#[from] GateError),
}

impl IntoResponse for PermissionApiError {
    fn into_response(self) -> Response {
        match self {
            PermissionApiError::Set(SetPermissionsError::Gate(err))
            | PermissionApiError::Gate(err) => err.into_response(),
            PermissionApiError::Set(ref err @ SetPermissionsError::InvalidRule { .. }) => {
                validation_error(err.to_string())
            },
            PermissionApiError::Set(ref err @ SetPermissionsError::NotFound(_)) => {
                not_found(err.to_string())
            },
            PermissionApiError::Set(SetPermissionsError::Store(ref err)) => {
                internal_error("Storage error while replacing access rules", err)
            },
        }
    }
}
