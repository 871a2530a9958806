//! Access log API routes
//!
//! - `GET /api/v1/access-logs?from=2025-01-01&to=2025-01-31&action=DOWNLOAD&result=DENIED&limit=100&offset=0`

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::queries::ListAccessLogsError;
use crate::api::response::{internal_error, validation_error, ApiResponse};
use crate::audit::AccessLogQuery;
use crate::features::shared::{ApiQuery, CurrentPrincipal};
use crate::features::FeatureState;

pub fn access_logs_routes() -> Router<FeatureState> {
    Router::new().route("/", get(list_access_logs))
}

#[tracing::instrument(skip(state, principal, query))]
async fn list_access_logs(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiQuery(query): ApiQuery<AccessLogQuery>,
) -> Result<Response, AccessLogApiError> {
    let meta = json!({ "limit": query.limit(), "offset": query.offset() });
    let entries = super::queries::list::handle(&state, &principal, query).await?;
    Ok(ApiResponse::success_with_meta(entries, meta).into_response())
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct AccessLogApiError(#[from] ListAccessLogsError);

impl IntoResponse for AccessLogApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ListAccessLogsError::Gate(err) => err.into_response(),
            ref err @ (ListAccessLogsError::InvertedRange
            | ListAccessLogsError::InvalidLimit
            | ListAccessLogsError::InvalidOffset) => validation_error(err.to_string()),
            ListAccessLogsError::Store(ref err) => {
                internal_error("Storage error while querying access logs", err)
            },
        }
    }
}
