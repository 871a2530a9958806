//! Share request API routes
//!
//! - `GET /api/v1/share-requests?status=PENDING` - Own requests, or all for admins
//! - `POST /api/v1/share-requests` - Ask to share a viewable asset
//! - `POST /api/v1/share-requests/:id/approve` - Approve (admin)
//! - `POST /api/v1/share-requests/:id/reject` - Reject (admin)
//! - `POST /api/v1/share-requests/:id/cancel` - Withdraw (requester)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::{
    commands::{
        CreateShareRequestCommand, CreateShareRequestError, DecideShareRequestCommand,
        DecideShareRequestError,
    },
    queries::{ListShareRequestsError, ListShareRequestsQuery},
};
use crate::api::response::{
    conflict, internal_error, not_found, validation_error, ApiResponse, ErrorResponse,
};
use crate::features::shared::{ApiJson, ApiQuery, CurrentPrincipal};
use crate::features::FeatureState;

pub fn share_requests_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_share_requests).post(create_share_request))
        .route("/:id/approve", post(approve_share_request))
        .route("/:id/reject", post(reject_share_request))
        .route("/:id/cancel", post(cancel_share_request))
}

#[tracing::instrument(skip(state, principal, command))]
async fn create_share_request(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiJson(command): ApiJson<CreateShareRequestCommand>,
) -> Result<Response, ShareRequestApiError> {
    let request = super::commands::create::handle(&state, &principal, command).await?;
    Ok(ApiResponse::success(request).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(state, principal, query))]
async fn list_share_requests(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiQuery(query): ApiQuery<ListShareRequestsQuery>,
) -> Result<Response, ShareRequestApiError> {
    let requests = super::queries::list::handle(&state, &principal, query).await?;
    Ok(ApiResponse::success(requests).into_response())
}

/// Body is optional: `{"comment": "..."}`
#[tracing::instrument(skip(state, principal, command), fields(share_request_id = %id))]
async fn approve_share_request(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    command: Option<ApiJson<DecideShareRequestCommand>>,
) -> Result<Response, ShareRequestApiError> {
    let command = command.map(|ApiJson(c)| c).unwrap_or_default();
    let request = super::commands::decide::approve(&state, &principal, id, command).await?;
    Ok(ApiResponse::success(request).into_response())
}

#[tracing::instrument(skip(state, principal, command), fields(share_request_id = %id))]
async fn reject_share_request(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    command: Option<ApiJson<DecideShareRequestCommand>>,
) -> Result<Response, ShareRequestApiError> {
    let command = command.map(|ApiJson(c)| c).unwrap_or_default();
    let request = super::commands::decide::reject(&state, &principal, id, command).await?;
    Ok(ApiResponse::success(request).into_response())
}

#[tracing::instrument(skip(state, principal), fields(share_request_id = %id))]
async fn cancel_share_request(
    State(state): State<FeatureState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Response, ShareRequestApiError> {
    let request = super::commands::decide::cancel(&state, &principal, id).await?;
    Ok(ApiResponse::success(request).into_response())
}

#[derive(Debug, thiserror::Error)]
enum ShareRequestApiError {
    #[error(transparent)]
    Create(#[from] CreateShareRequestError),
    #[error(transparent)]
    Decide(#[from] DecideShareRequestError),
    #[error(transparent)]
    List(#[from] ListShareRequestsError),
}

fn forbidden(message: &str) -> Response {
    ErrorResponse::new("FORBIDDEN", message).with_status(StatusCode::FORBIDDEN)
}

impl IntoResponse for ShareRequestApiError {
    fn into_response(self) -> Response {
        match self {
            ShareRequestApiError::Create(CreateShareRequestError::Gate(err))
            | ShareRequestApiError::Decide(DecideShareRequestError::Gate(err)) => {
                err.into_response()
            },
            ShareRequestApiError::Create(CreateShareRequestError::Field(ref err)) => {
                validation_error(err.to_string())
            },
            ShareRequestApiError::Create(CreateShareRequestError::Store(ref err)) => {
                internal_error("Storage error while creating share request", err)
            },

            ShareRequestApiError::Decide(ref err @ DecideShareRequestError::NotFound(_)) => {
                not_found(err.to_string())
            },
            ShareRequestApiError::Decide(ref err @ DecideShareRequestError::NotRequester)
            | ShareRequestApiError::Decide(
                ref err @ DecideShareRequestError::RequesterLostAccess,
            ) => forbidden(&err.to_string()),
            ShareRequestApiError::Decide(ref err @ DecideShareRequestError::NotPending { .. }) => {
                conflict(err.to_string())
            },
            ShareRequestApiError::Decide(DecideShareRequestError::Store(ref err)) => {
                internal_error("Storage error during share request transition", err)
            },

            ShareRequestApiError::List(ref err @ ListShareRequestsError::InvalidStatus(_)) => {
                validation_error(err.to_string())
            },
            ShareRequestApiError::List(ListShareRequestsError::Store(ref err)) => {
                internal_error("Storage error while listing share requests", err)
            },
        }
    }
}
