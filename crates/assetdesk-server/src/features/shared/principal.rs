//! Request principal and client metadata extractors
//!
//! The upstream gateway authenticates the caller and forwards the user id in
//! the `x-user-id` header. [`CurrentPrincipal`] resolves it through the
//! state's [`PrincipalResolver`](crate::store::PrincipalResolver); any
//! failure is a 401.

use std::net::IpAddr;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::api::response::ErrorResponse;
use crate::features::FeatureState;
use crate::models::Principal;
use crate::store::StoreError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated, active principal making the request
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

#[derive(Debug, thiserror::Error)]
pub enum AuthRejection {
    #[error("Missing x-user-id header")]
    MissingHeader,

    #[error("x-user-id header is not a valid UUID")]
    InvalidHeader,

    #[error("Unknown user '{0}'")]
    UnknownUser(Uuid),

    #[error("User '{0}' is inactive")]
    Inactive(Uuid),

    #[error("Principal lookup failed: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Store(ref err) => {
                tracing::error!(error = %err, "Principal lookup failed");
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            other => {
                tracing::debug!(reason = %other, "Rejected unauthenticated request");
                let error = ErrorResponse::new("UNAUTHORIZED", "Authentication required");
                (StatusCode::UNAUTHORIZED, Json(error)).into_response()
            },
        }
    }
}

fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, AuthRejection> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or(AuthRejection::MissingHeader)?
        .to_str()
        .map_err(|_| AuthRejection::InvalidHeader)?;
    Uuid::parse_str(raw.trim()).map_err(|_| AuthRejection::InvalidHeader)
}

#[axum::async_trait]
impl FromRequestParts<FeatureState> for CurrentPrincipal {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FeatureState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_headers(&parts.headers)?;

        let principal = state
            .principals
            .resolve_principal(user_id)
            .await?
            .ok_or(AuthRejection::UnknownUser(user_id))?;

        if !principal.active {
            return Err(AuthRejection::Inactive(user_id));
        }

        Ok(CurrentPrincipal(principal))
    }
}

/// Client address and agent recorded with access log entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// First hop of `x-forwarded-for`, falling back to `x-real-ip`
    ///
    /// Values that are not IP addresses are dropped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let parse_ip = |value: &str| value.trim().parse::<IpAddr>().ok();

        let ip = header("x-forwarded-for")
            .and_then(|value| value.split(',').next())
            .and_then(parse_ip)
            .or_else(|| header("x-real-ip").and_then(parse_ip))
            .map(|addr| addr.to_string());

        Self {
            ip,
            user_agent: header("user-agent").map(str::to_string),
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo::from_headers(&parts.headers))
    }
}
