//! Query the access log (admin)

use crate::audit::{AccessLogEntry, AccessLogQuery, MAX_ACCESS_LOG_LIMIT};
use crate::features::shared::gate::{require_admin, GateError};
use crate::features::FeatureState;
use crate::models::Principal;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ListAccessLogsError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("'from' must not be after 'to'")]
    InvertedRange,

    #[error("limit must be between 1 and 1000")]
    InvalidLimit,

    #[error("offset must not be negative")]
    InvalidOffset,

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

fn validate(query: &AccessLogQuery) -> Result<(), ListAccessLogsError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ListAccessLogsError::InvertedRange);
        }
    }
    if matches!(query.limit, Some(limit) if !(1..=MAX_ACCESS_LOG_LIMIT).contains(&limit)) {
        return Err(ListAccessLogsError::InvalidLimit);
    }
    if matches!(query.offset, Some(offset) if offset < 0) {
        return Err(ListAccessLogsError::InvalidOffset);
    }
    Ok(())
}

#[tracing::instrument(skip(state, principal), fields(principal_id = %principal.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    query: AccessLogQuery,
) -> Result<Vec<AccessLogEntry>, ListAccessLogsError> {
    require_admin(principal)?;
    validate(&query)?;
    Ok(state.access_logs.query_access_logs(&query).await?)
}
