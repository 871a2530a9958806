//! Share request rows

use assetdesk_common::types::ShareStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgStore;
use crate::features::shared::error_helpers::reference_or_database;
use crate::models::ShareRequest;
use crate::store::{
    NewShareRequest, ShareRequestFilter, ShareRequestStore, ShareTransition, StoreError,
    StoreResult,
};

#[derive(Debug, sqlx::FromRow)]
struct ShareRequestRow {
    id: Uuid,
    asset_id: Uuid,
    requester_id: Uuid,
    reason: String,
    status: String,
    decided_by: Option<Uuid>,
    comment: String,
    decided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ShareRequestRow> for ShareRequest {
    type Error = StoreError;

    fn try_from(row: ShareRequestRow) -> Result<Self, Self::Error> {
        Ok(ShareRequest {
            id: row.id,
            asset_id: row.asset_id,
            requester_id: row.requester_id,
            reason: row.reason,
            status: row.status.parse::<ShareStatus>()?,
            decided_by: row.decided_by,
            comment: row.comment,
            decided_at: row.decided_at,
            created_at: row.created_at,
        })
    }
}

const SHARE_REQUEST_COLUMNS: &str = "id, asset_id, requester_id, reason, status, decided_by, \
                                     comment, decided_at, created_at";

#[async_trait]
impl ShareRequestStore for PgStore {
    async fn insert_share_request(&self, request: NewShareRequest) -> StoreResult<ShareRequest> {
        let row = sqlx::query_as::<_, ShareRequestRow>(&format!(
            r#"
            INSERT INTO share_requests (asset_id, requester_id, reason)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM assets WHERE id = $1)
            RETURNING {SHARE_REQUEST_COLUMNS}
            "#
        ))
        .bind(request.asset_id)
        .bind(request.requester_id)
        .bind(&request.reason)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| reference_or_database(e, "Unknown requester"))?;

        row.ok_or_else(|| StoreError::not_found("asset", request.asset_id))?
            .try_into()
    }

    async fn get_share_request(&self, id: Uuid) -> StoreResult<Option<ShareRequest>> {
        let row = sqlx::query_as::<_, ShareRequestRow>(&format!(
            "SELECT {SHARE_REQUEST_COLUMNS} FROM share_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(ShareRequest::try_from).transpose()
    }

    async fn list_share_requests(
        &self,
        filter: &ShareRequestFilter,
    ) -> StoreResult<Vec<ShareRequest>> {
        let mut sql = format!("SELECT {SHARE_REQUEST_COLUMNS} FROM share_requests WHERE 1=1");
        let mut bind_count = 1;

        if filter.status.is_some() {
            sql.push_str(&format!(" AND status = ${bind_count}"));
            bind_count += 1;
        }
        if filter.requester_id.is_some() {
            sql.push_str(&format!(" AND requester_id = ${bind_count}"));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut builder = sqlx::query_as::<_, ShareRequestRow>(&sql);
        if let Some(status) = filter.status {
            builder = builder.bind(status.as_str());
        }
        if let Some(requester_id) = filter.requester_id {
            builder = builder.bind(requester_id);
        }

        let rows = builder.fetch_all(self.pool()).await?;
        rows.into_iter().map(ShareRequest::try_from).collect()
    }

    /// Guarded by `status = 'PENDING'` in the `UPDATE` itself, so two
    /// concurrent decisions cannot both succeed.
    #[tracing::instrument(skip(self, transition), fields(to = %transition.to))]
    async fn transition_share_request(
        &self,
        id: Uuid,
        transition: ShareTransition,
    ) -> StoreResult<ShareRequest> {
        let row = sqlx::query_as::<_, ShareRequestRow>(&format!(
            r#"
            UPDATE share_requests
            SET status = $2, decided_by = $3, comment = $4, decided_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING {SHARE_REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(transition.to.as_str())
        .bind(transition.decided_by)
        .bind(&transition.comment)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => match self.get_share_request(id).await? {
                Some(current) => Err(StoreError::Conflict(format!(
                    "Share request {id} is already {}",
                    current.status
                ))),
                None => Err(StoreError::not_found("share request", id)),
            },
        }
    }
}
