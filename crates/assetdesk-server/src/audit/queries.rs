//! Database queries for the access log

use assetdesk_common::types::{AccessAction, AccessResult};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::models::{AccessLogEntry, AccessLogQuery, NewAccessLogEntry};
use crate::store::{StoreError, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct AccessLogRow {
    id: Uuid,
    occurred_at: DateTime<Utc>,
    principal_id: Option<Uuid>,
    asset_id: Option<Uuid>,
    action: String,
    result: String,
    ip: Option<String>,
    user_agent: Option<String>,
    metadata: Option<JsonValue>,
}

impl TryFrom<AccessLogRow> for AccessLogEntry {
    type Error = StoreError;

    fn try_from(row: AccessLogRow) -> Result<Self, Self::Error> {
        Ok(AccessLogEntry {
            id: row.id,
            occurred_at: row.occurred_at,
            principal_id: row.principal_id,
            asset_id: row.asset_id,
            action: row.action.parse::<AccessAction>()?,
            result: row.result.parse::<AccessResult>()?,
            ip: row.ip,
            user_agent: row.user_agent,
            metadata: row.metadata,
        })
    }
}

const ACCESS_LOG_COLUMNS: &str =
    "id, occurred_at, principal_id, asset_id, action, result, ip, user_agent, metadata";

/// Insert one access log entry
#[tracing::instrument(skip(pool, entry), fields(action = %entry.action, result = %entry.result))]
pub async fn create_access_log_entry(
    pool: &PgPool,
    entry: NewAccessLogEntry,
) -> StoreResult<AccessLogEntry> {
    let row = sqlx::query_as::<_, AccessLogRow>(&format!(
        r#"
        INSERT INTO access_logs (principal_id, asset_id, action, result, ip, user_agent, metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {ACCESS_LOG_COLUMNS}
        "#
    ))
    .bind(entry.principal_id)
    .bind(entry.asset_id)
    .bind(entry.action.as_str())
    .bind(entry.result.as_str())
    .bind(&entry.ip)
    .bind(&entry.user_agent)
    .bind(&entry.metadata)
    .fetch_one(pool)
    .await?;

    debug!(access_log_id = %row.id, "Recorded access log entry");

    row.try_into()
}

/// Query the access log with filters, newest first
///
/// The `WHERE` clause is assembled from whichever filters are set; bind
/// parameters are numbered in the same order they are bound below.
pub async fn query_access_logs(
    pool: &PgPool,
    query: &AccessLogQuery,
) -> StoreResult<Vec<AccessLogEntry>> {
    let mut sql = format!("SELECT {ACCESS_LOG_COLUMNS} FROM access_logs WHERE 1=1");
    let mut bind_count = 1;

    let starts_at = query.starts_at();
    let ends_before = query.ends_before();

    if starts_at.is_some() {
        sql.push_str(&format!(" AND occurred_at >= ${bind_count}"));
        bind_count += 1;
    }
    if ends_before.is_some() {
        sql.push_str(&format!(" AND occurred_at < ${bind_count}"));
        bind_count += 1;
    }
    if query.action.is_some() {
        sql.push_str(&format!(" AND action = ${bind_count}"));
        bind_count += 1;
    }
    if query.result.is_some() {
        sql.push_str(&format!(" AND result = ${bind_count}"));
        bind_count += 1;
    }
    if query.principal_id.is_some() {
        sql.push_str(&format!(" AND principal_id = ${bind_count}"));
        bind_count += 1;
    }
    if query.asset_id.is_some() {
        sql.push_str(&format!(" AND asset_id = ${bind_count}"));
        bind_count += 1;
    }

    sql.push_str(&format!(
        " ORDER BY occurred_at DESC, id DESC LIMIT ${} OFFSET ${}",
        bind_count,
        bind_count + 1
    ));

    let mut builder = sqlx::query_as::<_, AccessLogRow>(&sql);
    if let Some(start) = starts_at {
        builder = builder.bind(start);
    }
    if let Some(end) = ends_before {
        builder = builder.bind(end);
    }
    if let Some(action) = query.action {
        builder = builder.bind(action.as_str());
    }
    if let Some(result) = query.result {
        builder = builder.bind(result.as_str());
    }
    if let Some(principal_id) = query.principal_id {
        builder = builder.bind(principal_id);
    }
    if let Some(asset_id) = query.asset_id {
        builder = builder.bind(asset_id);
    }
    builder = builder.bind(query.limit()).bind(query.offset());

    let rows = builder.fetch_all(pool).await?;

    debug!(count = rows.len(), "Queried access logs");

    rows.into_iter().map(AccessLogEntry::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_common::types::DenialReason;

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_and_filter_access_logs(pool: PgPool) -> StoreResult<()> {
        create_access_log_entry(
            &pool,
            NewAccessLogEntry::builder(AccessAction::Search, AccessResult::Success).build(),
        )
        .await?;
        let denied = create_access_log_entry(
            &pool,
            NewAccessLogEntry::builder(AccessAction::Denied, AccessResult::Denied)
                .ip(Some("10.0.0.7".to_string()))
                .metadata(serde_json::json!({ "reason": DenialReason::PublishStatus }))
                .build(),
        )
        .await?;

        let query = AccessLogQuery {
            result: Some(AccessResult::Denied),
            ..Default::default()
        };
        let rows = query_access_logs(&pool, &query).await?;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, denied.id);
        assert_eq!(
            rows[0].metadata,
            Some(serde_json::json!({ "reason": "PUBLISH_STATUS" }))
        );

        Ok(())
    }
}
