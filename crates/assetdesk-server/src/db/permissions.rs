//! Access rule rows

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgStore;
use crate::models::{AccessRule, RuleSpec, Subject};
use crate::store::{RuleStore, StoreError, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    id: Uuid,
    asset_id: Uuid,
    subject_type: String,
    subject_id: String,
    can_view: bool,
    can_download: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<RuleRow> for AccessRule {
    type Error = StoreError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        let subject = Subject::parse(&row.subject_type, &row.subject_id)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(AccessRule {
            id: row.id,
            asset_id: row.asset_id,
            subject,
            can_view: row.can_view,
            can_download: row.can_download,
            created_at: row.created_at,
        })
    }
}

const RULE_COLUMNS: &str =
    "id, asset_id, subject_type, subject_id, can_view, can_download, created_at";

#[async_trait]
impl RuleStore for PgStore {
    async fn rules_for(&self, asset_id: Uuid) -> StoreResult<Vec<AccessRule>> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {RULE_COLUMNS} FROM asset_permissions WHERE asset_id = $1 \
             ORDER BY created_at, subject_type, subject_id"
        ))
        .bind(asset_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(AccessRule::try_from).collect()
    }

    async fn rules_for_assets(
        &self,
        asset_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, Vec<AccessRule>>> {
        if asset_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {RULE_COLUMNS} FROM asset_permissions WHERE asset_id = ANY($1) \
             ORDER BY created_at, subject_type, subject_id"
        ))
        .bind(asset_ids)
        .fetch_all(self.pool())
        .await?;

        let mut grouped: HashMap<Uuid, Vec<AccessRule>> = HashMap::new();
        for row in rows {
            let rule = AccessRule::try_from(row)?;
            grouped.entry(rule.asset_id).or_default().push(rule);
        }
        Ok(grouped)
    }

    /// Delete and re-insert under the asset row lock, in one transaction
    #[tracing::instrument(skip(self, rules), fields(count = rules.len()))]
    async fn replace_rules(
        &self,
        asset_id: Uuid,
        rules: Vec<RuleSpec>,
    ) -> StoreResult<Vec<AccessRule>> {
        let mut tx = self.pool().begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM assets WHERE id = $1 FOR UPDATE")
                .bind(asset_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::not_found("asset", asset_id));
        }

        sqlx::query("DELETE FROM asset_permissions WHERE asset_id = $1")
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(rules.len());
        for rule in rules {
            let row = sqlx::query_as::<_, RuleRow>(&format!(
                r#"
                INSERT INTO asset_permissions
                    (asset_id, subject_type, subject_id, can_view, can_download)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {RULE_COLUMNS}
                "#
            ))
            .bind(asset_id)
            .bind(rule.subject.subject_type().as_str())
            .bind(rule.subject.subject_id())
            .bind(rule.can_view)
            .bind(rule.can_download)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(AccessRule::try_from(row)?);
        }

        tx.commit().await?;

        tracing::debug!(%asset_id, count = stored.len(), "Replaced access rules");

        Ok(stored)
    }
}
