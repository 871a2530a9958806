//! Asset rows and tag links

use assetdesk_common::types::{AssetType, PublishStatus, SecurityLabel, ViewScope};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{escape_like, PgStore};
use crate::features::shared::error_helpers::reference_or_database;
use crate::models::Asset;
use crate::store::{AssetFilter, AssetPatch, AssetStore, NewAsset, StoreError, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct AssetRow {
    id: Uuid,
    asset_type: String,
    category_id: Option<Uuid>,
    title: String,
    description: String,
    publish_status: String,
    view_scope: String,
    download_allowed: bool,
    security_label: String,
    owner_id: Option<Uuid>,
    latest_version_id: Option<Uuid>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AssetRow> for Asset {
    type Error = StoreError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: row.id,
            asset_type: row.asset_type.parse::<AssetType>()?,
            category_id: row.category_id,
            title: row.title,
            description: row.description,
            publish_status: row.publish_status.parse::<PublishStatus>()?,
            view_scope: row.view_scope.parse::<ViewScope>()?,
            download_allowed: row.download_allowed,
            security_label: row.security_label.parse::<SecurityLabel>()?,
            owner_id: row.owner_id,
            current_version_id: row.latest_version_id,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ASSET_SELECT: &str = r#"
    SELECT a.id, a.type AS asset_type, a.category_id, a.title, a.description,
           a.publish_status, a.view_scope, a.download_allowed, a.security_label,
           a.owner_id, a.latest_version_id,
           COALESCE(
               (SELECT array_agg(t.name::text ORDER BY t.name)
                FROM asset_tags atg
                JOIN tags t ON t.id = atg.tag_id
                WHERE atg.asset_id = a.id),
               '{}'::text[]
           ) AS tags,
           a.created_at, a.updated_at
    FROM assets a
"#;

/// Upsert each tag name and link it to the asset
async fn link_tags(
    tx: &mut Transaction<'_, Postgres>,
    asset_id: Uuid,
    tags: &[String],
) -> StoreResult<()> {
    for name in tags {
        let tag_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO tags (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO asset_tags (asset_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(asset_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

impl PgStore {
    async fn fetch_asset(&self, id: Uuid) -> StoreResult<Option<Asset>> {
        let row = sqlx::query_as::<_, AssetRow>(&format!("{ASSET_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.map(Asset::try_from).transpose()
    }
}

#[async_trait]
impl AssetStore for PgStore {
    #[tracing::instrument(skip(self, asset), fields(title = %asset.title))]
    async fn insert_asset(&self, asset: NewAsset) -> StoreResult<Asset> {
        let mut tx = self.pool().begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO assets
                (type, category_id, title, description, view_scope,
                 download_allowed, security_label, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(asset.asset_type.as_str())
        .bind(asset.category_id)
        .bind(&asset.title)
        .bind(&asset.description)
        .bind(asset.view_scope.as_str())
        .bind(asset.download_allowed)
        .bind(asset.security_label.as_str())
        .bind(asset.owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| reference_or_database(e, "Unknown category or owner"))?;

        link_tags(&mut tx, id, &asset.tags).await?;
        tx.commit().await?;

        self.fetch_asset(id)
            .await?
            .ok_or_else(|| StoreError::not_found("asset", id))
    }

    async fn get_asset(&self, id: Uuid) -> StoreResult<Option<Asset>> {
        self.fetch_asset(id).await
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update_asset(&self, id: Uuid, patch: AssetPatch) -> StoreResult<Asset> {
        let result = sqlx::query(
            r#"
            UPDATE assets SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                publish_status = COALESCE($4, publish_status),
                view_scope = COALESCE($5, view_scope),
                download_allowed = COALESCE($6, download_allowed),
                security_label = COALESCE($7, security_label),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.publish_status.map(|s| s.as_str()))
        .bind(patch.view_scope.map(|s| s.as_str()))
        .bind(patch.download_allowed)
        .bind(patch.security_label.map(|s| s.as_str()))
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("asset", id));
        }

        self.fetch_asset(id)
            .await?
            .ok_or_else(|| StoreError::not_found("asset", id))
    }

    async fn delete_asset(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("asset", id));
        }
        Ok(())
    }

    /// The `WHERE` clause is assembled from whichever filters are set; bind
    /// parameters are numbered in the same order they are bound below.
    async fn list_assets(&self, filter: &AssetFilter) -> StoreResult<Vec<Asset>> {
        let mut sql = format!("{ASSET_SELECT} WHERE 1=1");
        let mut bind_count = 1;

        if filter.asset_type.is_some() {
            sql.push_str(&format!(" AND a.type = ${bind_count}"));
            bind_count += 1;
        }
        if filter.category_id.is_some() {
            sql.push_str(&format!(" AND a.category_id = ${bind_count}"));
            bind_count += 1;
        }
        if filter.tag.is_some() {
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM asset_tags atg JOIN tags t ON t.id = atg.tag_id \
                 WHERE atg.asset_id = a.id AND LOWER(t.name) = LOWER(${bind_count}))"
            ));
            bind_count += 1;
        }
        if filter.title_contains.is_some() {
            sql.push_str(&format!(" AND a.title ILIKE '%' || ${bind_count} || '%'"));
        }
        sql.push_str(" ORDER BY a.updated_at DESC, a.id DESC");

        let mut builder = sqlx::query_as::<_, AssetRow>(&sql);
        if let Some(asset_type) = filter.asset_type {
            builder = builder.bind(asset_type.as_str());
        }
        if let Some(category_id) = filter.category_id {
            builder = builder.bind(category_id);
        }
        if let Some(ref tag) = filter.tag {
            builder = builder.bind(tag.trim().to_string());
        }
        if let Some(ref needle) = filter.title_contains {
            builder = builder.bind(escape_like(needle));
        }

        let rows = builder.fetch_all(self.pool()).await?;
        rows.into_iter().map(Asset::try_from).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        super::health_check(self.pool()).await?;
        Ok(())
    }
}
