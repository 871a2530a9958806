//! Version history rows and the current-version pointer

use assetdesk_common::types::SourceKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgStore;
use crate::features::shared::error_helpers::conflict_or_database;
use crate::models::AssetVersion;
use crate::store::{NewVersion, StoreError, StoreResult, VersionStore};

#[derive(Debug, sqlx::FromRow)]
struct VersionRow {
    id: Uuid,
    asset_id: Uuid,
    version_no: i32,
    source_kind: String,
    source_locator: String,
    source_file_id: Option<String>,
    created_by: Option<Uuid>,
    note: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<VersionRow> for AssetVersion {
    type Error = StoreError;

    fn try_from(row: VersionRow) -> Result<Self, Self::Error> {
        Ok(AssetVersion {
            id: row.id,
            asset_id: row.asset_id,
            version_no: row.version_no,
            source_kind: row.source_kind.parse::<SourceKind>()?,
            source_locator: row.source_locator,
            source_file_id: row.source_file_id,
            created_by: row.created_by,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

const VERSION_COLUMNS: &str = "id, asset_id, version_no, source_kind, source_locator, \
                               source_file_id, created_by, note, created_at";

impl PgStore {
    async fn asset_exists(&self, asset_id: Uuid) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM assets WHERE id = $1)")
            .bind(asset_id)
            .fetch_one(self.pool())
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl VersionStore for PgStore {
    /// Numbering, insert and pointer move share one transaction. The asset
    /// row lock serialises writers on the same asset; the unique constraint
    /// on `(asset_id, version_no)` still catches anything that slips past it.
    #[tracing::instrument(skip(self, version))]
    async fn append_version(
        &self,
        asset_id: Uuid,
        version: NewVersion,
    ) -> StoreResult<AssetVersion> {
        let mut tx = self.pool().begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM assets WHERE id = $1 FOR UPDATE")
                .bind(asset_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::not_found("asset", asset_id));
        }

        let next_no: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(version_no), 0) + 1 FROM asset_versions WHERE asset_id = $1",
        )
        .bind(asset_id)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, VersionRow>(&format!(
            r#"
            INSERT INTO asset_versions
                (asset_id, version_no, source_kind, source_locator, source_file_id, created_by, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {VERSION_COLUMNS}
            "#
        ))
        .bind(asset_id)
        .bind(next_no)
        .bind(version.source_kind.as_str())
        .bind(&version.source_locator)
        .bind(&version.source_file_id)
        .bind(version.created_by)
        .bind(&version.note)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_or_database(e, "version number already taken"))?;

        sqlx::query("UPDATE assets SET latest_version_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(asset_id)
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.try_into()
    }

    async fn list_versions(&self, asset_id: Uuid) -> StoreResult<Vec<AssetVersion>> {
        if !self.asset_exists(asset_id).await? {
            return Err(StoreError::not_found("asset", asset_id));
        }

        let rows = sqlx::query_as::<_, VersionRow>(&format!(
            "SELECT {VERSION_COLUMNS} FROM asset_versions WHERE asset_id = $1 \
             ORDER BY version_no DESC"
        ))
        .bind(asset_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(AssetVersion::try_from).collect()
    }

    async fn current_version(&self, asset_id: Uuid) -> StoreResult<Option<AssetVersion>> {
        let pointer: Option<Option<Uuid>> =
            sqlx::query_scalar("SELECT latest_version_id FROM assets WHERE id = $1")
                .bind(asset_id)
                .fetch_optional(self.pool())
                .await?;

        let Some(pointer) = pointer else {
            return Err(StoreError::not_found("asset", asset_id));
        };
        let Some(version_id) = pointer else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, VersionRow>(&format!(
            "SELECT {VERSION_COLUMNS} FROM asset_versions WHERE id = $1"
        ))
        .bind(version_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(AssetVersion::try_from).transpose()
    }
}
