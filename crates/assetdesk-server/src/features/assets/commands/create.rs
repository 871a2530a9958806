//! Create asset command
//!
//! Admin-only. The asset starts as DRAFT and is owned by the creating
//! principal. An optional initial version goes through the version ledger,
//! so it is number 1 and becomes current. If that version cannot be
//! recorded the asset is deleted again and the error is returned.

use assetdesk_common::types::{AssetType, SecurityLabel, ViewScope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::assets::types::AssetDetail;
use crate::features::shared::gate::{require_admin, GateError};
use crate::features::shared::validation::{
    validate_max_length, validate_title, TextValidationError,
};
use crate::features::FeatureState;
use crate::ledger::{LedgerError, VersionDraft};
use crate::models::{Principal, MAX_TAG_LENGTH, MAX_TITLE_LENGTH};
use crate::store::{normalize_tags, NewAsset, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssetCommand {
    #[serde(rename = "type")]
    pub asset_type: AssetType,

    #[serde(default)]
    pub category_id: Option<Uuid>,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub view_scope: ViewScope,

    #[serde(default)]
    pub download_allowed: bool,

    #[serde(default)]
    pub security_label: SecurityLabel,

    /// Source of version 1, if known at creation time
    #[serde(default)]
    pub initial_version: Option<VersionDraft>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateAssetError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("{0}")]
    Field(#[from] TextValidationError),

    #[error("{0}")]
    Version(#[from] LedgerError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

impl CreateAssetCommand {
    pub fn validate(&self) -> Result<(), CreateAssetError> {
        validate_title(&self.title, MAX_TITLE_LENGTH)?;
        for tag in &self.tags {
            validate_max_length(tag.trim(), "tag", MAX_TAG_LENGTH)?;
        }
        if let Some(ref draft) = self.initial_version {
            draft.validate()?;
        }
        Ok(())
    }
}

#[tracing::instrument(
    skip(state, principal, command),
    fields(principal_id = %principal.id, title = %command.title)
)]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    command: CreateAssetCommand,
) -> Result<AssetDetail, CreateAssetError> {
    require_admin(principal)?;
    command.validate()?;

    let asset = state
        .assets
        .insert_asset(NewAsset {
            asset_type: command.asset_type,
            category_id: command.category_id,
            title: command.title.trim().to_string(),
            description: command.description,
            view_scope: command.view_scope,
            download_allowed: command.download_allowed,
            security_label: command.security_label,
            owner_id: Some(principal.id),
            tags: normalize_tags(&command.tags),
        })
        .await?;

    tracing::info!(asset_id = %asset.id, "Asset created");

    let Some(draft) = command.initial_version else {
        return Ok(AssetDetail::new(asset, None));
    };

    let version = match state.ledger.create_version(asset.id, draft, principal).await {
        Ok(version) => version,
        Err(err) => {
            tracing::warn!(
                asset_id = %asset.id,
                error = %err,
                "Initial version failed, removing asset"
            );
            if let Err(cleanup) = state.assets.delete_asset(asset.id).await {
                tracing::error!(
                    asset_id = %asset.id,
                    error = %cleanup,
                    "Failed to remove asset without version"
                );
            }
            return Err(err.into());
        },
    };
    let asset = state
        .assets
        .get_asset(asset.id)
        .await?
        .ok_or_else(|| StoreError::not_found("asset", asset.id))?;

    Ok(AssetDetail::new(asset, Some(version)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{admin, user, TestFixture};
    use crate::ledger::VersionLedger;
    use crate::models::AssetVersion;
    use crate::store::{NewVersion, StoreResult, VersionStore};
    use assetdesk_common::types::{PublishStatus, SourceKind};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Every append loses the race
    struct AlwaysConflicting;

    #[async_trait]
    impl VersionStore for AlwaysConflicting {
        async fn append_version(&self, _: Uuid, _: NewVersion) -> StoreResult<AssetVersion> {
            Err(StoreError::Conflict("duplicate version_no".to_string()))
        }

        async fn list_versions(&self, _: Uuid) -> StoreResult<Vec<AssetVersion>> {
            Ok(Vec::new())
        }

        async fn current_version(&self, _: Uuid) -> StoreResult<Option<AssetVersion>> {
            Ok(None)
        }
    }

    fn url_draft(locator: &str) -> VersionDraft {
        VersionDraft {
            source_kind: SourceKind::Url,
            source_locator: locator.to_string(),
            source_file_id: None,
            note: None,
        }
    }

    fn command(title: &str) -> CreateAssetCommand {
        CreateAssetCommand {
            asset_type: AssetType::Video,
            category_id: None,
            title: title.to_string(),
            description: "Quarterly overview".to_string(),
            tags: vec![" pricing ".to_string(), "Q3".to_string(), "pricing".to_string()],
            view_scope: ViewScope::AllUsers,
            download_allowed: false,
            security_label: SecurityLabel::L2,
            initial_version: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_draft() {
        let fixture = TestFixture::new().await;
        let creator = admin();

        let detail = handle(&fixture.state, &creator, command("Q3 pricing")).await.unwrap();
        assert_eq!(detail.asset.publish_status, PublishStatus::Draft);
        assert_eq!(detail.asset.owner_id, Some(creator.id));
        assert_eq!(detail.asset.tags, vec!["Q3".to_string(), "pricing".to_string()]);
        assert!(detail.current_version.is_none());
    }

    #[tokio::test]
    async fn test_create_with_initial_version() {
        let fixture = TestFixture::new().await;
        let mut cmd = command("Launch video");
        cmd.initial_version = Some(url_draft("https://videos.example.com/launch"));

        let detail = handle(&fixture.state, &admin(), cmd).await.unwrap();
        let version = detail.current_version.unwrap();
        assert_eq!(version.version_no, 1);
        assert_eq!(detail.asset.current_version_id, Some(version.id));
    }

    #[tokio::test]
    async fn test_invalid_initial_version_writes_nothing() {
        let fixture = TestFixture::new().await;
        let mut cmd = command("Broken");
        cmd.initial_version = Some(VersionDraft {
            source_kind: SourceKind::Url,
            source_locator: "not a url".to_string(),
            source_file_id: None,
            note: None,
        });

        let err = handle(&fixture.state, &admin(), cmd).await.unwrap_err();
        assert!(matches!(err, CreateAssetError::Version(LedgerError::InvalidSource(_))));
        let all = fixture.state.assets.list_assets(&Default::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_failed_initial_version_removes_asset() {
        let fixture = TestFixture::new().await;
        let mut state = fixture.state.clone();
        state.ledger = VersionLedger::new(Arc::new(AlwaysConflicting));

        let mut cmd = command("Contended");
        cmd.initial_version = Some(url_draft("https://videos.example.com/contended"));

        let err = handle(&state, &admin(), cmd).await.unwrap_err();
        assert!(matches!(
            err,
            CreateAssetError::Version(LedgerError::ConflictRetriesExhausted { .. })
        ));
        let all = fixture.state.assets.list_assets(&Default::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_create_validation_and_admin_gate() {
        let fixture = TestFixture::new().await;

        let err = handle(&fixture.state, &user(), command("Nope")).await.unwrap_err();
        assert!(matches!(err, CreateAssetError::Gate(GateError::AdminRequired)));

        let err = handle(&fixture.state, &admin(), command("  ")).await.unwrap_err();
        assert!(matches!(err, CreateAssetError::Field(TextValidationError::Required { .. })));

        let mut long_tag = command("Tagged");
        long_tag.tags = vec!["x".repeat(51)];
        let err = handle(&fixture.state, &admin(), long_tag).await.unwrap_err();
        assert!(matches!(err, CreateAssetError::Field(TextValidationError::TooLong { .. })));
    }
}
