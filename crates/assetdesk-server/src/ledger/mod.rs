//! Version ledger
//!
//! Append-only per-asset history with one current pointer. Numbers are
//! assigned by the store inside the same atomic step that moves the pointer;
//! the ledger validates drafts beforehand and turns store conflicts into
//! bounded transparent retries.

use std::sync::Arc;

use assetdesk_common::types::SourceKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::features::shared::validation::{
    validate_max_length, validate_url, TextValidationError, UrlValidationError,
};
use crate::models::{
    AssetVersion, Principal, MAX_SOURCE_FILE_ID_LENGTH, MAX_SOURCE_LOCATOR_LENGTH,
};
use crate::store::{NewVersion, StoreError, VersionStore};

/// Attempts made by `create_version` before giving up on conflicts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Content source of a version about to be created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDraft {
    pub source_kind: SourceKind,
    pub source_locator: String,
    #[serde(default)]
    pub source_file_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl VersionDraft {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_url(&self.source_locator, "source_locator", MAX_SOURCE_LOCATOR_LENGTH)?;
        if let Some(ref file_id) = self.source_file_id {
            validate_max_length(file_id, "source_file_id", MAX_SOURCE_FILE_ID_LENGTH)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid source: {0}")]
    InvalidSource(#[from] UrlValidationError),

    #[error("Invalid field: {0}")]
    InvalidField(#[from] TextValidationError),

    #[error("Asset '{0}' not found")]
    AssetNotFound(Uuid),

    #[error("Version number for asset '{asset_id}' still contended after {attempts} attempts")]
    ConflictRetriesExhausted { asset_id: Uuid, attempts: u32 },

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl LedgerError {
    fn from_store(asset_id: Uuid, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::AssetNotFound(asset_id),
            other => Self::Store(other),
        }
    }
}

#[derive(Clone)]
pub struct VersionLedger {
    store: Arc<dyn VersionStore>,
    max_attempts: u32,
}

impl VersionLedger {
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self::with_max_attempts(store, DEFAULT_MAX_ATTEMPTS)
    }

    /// `max_attempts` is clamped to at least one attempt
    pub fn with_max_attempts(store: Arc<dyn VersionStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Append a version and make it current
    #[tracing::instrument(skip(self, draft, creator), fields(creator = %creator.id))]
    pub async fn create_version(
        &self,
        asset_id: Uuid,
        draft: VersionDraft,
        creator: &Principal,
    ) -> Result<AssetVersion, LedgerError> {
        draft.validate()?;

        let new_version = NewVersion {
            source_kind: draft.source_kind,
            source_locator: draft.source_locator.trim().to_string(),
            source_file_id: draft.source_file_id.filter(|id| !id.trim().is_empty()),
            created_by: Some(creator.id),
            note: draft.note.unwrap_or_default(),
        };

        for attempt in 1..=self.max_attempts {
            match self.store.append_version(asset_id, new_version.clone()).await {
                Ok(version) => {
                    tracing::info!(
                        version_id = %version.id,
                        version_no = version.version_no,
                        attempt,
                        "Version created"
                    );
                    return Ok(version);
                },
                Err(StoreError::Conflict(detail)) => {
                    tracing::warn!(attempt, %detail, "Version number conflict, retrying");
                },
                Err(err) => return Err(LedgerError::from_store(asset_id, err)),
            }
        }

        tracing::error!(attempts = self.max_attempts, "Version conflict retries exhausted");
        Err(LedgerError::ConflictRetriesExhausted {
            asset_id,
            attempts: self.max_attempts,
        })
    }

    /// Highest version number first
    pub async fn list_versions(&self, asset_id: Uuid) -> Result<Vec<AssetVersion>, LedgerError> {
        self.store
            .list_versions(asset_id)
            .await
            .map_err(|err| LedgerError::from_store(asset_id, err))
    }

    pub async fn get_current(&self, asset_id: Uuid) -> Result<Option<AssetVersion>, LedgerError> {
        self.store
            .current_version(asset_id)
            .await
            .map_err(|err| LedgerError::from_store(asset_id, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AssetStore, MemoryStore, NewAsset};
    use assetdesk_common::types::{AssetType, RoleCode, SecurityLabel, ViewScope};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn draft(locator: &str) -> VersionDraft {
        VersionDraft {
            source_kind: SourceKind::Url,
            source_locator: locator.to_string(),
            source_file_id: None,
            note: None,
        }
    }

    fn admin() -> Principal {
        Principal::new(Uuid::new_v4()).with_role(RoleCode::Admin)
    }

    async fn seeded() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let asset = store
            .insert_asset(NewAsset {
                asset_type: AssetType::Link,
                category_id: None,
                title: "Partner portal".to_string(),
                description: String::new(),
                view_scope: ViewScope::AllUsers,
                download_allowed: false,
                security_label: SecurityLabel::L1,
                owner_id: None,
                tags: Vec::new(),
            })
            .await
            .unwrap();
        (store, asset.id)
    }

    /// Reports `failures` conflicts before delegating
    struct ContendedStore {
        inner: MemoryStore,
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl VersionStore for ContendedStore {
        async fn append_version(
            &self,
            asset_id: Uuid,
            version: NewVersion,
        ) -> crate::store::StoreResult<AssetVersion> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(StoreError::Conflict("duplicate version_no".to_string()));
            }
            self.inner.append_version(asset_id, version).await
        }

        async fn list_versions(
            &self,
            asset_id: Uuid,
        ) -> crate::store::StoreResult<Vec<AssetVersion>> {
            self.inner.list_versions(asset_id).await
        }

        async fn current_version(
            &self,
            asset_id: Uuid,
        ) -> crate::store::StoreResult<Option<AssetVersion>> {
            self.inner.current_version(asset_id).await
        }
    }

    #[tokio::test]
    async fn test_create_version_moves_current_pointer() {
        let (store, asset_id) = seeded().await;
        let ledger = VersionLedger::new(Arc::new(store.clone()));
        let creator = admin();

        let first = ledger
            .create_version(asset_id, draft("https://example.com/v1"), &creator)
            .await
            .unwrap();
        assert_eq!(first.version_no, 1);
        assert_eq!(first.created_by, Some(creator.id));
        assert_eq!(ledger.get_current(asset_id).await.unwrap(), Some(first));

        let second = ledger
            .create_version(asset_id, draft("https://example.com/v2"), &creator)
            .await
            .unwrap();
        assert_eq!(second.version_no, 2);
        assert_eq!(ledger.get_current(asset_id).await.unwrap(), Some(second.clone()));

        let asset = store.get_asset(asset_id).await.unwrap().unwrap();
        assert_eq!(asset.current_version_id, Some(second.id));
    }

    #[tokio::test]
    async fn test_get_current_absent_without_versions() {
        let (store, asset_id) = seeded().await;
        let ledger = VersionLedger::new(Arc::new(store));
        assert_eq!(ledger.get_current(asset_id).await.unwrap(), None);
        assert!(ledger.list_versions(asset_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_asset() {
        let ledger = VersionLedger::new(Arc::new(MemoryStore::new()));
        let id = Uuid::new_v4();

        assert!(matches!(
            ledger.create_version(id, draft("https://example.com"), &admin()).await,
            Err(LedgerError::AssetNotFound(missing)) if missing == id
        ));
        assert!(matches!(ledger.list_versions(id).await, Err(LedgerError::AssetNotFound(_))));
        assert!(matches!(ledger.get_current(id).await, Err(LedgerError::AssetNotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_draft_writes_nothing() {
        let (store, asset_id) = seeded().await;
        let ledger = VersionLedger::new(Arc::new(store));

        for locator in ["ftp://example.com/file", "not a url", ""] {
            assert!(matches!(
                ledger.create_version(asset_id, draft(locator), &admin()).await,
                Err(LedgerError::InvalidSource(_))
            ));
        }

        let long = format!("https://example.com/{}", "a".repeat(MAX_SOURCE_LOCATOR_LENGTH));
        assert!(ledger.create_version(asset_id, draft(&long), &admin()).await.is_err());

        let mut bad_file_id = draft("https://example.com");
        bad_file_id.source_file_id = Some("x".repeat(MAX_SOURCE_FILE_ID_LENGTH + 1));
        assert!(matches!(
            ledger.create_version(asset_id, bad_file_id, &admin()).await,
            Err(LedgerError::InvalidField(_))
        ));

        assert!(ledger.list_versions(asset_id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_are_gapless() {
        let (store, asset_id) = seeded().await;
        let ledger = VersionLedger::new(Arc::new(store));
        let creator = admin();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let ledger = ledger.clone();
                let creator = creator.clone();
                tokio::spawn(async move {
                    ledger
                        .create_version(
                            asset_id,
                            draft(&format!("https://example.com/{i}")),
                            &creator,
                        )
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let numbers: Vec<i32> = ledger
            .list_versions(asset_id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_no)
            .collect();
        assert_eq!(numbers, (1..=20).rev().collect::<Vec<_>>());

        let current = ledger.get_current(asset_id).await.unwrap().unwrap();
        assert_eq!(current.version_no, 20);
    }

    #[tokio::test]
    async fn test_conflicts_below_bound_are_retried() {
        let (store, asset_id) = seeded().await;
        let contended = ContendedStore {
            inner: store,
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let ledger = VersionLedger::new(Arc::new(contended));

        let version = ledger
            .create_version(asset_id, draft("https://example.com"), &admin())
            .await
            .unwrap();
        assert_eq!(version.version_no, 1);
    }

    #[tokio::test]
    async fn test_conflict_retries_exhausted_leaves_pointer() {
        let (store, asset_id) = seeded().await;
        let ledger = VersionLedger::new(Arc::new(store.clone()));
        let existing = ledger
            .create_version(asset_id, draft("https://example.com/v1"), &admin())
            .await
            .unwrap();

        let contended = ContendedStore {
            inner: store.clone(),
            failures: DEFAULT_MAX_ATTEMPTS,
            calls: AtomicU32::new(0),
        };
        let contended_ledger = VersionLedger::new(Arc::new(contended));

        let result = contended_ledger
            .create_version(asset_id, draft("https://example.com/v2"), &admin())
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::ConflictRetriesExhausted { attempts: DEFAULT_MAX_ATTEMPTS, .. })
        ));

        let asset = store.get_asset(asset_id).await.unwrap().unwrap();
        assert_eq!(asset.current_version_id, Some(existing.id));
    }
}
