//! Storage seam
//!
//! Each concern the core reads or writes is a small async trait. Production
//! uses [`crate::db::PgStore`]; tests and `ASSETDESK_STORAGE=memory` runs use
//! [`MemoryStore`]. Both implement every trait, so the router is wired the
//! same way regardless of backend.

mod memory;

pub use memory::MemoryStore;

use std::collections::HashMap;

use assetdesk_common::{
    types::{AssetType, PublishStatus, SecurityLabel, ShareStatus, SourceKind, ViewScope},
    AssetdeskError,
};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::audit::{AccessLogEntry, AccessLogQuery, NewAccessLogEntry};
use crate::models::{AccessRule, Asset, AssetVersion, Principal, RuleSpec, ShareRequest};

/// Errors surfaced by every store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// A concurrent write won a race the caller may retry
    #[error("Conflicting write: {0}")]
    Conflict(String),

    /// Input rejected by a storage constraint
    #[error("{0}")]
    Validation(String),

    /// A stored value could not be decoded
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),

    #[error("Database query failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<AssetdeskError> for StoreError {
    fn from(err: AssetdeskError) -> Self {
        Self::Corrupt(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Write and Filter Inputs
// ============================================================================

/// Fields of an asset about to be created
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub asset_type: AssetType,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub view_scope: ViewScope,
    pub download_allowed: bool,
    pub security_label: SecurityLabel,
    pub owner_id: Option<Uuid>,
    pub tags: Vec<String>,
}

/// Partial update of an asset. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct AssetPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub publish_status: Option<PublishStatus>,
    pub view_scope: Option<ViewScope>,
    pub download_allowed: Option<bool>,
    pub security_label: Option<SecurityLabel>,
}

impl AssetPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.publish_status.is_none()
            && self.view_scope.is_none()
            && self.download_allowed.is_none()
            && self.security_label.is_none()
    }
}

/// Catalogue filters. Visibility is not a store concern.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub asset_type: Option<AssetType>,
    pub category_id: Option<Uuid>,
    /// Exact tag name, compared case-insensitively
    pub tag: Option<String>,
    /// Substring of the title, compared case-insensitively
    pub title_contains: Option<String>,
}

/// Version fields supplied by the ledger; the number is assigned by the store
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub source_kind: SourceKind,
    pub source_locator: String,
    pub source_file_id: Option<String>,
    pub created_by: Option<Uuid>,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct NewShareRequest {
    pub asset_id: Uuid,
    pub requester_id: Uuid,
    pub reason: String,
}

/// Move a pending share request into a terminal state
#[derive(Debug, Clone)]
pub struct ShareTransition {
    pub to: ShareStatus,
    pub decided_by: Option<Uuid>,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct ShareRequestFilter {
    pub status: Option<ShareStatus>,
    pub requester_id: Option<Uuid>,
}

// ============================================================================
// Traits
// ============================================================================

#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn insert_asset(&self, asset: NewAsset) -> StoreResult<Asset>;

    async fn get_asset(&self, id: Uuid) -> StoreResult<Option<Asset>>;

    async fn update_asset(&self, id: Uuid, patch: AssetPatch) -> StoreResult<Asset>;

    /// Cascades to versions, rules, tag links and share requests
    async fn delete_asset(&self, id: Uuid) -> StoreResult<()>;

    /// Matching assets, most recently updated first
    async fn list_assets(&self, filter: &AssetFilter) -> StoreResult<Vec<Asset>>;

    /// Cheap connectivity probe for the health endpoint
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Assign the next number, insert, and move the current pointer atomically.
    ///
    /// Returns [`StoreError::Conflict`] when a concurrent writer took the number.
    async fn append_version(&self, asset_id: Uuid, version: NewVersion)
        -> StoreResult<AssetVersion>;

    /// Highest number first; `NotFound` when the asset does not exist
    async fn list_versions(&self, asset_id: Uuid) -> StoreResult<Vec<AssetVersion>>;

    /// The version behind the current pointer; `NotFound` when the asset does not exist
    async fn current_version(&self, asset_id: Uuid) -> StoreResult<Option<AssetVersion>>;
}

#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn rules_for(&self, asset_id: Uuid) -> StoreResult<Vec<AccessRule>>;

    async fn rules_for_assets(&self, asset_ids: &[Uuid])
        -> StoreResult<HashMap<Uuid, Vec<AccessRule>>>;

    /// Delete every rule of the asset and insert `rules`, as one atomic step
    async fn replace_rules(&self, asset_id: Uuid, rules: Vec<RuleSpec>)
        -> StoreResult<Vec<AccessRule>>;
}

#[async_trait]
pub trait ShareRequestStore: Send + Sync {
    async fn insert_share_request(&self, request: NewShareRequest) -> StoreResult<ShareRequest>;

    async fn get_share_request(&self, id: Uuid) -> StoreResult<Option<ShareRequest>>;

    /// Newest first
    async fn list_share_requests(&self, filter: &ShareRequestFilter)
        -> StoreResult<Vec<ShareRequest>>;

    /// Applies only to a PENDING request; anything else is a `Conflict`
    async fn transition_share_request(
        &self,
        id: Uuid,
        transition: ShareTransition,
    ) -> StoreResult<ShareRequest>;
}

#[async_trait]
pub trait AccessLogStore: Send + Sync {
    async fn record_access(&self, entry: NewAccessLogEntry) -> StoreResult<AccessLogEntry>;

    /// Newest first
    async fn query_access_logs(&self, query: &AccessLogQuery) -> StoreResult<Vec<AccessLogEntry>>;
}

/// Turns an authenticated user id into a [`Principal`]
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// `None` for unknown ids. Inactive users are returned with `active == false`.
    async fn resolve_principal(&self, user_id: Uuid) -> StoreResult<Option<Principal>>;
}

/// Normalise submitted tag names: trimmed, non-empty, deduplicated, sorted
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}
