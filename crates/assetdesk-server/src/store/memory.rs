//! In-process store
//!
//! All state sits behind one `RwLock`, so every write (version append, rule
//! replacement, share transition) is atomic with respect to every read.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use assetdesk_common::types::{PublishStatus, ShareStatus};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    normalize_tags, AccessLogStore, AssetFilter, AssetPatch, AssetStore, NewAsset,
    NewShareRequest, NewVersion, PrincipalResolver, RuleStore, ShareRequestFilter,
    ShareRequestStore, ShareTransition, StoreError, StoreResult, VersionStore,
};
use crate::audit::{AccessLogEntry, AccessLogQuery, NewAccessLogEntry};
use crate::models::{AccessRule, Asset, AssetVersion, Principal, RuleSpec, ShareRequest};

#[derive(Debug, Default)]
struct Inner {
    assets: HashMap<Uuid, Asset>,
    categories: HashSet<Uuid>,
    /// Ascending by version number
    versions: HashMap<Uuid, Vec<AssetVersion>>,
    rules: HashMap<Uuid, Vec<AccessRule>>,
    share_requests: HashMap<Uuid, ShareRequest>,
    access_logs: Vec<AccessLogEntry>,
    principals: HashMap<Uuid, Principal>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user the resolver can return
    pub async fn insert_principal(&self, principal: Principal) {
        self.inner
            .write()
            .await
            .principals
            .insert(principal.id, principal);
    }

    /// Register a category id assets may reference
    pub async fn insert_category(&self, category_id: Uuid) {
        self.inner.write().await.categories.insert(category_id);
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn insert_asset(&self, asset: NewAsset) -> StoreResult<Asset> {
        let mut inner = self.inner.write().await;

        if let Some(category_id) = asset.category_id {
            if !inner.categories.contains(&category_id) {
                return Err(StoreError::Validation(format!(
                    "Category '{category_id}' does not exist"
                )));
            }
        }

        let now = Utc::now();
        let record = Asset {
            id: Uuid::new_v4(),
            asset_type: asset.asset_type,
            category_id: asset.category_id,
            title: asset.title,
            description: asset.description,
            publish_status: PublishStatus::Draft,
            view_scope: asset.view_scope,
            download_allowed: asset.download_allowed,
            security_label: asset.security_label,
            owner_id: asset.owner_id,
            current_version_id: None,
            tags: normalize_tags(&asset.tags),
            created_at: now,
            updated_at: now,
        };
        inner.assets.insert(record.id, record.clone());

        Ok(record)
    }

    async fn get_asset(&self, id: Uuid) -> StoreResult<Option<Asset>> {
        Ok(self.inner.read().await.assets.get(&id).cloned())
    }

    async fn update_asset(&self, id: Uuid, patch: AssetPatch) -> StoreResult<Asset> {
        let mut inner = self.inner.write().await;
        let asset = inner
            .assets
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Asset", id))?;

        if let Some(title) = patch.title {
            asset.title = title;
        }
        if let Some(description) = patch.description {
            asset.description = description;
        }
        if let Some(status) = patch.publish_status {
            asset.publish_status = status;
        }
        if let Some(scope) = patch.view_scope {
            asset.view_scope = scope;
        }
        if let Some(download_allowed) = patch.download_allowed {
            asset.download_allowed = download_allowed;
        }
        if let Some(label) = patch.security_label {
            asset.security_label = label;
        }
        asset.updated_at = Utc::now();

        Ok(asset.clone())
    }

    async fn delete_asset(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.assets.remove(&id).is_none() {
            return Err(StoreError::not_found("Asset", id));
        }

        inner.versions.remove(&id);
        inner.rules.remove(&id);
        inner.share_requests.retain(|_, request| request.asset_id != id);
        for entry in inner.access_logs.iter_mut() {
            if entry.asset_id == Some(id) {
                entry.asset_id = None;
            }
        }

        Ok(())
    }

    async fn list_assets(&self, filter: &AssetFilter) -> StoreResult<Vec<Asset>> {
        let inner = self.inner.read().await;
        let tag = filter.tag.as_deref().map(str::to_lowercase);
        let needle = filter.title_contains.as_deref().map(str::to_lowercase);

        let mut assets: Vec<Asset> = inner
            .assets
            .values()
            .filter(|a| filter.asset_type.map_or(true, |t| a.asset_type == t))
            .filter(|a| filter.category_id.map_or(true, |c| a.category_id == Some(c)))
            .filter(|a| {
                tag.as_deref()
                    .map_or(true, |tag| a.tags.iter().any(|t| t.to_lowercase() == tag))
            })
            .filter(|a| {
                needle
                    .as_deref()
                    .map_or(true, |needle| a.title.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();

        assets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(assets)
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn append_version(
        &self,
        asset_id: Uuid,
        version: NewVersion,
    ) -> StoreResult<AssetVersion> {
        let mut inner = self.inner.write().await;
        if !inner.assets.contains_key(&asset_id) {
            return Err(StoreError::not_found("Asset", asset_id));
        }

        let history = inner.versions.entry(asset_id).or_default();
        let next = history.last().map_or(0, |v| v.version_no) + 1;
        let now = Utc::now();
        let record = AssetVersion {
            id: Uuid::new_v4(),
            asset_id,
            version_no: next,
            source_kind: version.source_kind,
            source_locator: version.source_locator,
            source_file_id: version.source_file_id,
            created_by: version.created_by,
            note: version.note,
            created_at: now,
        };
        history.push(record.clone());

        if let Some(asset) = inner.assets.get_mut(&asset_id) {
            asset.current_version_id = Some(record.id);
            asset.updated_at = now;
        }

        Ok(record)
    }

    async fn list_versions(&self, asset_id: Uuid) -> StoreResult<Vec<AssetVersion>> {
        let inner = self.inner.read().await;
        if !inner.assets.contains_key(&asset_id) {
            return Err(StoreError::not_found("Asset", asset_id));
        }

        let mut versions = inner.versions.get(&asset_id).cloned().unwrap_or_default();
        versions.reverse();
        Ok(versions)
    }

    async fn current_version(&self, asset_id: Uuid) -> StoreResult<Option<AssetVersion>> {
        let inner = self.inner.read().await;
        let asset = inner
            .assets
            .get(&asset_id)
            .ok_or_else(|| StoreError::not_found("Asset", asset_id))?;

        Ok(asset.current_version_id.and_then(|current| {
            inner
                .versions
                .get(&asset_id)
                .and_then(|history| history.iter().find(|v| v.id == current))
                .cloned()
        }))
    }
}

#[async_trait]
impl RuleStore for MemoryStore {
    async fn rules_for(&self, asset_id: Uuid) -> StoreResult<Vec<AccessRule>> {
        Ok(self
            .inner
            .read()
            .await
            .rules
            .get(&asset_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn rules_for_assets(
        &self,
        asset_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, Vec<AccessRule>>> {
        let inner = self.inner.read().await;
        Ok(asset_ids
            .iter()
            .filter_map(|id| inner.rules.get(id).map(|rules| (*id, rules.clone())))
            .collect())
    }

    async fn replace_rules(
        &self,
        asset_id: Uuid,
        rules: Vec<RuleSpec>,
    ) -> StoreResult<Vec<AccessRule>> {
        let mut inner = self.inner.write().await;
        if !inner.assets.contains_key(&asset_id) {
            return Err(StoreError::not_found("Asset", asset_id));
        }

        let now = Utc::now();
        let stored: Vec<AccessRule> = rules
            .into_iter()
            .map(|spec| AccessRule {
                id: Uuid::new_v4(),
                asset_id,
                subject: spec.subject,
                can_view: spec.can_view,
                can_download: spec.can_download,
                created_at: now,
            })
            .collect();
        inner.rules.insert(asset_id, stored.clone());

        Ok(stored)
    }
}

#[async_trait]
impl ShareRequestStore for MemoryStore {
    async fn insert_share_request(&self, request: NewShareRequest) -> StoreResult<ShareRequest> {
        let mut inner = self.inner.write().await;
        if !inner.assets.contains_key(&request.asset_id) {
            return Err(StoreError::not_found("Asset", request.asset_id));
        }

        let record = ShareRequest {
            id: Uuid::new_v4(),
            asset_id: request.asset_id,
            requester_id: request.requester_id,
            reason: request.reason,
            status: ShareStatus::Pending,
            decided_by: None,
            comment: String::new(),
            decided_at: None,
            created_at: Utc::now(),
        };
        inner.share_requests.insert(record.id, record.clone());

        Ok(record)
    }

    async fn get_share_request(&self, id: Uuid) -> StoreResult<Option<ShareRequest>> {
        Ok(self.inner.read().await.share_requests.get(&id).cloned())
    }

    async fn list_share_requests(
        &self,
        filter: &ShareRequestFilter,
    ) -> StoreResult<Vec<ShareRequest>> {
        let inner = self.inner.read().await;
        let mut requests: Vec<ShareRequest> = inner
            .share_requests
            .values()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.requester_id.map_or(true, |id| r.requester_id == id))
            .cloned()
            .collect();

        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    async fn transition_share_request(
        &self,
        id: Uuid,
        transition: ShareTransition,
    ) -> StoreResult<ShareRequest> {
        let mut inner = self.inner.write().await;
        let request = inner
            .share_requests
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Share request", id))?;

        if request.status != ShareStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "Share request '{id}' is already {}",
                request.status
            )));
        }

        request.status = transition.to;
        request.decided_by = transition.decided_by;
        request.comment = transition.comment;
        request.decided_at = Some(Utc::now());

        Ok(request.clone())
    }
}

#[async_trait]
impl AccessLogStore for MemoryStore {
    async fn record_access(&self, entry: NewAccessLogEntry) -> StoreResult<AccessLogEntry> {
        let record = AccessLogEntry {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            principal_id: entry.principal_id,
            asset_id: entry.asset_id,
            action: entry.action,
            result: entry.result,
            ip: entry.ip,
            user_agent: entry.user_agent,
            metadata: entry.metadata,
        };
        self.inner.write().await.access_logs.push(record.clone());
        Ok(record)
    }

    async fn query_access_logs(&self, query: &AccessLogQuery) -> StoreResult<Vec<AccessLogEntry>> {
        let inner = self.inner.read().await;
        let offset = usize::try_from(query.offset()).unwrap_or(0);
        let limit = usize::try_from(query.limit()).unwrap_or(0);

        Ok(inner
            .access_logs
            .iter()
            .rev()
            .filter(|entry| query.matches(entry))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PrincipalResolver for MemoryStore {
    async fn resolve_principal(&self, user_id: Uuid) -> StoreResult<Option<Principal>> {
        Ok(self.inner.read().await.principals.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Subject;
    use assetdesk_common::types::{
        AccessAction, AccessResult, AssetType, RoleCode, SecurityLabel, SourceKind, ViewScope,
    };

    fn new_asset(title: &str, tags: &[&str]) -> NewAsset {
        NewAsset {
            asset_type: AssetType::Video,
            category_id: None,
            title: title.to_string(),
            description: String::new(),
            view_scope: ViewScope::AllUsers,
            download_allowed: false,
            security_label: SecurityLabel::L2,
            owner_id: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn new_version(locator: &str) -> NewVersion {
        NewVersion {
            source_kind: SourceKind::Url,
            source_locator: locator.to_string(),
            source_file_id: None,
            created_by: None,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_asset_defaults() {
        let store = MemoryStore::new();
        let asset = store
            .insert_asset(new_asset("Onboarding", &[" demo", "demo ", "intro"]))
            .await
            .unwrap();

        assert_eq!(asset.publish_status, PublishStatus::Draft);
        assert_eq!(asset.current_version_id, None);
        assert_eq!(asset.tags, vec!["demo".to_string(), "intro".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let store = MemoryStore::new();
        let mut input = new_asset("Catalogue", &[]);
        input.category_id = Some(Uuid::new_v4());

        assert!(matches!(
            store.insert_asset(input).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_versions_are_numbered_per_asset() {
        let store = MemoryStore::new();
        let a = store.insert_asset(new_asset("A", &[])).await.unwrap();
        let b = store.insert_asset(new_asset("B", &[])).await.unwrap();

        store.append_version(a.id, new_version("https://a/1")).await.unwrap();
        store.append_version(a.id, new_version("https://a/2")).await.unwrap();
        let first_of_b = store.append_version(b.id, new_version("https://b/1")).await.unwrap();

        assert_eq!(first_of_b.version_no, 1);
        let numbers: Vec<i32> = store
            .list_versions(a.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_no)
            .collect();
        assert_eq!(numbers, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(store.list_versions(id).await.unwrap_err().is_not_found());
        assert!(store.current_version(id).await.unwrap_err().is_not_found());
        assert!(store
            .append_version(id, new_version("https://x"))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_delete_cascades_and_nulls_logs() {
        let store = MemoryStore::new();
        let asset = store.insert_asset(new_asset("Gone", &[])).await.unwrap();
        let user = Uuid::new_v4();
        store.append_version(asset.id, new_version("https://x")).await.unwrap();
        store
            .replace_rules(
                asset.id,
                vec![RuleSpec::new(Subject::Role(RoleCode::User), true, false)],
            )
            .await
            .unwrap();
        store
            .insert_share_request(NewShareRequest {
                asset_id: asset.id,
                requester_id: user,
                reason: "client pitch".to_string(),
            })
            .await
            .unwrap();
        store
            .record_access(NewAccessLogEntry::success(user, asset.id, AccessAction::View))
            .await
            .unwrap();

        store.delete_asset(asset.id).await.unwrap();

        assert!(store.get_asset(asset.id).await.unwrap().is_none());
        assert!(store.rules_for(asset.id).await.unwrap().is_empty());
        assert!(store
            .list_share_requests(&ShareRequestFilter::default())
            .await
            .unwrap()
            .is_empty());
        let logs = store.query_access_logs(&AccessLogQuery::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].asset_id, None);
        assert_eq!(logs[0].result, AccessResult::Success);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = MemoryStore::new();
        store.insert_asset(new_asset("Pricing Guide", &["Sales"])).await.unwrap();
        store.insert_asset(new_asset("Brand book", &["design"])).await.unwrap();

        let by_tag = AssetFilter {
            tag: Some("sales".to_string()),
            ..Default::default()
        };
        let found = store.list_assets(&by_tag).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Pricing Guide");

        let by_title = AssetFilter {
            title_contains: Some("BOOK".to_string()),
            ..Default::default()
        };
        assert_eq!(store.list_assets(&by_title).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_share_transition_only_from_pending() {
        let store = MemoryStore::new();
        let asset = store.insert_asset(new_asset("Deck", &[])).await.unwrap();
        let request = store
            .insert_share_request(NewShareRequest {
                asset_id: asset.id,
                requester_id: Uuid::new_v4(),
                reason: "partner review".to_string(),
            })
            .await
            .unwrap();

        let approved = store
            .transition_share_request(
                request.id,
                ShareTransition {
                    to: ShareStatus::Approved,
                    decided_by: Some(Uuid::new_v4()),
                    comment: "ok".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.status, ShareStatus::Approved);
        assert!(approved.decided_at.is_some());

        let again = store
            .transition_share_request(
                request.id,
                ShareTransition {
                    to: ShareStatus::Rejected,
                    decided_by: None,
                    comment: String::new(),
                },
            )
            .await;
        assert!(matches!(again, Err(StoreError::Conflict(_))));
    }
}
