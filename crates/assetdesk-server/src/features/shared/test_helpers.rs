//! Test fixtures backed by [`MemoryStore`]
//!
//! ```rust,ignore
//! let fixture = TestFixture::new().await;
//! let asset = TestAsset::new("Pricing deck")
//!     .with_status(PublishStatus::Published)
//!     .with_scope(ViewScope::Custom)
//!     .insert(&fixture)
//!     .await;
//! ```

use assetdesk_common::types::{AssetType, PublishStatus, RoleCode, SecurityLabel, ViewScope};
use uuid::Uuid;

use crate::access::AccessEvaluator;
use crate::features::FeatureState;
use crate::ledger::DEFAULT_MAX_ATTEMPTS;
use crate::models::{Asset, Principal};
use crate::store::{AssetPatch, MemoryStore, NewAsset};

pub fn admin() -> Principal {
    Principal::new(Uuid::new_v4()).with_role(RoleCode::Admin)
}

pub fn user() -> Principal {
    Principal::new(Uuid::new_v4()).with_role(RoleCode::User)
}

pub struct TestFixture {
    pub store: MemoryStore,
    pub state: FeatureState,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_evaluator(AccessEvaluator::default()).await
    }

    pub async fn with_evaluator(evaluator: AccessEvaluator) -> Self {
        let store = MemoryStore::new();
        let state = FeatureState::from_memory(store.clone(), evaluator, DEFAULT_MAX_ATTEMPTS);
        Self { store, state }
    }

    /// Make `principal` resolvable through the `x-user-id` header
    pub async fn register(&self, principal: Principal) -> Principal {
        self.store.insert_principal(principal.clone()).await;
        principal
    }

    pub async fn allow_download(&self, asset_id: Uuid) -> Asset {
        self.patch(
            asset_id,
            AssetPatch {
                download_allowed: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn patch(&self, asset_id: Uuid, patch: AssetPatch) -> Asset {
        self.state
            .assets
            .update_asset(asset_id, patch)
            .await
            .expect("asset patch")
    }
}

/// Builder for catalogue entries in tests
#[derive(Debug, Clone)]
pub struct TestAsset {
    pub title: String,
    pub asset_type: AssetType,
    pub status: PublishStatus,
    pub scope: ViewScope,
    pub label: SecurityLabel,
    pub download_allowed: bool,
    pub tags: Vec<String>,
}

impl TestAsset {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            asset_type: AssetType::Document,
            status: PublishStatus::Draft,
            scope: ViewScope::AllUsers,
            label: SecurityLabel::L2,
            download_allowed: false,
            tags: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: PublishStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_scope(mut self, scope: ViewScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_label(mut self, label: SecurityLabel) -> Self {
        self.label = label;
        self
    }

    pub fn with_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = asset_type;
        self
    }

    pub fn downloadable(mut self) -> Self {
        self.download_allowed = true;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub async fn insert(self, fixture: &TestFixture) -> Asset {
        let asset = fixture
            .state
            .assets
            .insert_asset(NewAsset {
                asset_type: self.asset_type,
                category_id: None,
                title: self.title,
                description: String::new(),
                view_scope: self.scope,
                download_allowed: self.download_allowed,
                security_label: self.label,
                owner_id: None,
                tags: self.tags,
            })
            .await
            .expect("asset insert");

        if self.status == asset.publish_status {
            return asset;
        }
        fixture
            .patch(
                asset.id,
                AssetPatch {
                    publish_status: Some(self.status),
                    ..Default::default()
                },
            )
            .await
    }
}

pub async fn seed_asset(fixture: &TestFixture, status: PublishStatus, scope: ViewScope) -> Asset {
    TestAsset::new("Seeded asset")
        .with_status(status)
        .with_scope(scope)
        .insert(fixture)
        .await
}
