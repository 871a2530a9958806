//! Feature modules implementing the assetdesk API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes:
//!
//! - **assets**: catalogue CRUD, visible listing, detail and download gates
//! - **versions**: version history and new versions through the ledger
//! - **permissions**: per-asset ACL replacement and listing
//! - **share_requests**: external sharing workflow
//! - **access_logs**: audit trail queries
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions and the feature's `...ApiError`
//!
//! Handlers are plain async functions taking [`FeatureState`] and the
//! resolved [`shared::CurrentPrincipal`].

pub mod access_logs;
pub mod assets;
pub mod permissions;
pub mod share_requests;
pub mod shared;
pub mod versions;

use std::sync::Arc;

use axum::Router;

use crate::access::AccessEvaluator;
use crate::db::PgStore;
use crate::ledger::VersionLedger;
use crate::store::{
    AccessLogStore, AssetStore, MemoryStore, PrincipalResolver, RuleStore, ShareRequestStore,
    VersionStore,
};

/// Shared state for all feature routes
///
/// One handle per storage concern, all usually backed by the same store.
#[derive(Clone)]
pub struct FeatureState {
    pub assets: Arc<dyn AssetStore>,
    pub rules: Arc<dyn RuleStore>,
    pub share_requests: Arc<dyn ShareRequestStore>,
    pub access_logs: Arc<dyn AccessLogStore>,
    pub principals: Arc<dyn PrincipalResolver>,
    pub ledger: VersionLedger,
    pub evaluator: AccessEvaluator,
}

impl FeatureState {
    pub fn from_memory(store: MemoryStore, evaluator: AccessEvaluator, max_attempts: u32) -> Self {
        let store = Arc::new(store);
        let versions: Arc<dyn VersionStore> = store.clone();
        Self {
            assets: store.clone(),
            rules: store.clone(),
            share_requests: store.clone(),
            access_logs: store.clone(),
            principals: store,
            ledger: VersionLedger::with_max_attempts(versions, max_attempts),
            evaluator,
        }
    }

    pub fn from_pg(store: PgStore, evaluator: AccessEvaluator, max_attempts: u32) -> Self {
        let store = Arc::new(store);
        let versions: Arc<dyn VersionStore> = store.clone();
        Self {
            assets: store.clone(),
            rules: store.clone(),
            share_requests: store.clone(),
            access_logs: store.clone(),
            principals: store,
            ledger: VersionLedger::with_max_attempts(versions, max_attempts),
            evaluator,
        }
    }
}

/// Creates the API router with all feature routes mounted
///
/// - `/assets` - catalogue, versions and permissions
/// - `/share-requests` - sharing workflow
/// - `/access-logs` - audit trail
pub fn router(state: FeatureState) -> Router<()> {
    let asset_routes = assets::assets_routes()
        .merge(versions::versions_routes())
        .merge(permissions::permissions_routes());

    Router::new()
        .nest("/assets", asset_routes)
        .nest("/share-requests", share_requests::share_requests_routes())
        .nest("/access-logs", access_logs::access_logs_routes())
        .with_state(state)
}
