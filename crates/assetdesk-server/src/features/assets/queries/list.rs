//! List visible assets query
//!
//! Catalogue filters are applied by the store; visibility is decided per
//! asset by the access evaluator, then the page is cut from what remains.

use std::collections::HashMap;

use assetdesk_common::types::{AssetType, ViewScope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::shared::pagination::{Paginated, PaginationParams};
use crate::features::FeatureState;
use crate::models::{Asset, Principal};
use crate::store::{AssetFilter, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAssetsQuery {
    /// Asset type code, or `ALL`; case-insensitive
    #[serde(default, rename = "type")]
    pub asset_type: Option<String>,

    #[serde(default, alias = "categoryId")]
    pub category_id: Option<Uuid>,

    #[serde(default)]
    pub tag: Option<String>,

    /// Title substring
    #[serde(default)]
    pub q: Option<String>,

    #[serde(default)]
    pub page: Option<i64>,

    #[serde(default)]
    pub per_page: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListAssetsError {
    #[error("Unknown asset type '{0}'")]
    InvalidType(String),

    #[error("{0}")]
    InvalidPagination(&'static str),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

impl ListAssetsQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    fn filter(&self) -> Result<AssetFilter, ListAssetsError> {
        let asset_type = match self.asset_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) if code.eq_ignore_ascii_case("ALL") => None,
            Some(code) => Some(
                code.to_ascii_uppercase()
                    .parse::<AssetType>()
                    .map_err(|_| ListAssetsError::InvalidType(code.to_string()))?,
            ),
        };

        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(AssetFilter {
            asset_type,
            category_id: self.category_id,
            tag: non_blank(&self.tag),
            title_contains: non_blank(&self.q),
        })
    }
}

#[tracing::instrument(skip(state, principal, query), fields(principal_id = %principal.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    query: ListAssetsQuery,
) -> Result<Paginated<Asset>, ListAssetsError> {
    let pagination = query.pagination();
    pagination.validate().map_err(ListAssetsError::InvalidPagination)?;
    let filter = query.filter()?;

    let candidates = state.assets.list_assets(&filter).await?;

    let custom_ids: Vec<Uuid> = candidates
        .iter()
        .filter(|asset| asset.view_scope == ViewScope::Custom)
        .map(|asset| asset.id)
        .collect();
    let rules = if custom_ids.is_empty() {
        HashMap::new()
    } else {
        state.rules.rules_for_assets(&custom_ids).await?
    };

    let visible: Vec<Asset> = candidates
        .into_iter()
        .filter(|asset| {
            let asset_rules = rules.get(&asset.id).map(Vec::as_slice).unwrap_or(&[]);
            state.evaluator.can_view(principal, asset, asset_rules).is_granted()
        })
        .collect();

    tracing::debug!(visible = visible.len(), "Assets listed");
    Ok(pagination.paginate(visible))
}
