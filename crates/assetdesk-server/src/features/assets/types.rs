//! Response shapes shared by the asset commands and queries

use serde::{Deserialize, Serialize};

use crate::models::{Asset, AssetVersion};

/// An asset with its tags and the version behind the current pointer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDetail {
    #[serde(flatten)]
    pub asset: Asset,
    pub current_version: Option<AssetVersion>,
}

impl AssetDetail {
    pub fn new(asset: Asset, current_version: Option<AssetVersion>) -> Self {
        Self {
            asset,
            current_version,
        }
    }
}
