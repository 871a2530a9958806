//! Asset catalogue feature
//!
//! Creation, updates and deletion are admin-only. Every read that discloses an
//! asset goes through the access evaluator via [`crate::features::shared::gate`].

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use commands::{
    CreateAssetCommand, CreateAssetError, DeleteAssetError, DeleteAssetResponse,
    UpdateAssetCommand, UpdateAssetError,
};
pub use queries::{
    DownloadAssetError, DownloadResponse, GetAssetError, ListAssetsError, ListAssetsQuery,
};
pub use routes::assets_routes;
pub use types::AssetDetail;
