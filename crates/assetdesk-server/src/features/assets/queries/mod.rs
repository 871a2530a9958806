pub mod download;
pub mod get;
pub mod list;

pub use download::{DownloadAssetError, DownloadResponse};
pub use get::GetAssetError;
pub use list::{ListAssetsError, ListAssetsQuery};
