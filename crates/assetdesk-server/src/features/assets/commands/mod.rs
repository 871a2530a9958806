pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateAssetCommand, CreateAssetError};
pub use delete::{DeleteAssetError, DeleteAssetResponse};
pub use update::{UpdateAssetCommand, UpdateAssetError};
