//! Version history feature, a thin HTTP layer over the version ledger

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::CreateVersionError;
pub use queries::VersionQueryError;
pub use routes::versions_routes;
