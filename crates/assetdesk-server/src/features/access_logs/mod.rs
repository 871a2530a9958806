//! Access log queries. Entries are written by the asset detail and download
//! gates in [`crate::features::shared::gate`].

pub mod queries;
pub mod routes;

pub use queries::ListAccessLogsError;
pub use routes::access_logs_routes;
