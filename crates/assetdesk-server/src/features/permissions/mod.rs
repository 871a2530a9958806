//! Per-asset access rules

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{set_permissions, SetPermissionsCommand, SetPermissionsError};
pub use routes::permissions_routes;
