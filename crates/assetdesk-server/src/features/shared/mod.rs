//! Shared utilities and types for feature modules
//!
//! # Contents
//!
//! - **extract**: JSON body and query extractors with enveloped rejections
//! - **gate**: asset lookups routed through the access evaluator
//! - **principal**: `x-user-id` principal and client metadata extractors
//! - **pagination**: page/per-page parameters and metadata
//! - **validation**: input validation utilities
//! - **error_helpers**: database constraint-violation helpers
//! - **test_helpers**: in-memory fixtures (test-only)

pub mod error_helpers;
pub mod extract;
pub mod gate;
pub mod pagination;
pub mod principal;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use extract::{ApiJson, ApiQuery};
pub use gate::{require_admin, GateError, GatedAsset};
pub use pagination::{Paginated, PaginationMetadata, PaginationParams};
pub use principal::{ClientInfo, CurrentPrincipal};
