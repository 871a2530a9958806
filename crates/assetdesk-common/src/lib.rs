//! assetdesk common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared vocabulary, error handling and logging for the assetdesk workspace.
//!
//! # Overview
//!
//! - **Types**: the closed vocabularies of the portal (asset type, publish status,
//!   view scope, security label, subject type, role codes, ...) with their canonical
//!   upper-case wire and storage spellings
//! - **Error Handling**: [`AssetdeskError`] and the [`Result`] alias
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`]
//!
//! # Example
//!
//! ```
//! use assetdesk_common::types::{PublishStatus, SecurityLabel};
//!
//! let status: PublishStatus = "PUBLISHED".parse().unwrap();
//! assert_eq!(status, PublishStatus::Published);
//! assert!(SecurityLabel::L4 > SecurityLabel::L2);
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{AssetdeskError, Result};
