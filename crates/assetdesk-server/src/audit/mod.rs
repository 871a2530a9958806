//! Access logging
//!
//! Every asset detail view and download records who touched which asset and
//! whether it was allowed. Denials carry the gate that refused them in the
//! entry's metadata, so an operator can tell a drafts-only refusal from a
//! missing ACL grant without that reason ever reaching the caller.
//!
//! # Example
//!
//! ```no_run
//! use assetdesk_common::types::DenialReason;
//! use assetdesk_server::audit::{create_access_log_entry, NewAccessLogEntry};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let entry = NewAccessLogEntry::denied(Uuid::new_v4(), Uuid::new_v4(), DenialReason::Acl);
//! let logged = create_access_log_entry(pool, entry).await?;
//! println!("Recorded access log entry {}", logged.id);
//! # Ok(())
//! # }
//! ```

mod models;
mod queries;

pub use models::{
    AccessLogEntry, AccessLogEntryBuilder, AccessLogQuery, NewAccessLogEntry,
    DEFAULT_ACCESS_LOG_LIMIT, MAX_ACCESS_LOG_LIMIT,
};
pub use queries::{create_access_log_entry, query_access_logs};
