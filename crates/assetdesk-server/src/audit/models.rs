//! Access log data models

use assetdesk_common::types::{AccessAction, AccessResult, DenialReason};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

// ============================================================================
// Access Log Query Constants
// ============================================================================

/// Default number of entries returned per query
pub const DEFAULT_ACCESS_LOG_LIMIT: i64 = 100;

/// Maximum number of entries a single query may return
pub const MAX_ACCESS_LOG_LIMIT: i64 = 1000;

/// A recorded access attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    /// Acting principal (nullable once the user is deleted)
    pub principal_id: Option<Uuid>,
    /// Nulled when the asset is deleted
    pub asset_id: Option<Uuid>,
    pub action: AccessAction,
    pub result: AccessResult,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    /// `{"reason": ...}` for denials
    pub metadata: Option<JsonValue>,
}

/// Filters for the access log
///
/// `from` and `to` are calendar dates (UTC), both inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessLogQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "code_any_case")]
    pub action: Option<AccessAction>,
    #[serde(default, deserialize_with = "code_any_case")]
    pub result: Option<AccessResult>,
    #[serde(default)]
    pub principal_id: Option<Uuid>,
    #[serde(default)]
    pub asset_id: Option<Uuid>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Parse an optional code filter regardless of case; blank means no filter
fn code_any_case<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .to_ascii_uppercase()
            .parse()
            .map(Some)
            .map_err(de::Error::custom),
    }
}

impl AccessLogQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_ACCESS_LOG_LIMIT)
            .clamp(1, MAX_ACCESS_LOG_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Inclusive lower bound
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.from
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Exclusive upper bound: midnight after `to`
    pub fn ends_before(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|date| date.checked_add_days(Days::new(1)))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// In-process equivalent of the SQL `WHERE` clause
    pub fn matches(&self, entry: &AccessLogEntry) -> bool {
        self.starts_at().map_or(true, |start| entry.occurred_at >= start)
            && self.ends_before().map_or(true, |end| entry.occurred_at < end)
            && self.action.map_or(true, |action| entry.action == action)
            && self.result.map_or(true, |result| entry.result == result)
            && self
                .principal_id
                .map_or(true, |id| entry.principal_id == Some(id))
            && self.asset_id.map_or(true, |id| entry.asset_id == Some(id))
    }
}

/// Input for recording an access log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccessLogEntry {
    pub principal_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub action: AccessAction,
    pub result: AccessResult,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: Option<JsonValue>,
}

impl NewAccessLogEntry {
    pub fn builder(action: AccessAction, result: AccessResult) -> AccessLogEntryBuilder {
        AccessLogEntryBuilder {
            entry: NewAccessLogEntry {
                principal_id: None,
                asset_id: None,
                action,
                result,
                ip: None,
                user_agent: None,
                metadata: None,
            },
        }
    }

    /// A refused access, with the denying gate in the metadata
    pub fn denied(principal_id: Uuid, asset_id: Uuid, reason: DenialReason) -> Self {
        Self::builder(AccessAction::Denied, AccessResult::Denied)
            .principal_id(Some(principal_id))
            .asset_id(Some(asset_id))
            .metadata(json!({ "reason": reason }))
            .build()
    }

    pub fn success(principal_id: Uuid, asset_id: Uuid, action: AccessAction) -> Self {
        Self::builder(action, AccessResult::Success)
            .principal_id(Some(principal_id))
            .asset_id(Some(asset_id))
            .build()
    }
}

/// Builder for access log entries
#[derive(Debug, Clone)]
pub struct AccessLogEntryBuilder {
    entry: NewAccessLogEntry,
}

impl AccessLogEntryBuilder {
    pub fn principal_id(mut self, principal_id: Option<Uuid>) -> Self {
        self.entry.principal_id = principal_id;
        self
    }

    pub fn asset_id(mut self, asset_id: Option<Uuid>) -> Self {
        self.entry.asset_id = asset_id;
        self
    }

    pub fn ip(mut self, ip: Option<String>) -> Self {
        self.entry.ip = ip;
        self
    }

    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.entry.user_agent = user_agent;
        self
    }

    pub fn metadata(mut self, metadata: JsonValue) -> Self {
        self.entry.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> NewAccessLogEntry {
        self.entry
    }
}
