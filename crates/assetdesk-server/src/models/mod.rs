//! Domain models
//!
//! These are the values the ledger, the evaluator and the feature slices pass
//! around. Storage rows live next to their queries in `db`; conversion into
//! these types is where unknown enum codes are rejected.

use std::collections::BTreeSet;

use assetdesk_common::types::{
    AssetType, PublishStatus, RoleCode, SecurityLabel, ShareStatus, SourceKind, SubjectType,
    ViewScope,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Field Limits
// ============================================================================

/// Maximum asset title length in characters.
pub const MAX_TITLE_LENGTH: usize = 300;

/// Maximum length of a version's source locator.
pub const MAX_SOURCE_LOCATOR_LENGTH: usize = 1000;

/// Maximum length of a version's source file id.
pub const MAX_SOURCE_FILE_ID_LENGTH: usize = 200;

/// Maximum tag name length.
pub const MAX_TAG_LENGTH: usize = 50;

// ============================================================================
// Principal
// ============================================================================

/// An authenticated user as seen by the access rules
///
/// Resolved per request and passed explicitly to every evaluator and ledger
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub roles: BTreeSet<RoleCode>,
    pub department_id: Option<Uuid>,
    pub active: bool,
}

impl Principal {
    /// An active principal with no roles and no department
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            roles: BTreeSet::new(),
            department_id: None,
            active: true,
        }
    }

    pub fn with_role(mut self, role: RoleCode) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn in_department(mut self, department_id: Uuid) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn holds(&self, role: RoleCode) -> bool {
        self.roles.contains(&role)
    }

    /// Holds ADMIN or SUPER_ADMIN
    pub fn is_administrative(&self) -> bool {
        self.roles.iter().any(RoleCode::is_administrative)
    }
}

// ============================================================================
// Asset and Version
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub publish_status: PublishStatus,
    pub view_scope: ViewScope,
    pub download_allowed: bool,
    pub security_label: SecurityLabel,
    pub owner_id: Option<Uuid>,
    /// Written only by the version ledger
    pub current_version_id: Option<Uuid>,
    /// Sorted, deduplicated tag names
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable entry of an asset's version history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetVersion {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub version_no: i32,
    pub source_kind: SourceKind,
    pub source_locator: String,
    pub source_file_id: Option<String>,
    pub created_by: Option<Uuid>,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Access Rules
// ============================================================================

/// Who an access rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "subject_type", content = "subject_id")]
pub enum Subject {
    #[serde(rename = "USER")]
    User(Uuid),
    #[serde(rename = "DEPT")]
    Department(Uuid),
    #[serde(rename = "ROLE")]
    Role(RoleCode),
}

impl Subject {
    /// Parse the wire pair `(subject_type, subject_id)`
    pub fn parse(subject_type: &str, subject_id: &str) -> Result<Self, RuleValidationError> {
        let kind: SubjectType = subject_type
            .parse()
            .map_err(|_| RuleValidationError::UnknownSubjectType(subject_type.to_string()))?;

        let invalid_id = || RuleValidationError::InvalidSubjectId {
            subject_type: kind,
            subject_id: subject_id.to_string(),
        };
        let id = subject_id.trim();

        match kind {
            SubjectType::User => Uuid::parse_str(id).map(Subject::User).map_err(|_| invalid_id()),
            SubjectType::Dept => {
                Uuid::parse_str(id).map(Subject::Department).map_err(|_| invalid_id())
            },
            SubjectType::Role => id.parse().map(Subject::Role).map_err(|_| invalid_id()),
        }
    }

    pub fn subject_type(&self) -> SubjectType {
        match self {
            Subject::User(_) => SubjectType::User,
            Subject::Department(_) => SubjectType::Dept,
            Subject::Role(_) => SubjectType::Role,
        }
    }

    /// Natural key of the subject as stored in `asset_permissions.subject_id`
    pub fn subject_id(&self) -> String {
        match self {
            Subject::User(id) | Subject::Department(id) => id.to_string(),
            Subject::Role(code) => code.as_str().to_string(),
        }
    }

    pub fn matches(&self, principal: &Principal) -> bool {
        match self {
            Subject::User(id) => principal.id == *id,
            Subject::Department(id) => principal.department_id == Some(*id),
            Subject::Role(code) => principal.holds(*code),
        }
    }
}

/// Errors turning a wire rule into a [`Subject`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleValidationError {
    #[error("Unknown subject type '{0}': expected USER, DEPT or ROLE")]
    UnknownSubjectType(String),

    #[error("Subject id '{subject_id}' is not a valid {subject_type} identifier")]
    InvalidSubjectId {
        subject_type: SubjectType,
        subject_id: String,
    },
}

/// A stored allow-list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRule {
    pub id: Uuid,
    pub asset_id: Uuid,
    #[serde(flatten)]
    pub subject: Subject,
    pub can_view: bool,
    pub can_download: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated rule waiting to be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    pub subject: Subject,
    pub can_view: bool,
    pub can_download: bool,
}

impl RuleSpec {
    pub fn new(subject: Subject, can_view: bool, can_download: bool) -> Self {
        Self {
            subject,
            can_view,
            can_download,
        }
    }
}

/// A rule as submitted by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleInput {
    pub subject_type: String,
    pub subject_id: String,
    #[serde(default = "default_can_view")]
    pub can_view: bool,
    #[serde(default)]
    pub can_download: bool,
}

fn default_can_view() -> bool {
    true
}

impl RuleInput {
    pub fn parse(&self) -> Result<RuleSpec, RuleValidationError> {
        let subject = Subject::parse(&self.subject_type, &self.subject_id)?;
        Ok(RuleSpec::new(subject, self.can_view, self.can_download))
    }
}

// ============================================================================
// Share Requests
// ============================================================================

/// A request to share an asset outside the company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequest {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub requester_id: Uuid,
    pub reason: String,
    pub status: ShareStatus,
    pub decided_by: Option<Uuid>,
    pub comment: String,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_parse_variants() {
        let user = Uuid::new_v4();
        assert_eq!(Subject::parse("USER", &user.to_string()), Ok(Subject::User(user)));
        assert_eq!(
            Subject::parse("DEPT", &format!(" {user} ")),
            Ok(Subject::Department(user))
        );
        assert_eq!(Subject::parse("ROLE", "ADMIN"), Ok(Subject::Role(RoleCode::Admin)));
    }

    #[test]
    fn test_subject_parse_rejects_bad_input() {
        assert!(matches!(
            Subject::parse("GROUP", "x"),
            Err(RuleValidationError::UnknownSubjectType(_))
        ));
        assert!(matches!(
            Subject::parse("user", &Uuid::new_v4().to_string()),
            Err(RuleValidationError::UnknownSubjectType(_))
        ));
        assert!(matches!(
            Subject::parse("DEPT", "sales"),
            Err(RuleValidationError::InvalidSubjectId { subject_type: SubjectType::Dept, .. })
        ));
        assert!(matches!(
            Subject::parse("ROLE", "OWNER"),
            Err(RuleValidationError::InvalidSubjectId { .. })
        ));
    }

    #[test]
    fn test_subject_matches_principal() {
        let dept = Uuid::new_v4();
        let principal = Principal::new(Uuid::new_v4())
            .with_role(RoleCode::User)
            .in_department(dept);

        assert!(Subject::User(principal.id).matches(&principal));
        assert!(!Subject::User(Uuid::new_v4()).matches(&principal));
        assert!(Subject::Department(dept).matches(&principal));
        assert!(!Subject::Department(Uuid::new_v4()).matches(&principal));
        assert!(Subject::Role(RoleCode::User).matches(&principal));
        assert!(!Subject::Role(RoleCode::Admin).matches(&principal));
    }

    #[test]
    fn test_department_subject_never_matches_principal_without_department() {
        let principal = Principal::new(Uuid::new_v4());
        assert!(!Subject::Department(Uuid::new_v4()).matches(&principal));
    }

    #[test]
    fn test_access_rule_serializes_wire_shape() {
        let rule = AccessRule {
            id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            subject: Subject::Role(RoleCode::SuperAdmin),
            can_view: true,
            can_download: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["subject_type"], "ROLE");
        assert_eq!(json["subject_id"], "SUPER_ADMIN");
        assert_eq!(json["can_download"], false);
    }

    #[test]
    fn test_rule_input_defaults() {
        let input: RuleInput =
            serde_json::from_str(r#"{"subject_type":"ROLE","subject_id":"USER"}"#).unwrap();
        let spec = input.parse().unwrap();
        assert!(spec.can_view);
        assert!(!spec.can_download);
    }

    #[test]
    fn test_principal_administrative() {
        let plain = Principal::new(Uuid::new_v4()).with_role(RoleCode::User);
        assert!(!plain.is_administrative());
        assert!(plain.clone().with_role(RoleCode::SuperAdmin).is_administrative());
        assert!(Principal::new(Uuid::new_v4()).with_role(RoleCode::Admin).is_administrative());
    }
}
