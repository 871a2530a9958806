//! Closed vocabularies shared across assetdesk
//!
//! Every enum here has exactly one canonical spelling, the upper-case code used
//! both on the wire (serde) and in the database (`TEXT` columns). Parsing is
//! strict: unknown or differently-cased codes are rejected with
//! [`AssetdeskError::UnknownVariant`], which callers surface as a validation error.

use serde::{Deserialize, Serialize};

use crate::error::AssetdeskError;

/// Generates `as_str`, `ALL`, `Display` and `FromStr` for a code enum.
macro_rules! code_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = AssetdeskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($name::$variant),)+
                    other => Err(AssetdeskError::unknown_variant($kind, other)),
                }
            }
        }
    };
}

/// Kind of content an asset carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Video,
    Document,
    Link,
}

code_enum!(AssetType, "asset type", {
    Video => "VIDEO",
    Document => "DOCUMENT",
    Link => "LINK",
});

/// Lifecycle state of an asset. Only `Published` is visible to non-admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishStatus {
    #[default]
    Draft,
    Review,
    Published,
    Archived,
}

code_enum!(PublishStatus, "publish status", {
    Draft => "DRAFT",
    Review => "REVIEW",
    Published => "PUBLISHED",
    Archived => "ARCHIVED",
});

/// Coarse visibility policy of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewScope {
    #[default]
    AllUsers,
    AdminOnly,
    /// Visibility decided by the asset's ACL rules
    Custom,
}

code_enum!(ViewScope, "view scope", {
    AllUsers => "ALL_USERS",
    AdminOnly => "ADMIN_ONLY",
    Custom => "CUSTOM",
});

/// Clearance tier. Ordered: `L1 < L2 < L3 < L4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum SecurityLabel {
    /// Public
    L1,
    /// Internal
    #[default]
    L2,
    /// Confidential
    L3,
    /// Restricted
    L4,
}

code_enum!(SecurityLabel, "security label", {
    L1 => "L1",
    L2 => "L2",
    L3 => "L3",
    L4 => "L4",
});

/// Where a version's content lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Gdrive,
    Url,
}

code_enum!(SourceKind, "source kind", {
    Gdrive => "GDRIVE",
    Url => "URL",
});

/// Discriminant of an ACL subject as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectType {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "DEPT")]
    Dept,
    #[serde(rename = "ROLE")]
    Role,
}

code_enum!(SubjectType, "subject type", {
    User => "USER",
    Dept => "DEPT",
    Role => "ROLE",
});

/// Role codes a principal can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleCode {
    SuperAdmin,
    Admin,
    User,
}

code_enum!(RoleCode, "role code", {
    SuperAdmin => "SUPER_ADMIN",
    Admin => "ADMIN",
    User => "USER",
});

impl RoleCode {
    /// Administrative roles bypass the publish-status and view-scope gates
    pub fn is_administrative(&self) -> bool {
        matches!(self, RoleCode::SuperAdmin | RoleCode::Admin)
    }
}

/// The gate that refused an access decision, recorded in the access log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    PublishStatus,
    ViewScope,
    Acl,
    DownloadNotAllowed,
    /// Refused by the deployment's security-label policy
    Clearance,
}

code_enum!(DenialReason, "denial reason", {
    PublishStatus => "PUBLISH_STATUS",
    ViewScope => "VIEW_SCOPE",
    Acl => "ACL",
    DownloadNotAllowed => "DOWNLOAD_NOT_ALLOWED",
    Clearance => "CLEARANCE",
});

/// State of an external-sharing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

code_enum!(ShareStatus, "share request status", {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Cancelled => "CANCELLED",
});

impl ShareStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ShareStatus::Pending)
    }
}

/// What a principal did (or tried to do), as recorded in the access log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessAction {
    View,
    Download,
    Play,
    Search,
    ExportLog,
    Denied,
}

code_enum!(AccessAction, "access action", {
    View => "VIEW",
    Download => "DOWNLOAD",
    Play => "PLAY",
    Search => "SEARCH",
    ExportLog => "EXPORT_LOG",
    Denied => "DENIED",
});

/// Outcome of a logged access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessResult {
    #[default]
    Success,
    Denied,
    Fail,
}

code_enum!(AccessResult, "access result", {
    Success => "SUCCESS",
    Denied => "DENIED",
    Fail => "FAIL",
});
