//! Core data types for the Docshare document service.
//!
//! This module defines the records the access-control and versioning engine
//! reasons about:
//!
//! - Users (read-only identity references)
//! - Documents with a single author and a public flag
//! - Permission grants keyed by the unique (user, document) pair
//! - Versions: append-only snapshots of a document's pre-edit state
//!
//! All records derive `Serialize` and `Deserialize` with camelCase field
//! names, matching the JSON the editor front end exchanges with the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a user.
///
/// User ids are positive integers assigned by the identity store. Mention
/// markup embeds them as decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Creates a UserId from its raw integer value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(i64::from(id))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl DocumentId {
    /// Creates a DocumentId from its raw integer value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// ============================================================================
// Users
// ============================================================================

/// An identity record.
///
/// Owned by the identity store; the engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

// ============================================================================
// Documents
// ============================================================================

/// A text document with exactly one author.
///
/// The author holds full rights regardless of any permission grant.
/// `is_public` opens read access to everyone, including anonymous callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether `user_id` is this document's author.
    #[must_use]
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }
}

/// Fields supplied when creating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_public: bool,
}

/// Replacement state for an edit.
///
/// Edits are full replacements: every field is written, nothing is merged
/// with the stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEdit {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_public: bool,
}

// ============================================================================
// Permissions
// ============================================================================

/// Access level carried by a permission grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PermissionLevel {
    /// Read-only access.
    View,
    /// Read and write access.
    Edit,
}

impl PermissionLevel {
    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Edit => "EDIT",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = PermissionLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEW" => Ok(Self::View),
            "EDIT" => Ok(Self::Edit),
            other => Err(PermissionLevelParseError(other.to_string())),
        }
    }
}

/// Error returned when a stored or submitted level is not `VIEW` or `EDIT`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission level: {0:?}")]
pub struct PermissionLevelParseError(pub String);

/// A grant associating a user, a document and an access level.
///
/// At most one grant exists per (user, document) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: i64,
    pub user_id: UserId,
    pub document_id: DocumentId,
    pub level: PermissionLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Versions
// ============================================================================

/// An immutable snapshot of a document's title and content as they were
/// immediately before an edit.
///
/// `author_id` is the editor who performed that edit, which is not
/// necessarily the document's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: i64,
    pub document_id: DocumentId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_level_wire_format() {
        assert_eq!(
            serde_json::to_string(&PermissionLevel::View).unwrap(),
            "\"VIEW\""
        );
        let level: PermissionLevel = serde_json::from_str("\"EDIT\"").unwrap();
        assert_eq!(level, PermissionLevel::Edit);
    }

    #[test]
    fn test_permission_level_from_str() {
        assert_eq!("VIEW".parse::<PermissionLevel>(), Ok(PermissionLevel::View));
        assert_eq!("EDIT".parse::<PermissionLevel>(), Ok(PermissionLevel::Edit));
        assert!("OWNER".parse::<PermissionLevel>().is_err());
        assert!("view".parse::<PermissionLevel>().is_err());
    }

    #[test]
    fn test_ids_are_transparent() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");
        let id: DocumentId = serde_json::from_str("7").unwrap();
        assert_eq!(id, DocumentId::new(7));
    }

    #[test]
    fn test_user_id_from_u32() {
        assert_eq!(UserId::from(u32::MAX).get(), 4_294_967_295);
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let now = Utc::now();
        let doc = Document {
            id: DocumentId::new(1),
            title: "Notes".into(),
            content: String::new(),
            is_public: true,
            author_id: UserId::new(3),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["isPublic"], true);
        assert_eq!(json["authorId"], 3);
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_edit_defaults_missing_fields() {
        let edit: DocumentEdit = serde_json::from_str(r#"{"title":"T"}"#).unwrap();
        assert_eq!(edit.content, "");
        assert!(!edit.is_public);
    }
}
