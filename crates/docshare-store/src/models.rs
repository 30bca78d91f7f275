//! Database models for the storage layer.
//!
//! Row types map directly to table rows and are used for sqlx queries.
//! They are converted into the domain types from docshare-core before they
//! leave the crate.

use chrono::{DateTime, Utc};
use docshare_core::{Document, DocumentId, Permission, User, UserId, Version};
use sqlx::FromRow;

use crate::error::{StoreError, StoreResult};

// ==================== Rows ====================

/// Database row for the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: UserId::new(self.id),
            name: self.name,
            email: self.email,
        }
    }

    pub fn into_account(self) -> Account {
        Account {
            user: User {
                id: UserId::new(self.id),
                name: self.name,
                email: self.email,
            },
            password_hash: self.password_hash,
        }
    }
}

/// Database row for the `documents` table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: DocumentId::new(row.id),
            title: row.title,
            content: row.content,
            is_public: row.is_public,
            author_id: UserId::new(row.author_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for the `permissions` table.
///
/// `level` is stored as text (`VIEW` or `EDIT`).
#[derive(Debug, Clone, FromRow)]
pub struct PermissionRow {
    pub id: i64,
    pub user_id: i64,
    pub document_id: i64,
    pub level: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = StoreError;

    fn try_from(row: PermissionRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: UserId::new(row.user_id),
            document_id: DocumentId::new(row.document_id),
            level: row.level.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for the `versions` table.
#[derive(Debug, Clone, FromRow)]
pub struct VersionRow {
    pub id: i64,
    pub document_id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<VersionRow> for Version {
    fn from(row: VersionRow) -> Self {
        Self {
            id: row.id,
            document_id: DocumentId::new(row.document_id),
            title: row.title,
            content: row.content,
            author_id: UserId::new(row.author_id),
            created_at: row.created_at,
        }
    }
}

// ==================== Inputs ====================

/// A user together with the credential needed to log in.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub password_hash: String,
}

/// Input for registering a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Input for creating a new document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub author_id: UserId,
}

/// Full replacement of a document's mutable fields.
#[derive(Debug, Clone)]
pub struct DocumentUpdate {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub is_public: bool,
}

/// Input for appending a version snapshot.
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub document_id: DocumentId,
    pub title: String,
    pub content: String,
    /// The editor performing the mutation this snapshot precedes.
    pub author_id: UserId,
}

impl NewVersion {
    /// Snapshot `document` as it stands, attributed to `editor`.
    pub fn snapshot(document: &Document, editor: UserId) -> Self {
        Self {
            document_id: document.id,
            title: document.title.clone(),
            content: document.content.clone(),
            author_id: editor,
        }
    }
}
