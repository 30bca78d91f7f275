//! Storage abstraction for the document service.
//!
//! Each concern the engine consumes from persistence is its own trait:
//!
//! - [`IdentityStore`]: user lookups by id and email
//! - [`DocumentStore`]: document create/read/replace and visibility queries
//! - [`VersionHistory`]: append-only snapshots
//! - [`PermissionLedger`]: grants keyed by (user, document)
//!
//! [`Backend`] bundles all four so one handle can be passed to the
//! [`DocumentService`](crate::DocumentService). [`Store`](crate::Store)
//! implements it over PostgreSQL and [`MemoryStore`](crate::MemoryStore)
//! in memory for tests.

use std::collections::BTreeSet;

use async_trait::async_trait;
use docshare_core::{
    Document, DocumentId, Permission, PermissionLevel, User, UserId, Version,
};

use crate::error::StoreResult;
use crate::models::{Account, DocumentUpdate, NewDocument, NewUser, NewVersion};

/// Default cap on user search results.
pub const DEFAULT_USER_SEARCH_LIMIT: i64 = 10;

/// Users and credentials.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Register a user. Fails with `DuplicateEmail` if the email is taken.
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Look up a user with their password hash, for login.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Users whose email contains `query`, excluding `exclude`, at most
    /// `limit` results ordered by id.
    async fn search_users(
        &self,
        query: &str,
        exclude: UserId,
        limit: i64,
    ) -> StoreResult<Vec<User>>;
}

/// Documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_document(&self, document: &NewDocument) -> StoreResult<Document>;

    async fn get_document(&self, id: DocumentId) -> StoreResult<Option<Document>>;

    /// Overwrite title, content and public flag and bump `updated_at`.
    ///
    /// Fails with `DocumentNotFound` if the row is gone.
    async fn update_document(&self, update: &DocumentUpdate) -> StoreResult<Document>;

    /// Documents the user authored, can see because they are public, or
    /// holds a grant on. Most recently updated first.
    async fn list_visible_documents(&self, user_id: UserId) -> StoreResult<Vec<Document>>;

    /// [`list_visible_documents`](Self::list_visible_documents) narrowed to
    /// those whose title or content contains `query`.
    async fn search_visible_documents(
        &self,
        user_id: UserId,
        query: &str,
    ) -> StoreResult<Vec<Document>>;
}

/// Append-only version history.
#[async_trait]
pub trait VersionHistory: Send + Sync {
    async fn append_version(&self, version: &NewVersion) -> StoreResult<Version>;

    /// All versions of a document, newest first.
    async fn list_versions(&self, document_id: DocumentId) -> StoreResult<Vec<Version>>;
}

/// Permission grants.
///
/// There are two write paths with different overwrite policies. Automatic
/// sharing must never downgrade, so it uses
/// [`upsert_if_absent`](Self::upsert_if_absent). An explicit share by the
/// author sets exactly the requested level through
/// [`upsert_overwrite`](Self::upsert_overwrite).
#[async_trait]
pub trait PermissionLedger: Send + Sync {
    async fn get_permission(
        &self,
        user_id: UserId,
        document_id: DocumentId,
    ) -> StoreResult<Option<Permission>>;

    /// Create a grant at `level` unless one exists; an existing grant is
    /// returned unchanged.
    async fn upsert_if_absent(
        &self,
        user_id: UserId,
        document_id: DocumentId,
        level: PermissionLevel,
    ) -> StoreResult<Permission>;

    /// Create a grant or replace the existing grant's level.
    async fn upsert_overwrite(
        &self,
        user_id: UserId,
        document_id: DocumentId,
        level: PermissionLevel,
    ) -> StoreResult<Permission>;

    async fn list_shared_document_ids(&self, user_id: UserId) -> StoreResult<BTreeSet<DocumentId>>;

    /// All grants on a document, oldest first.
    async fn list_document_permissions(
        &self,
        document_id: DocumentId,
    ) -> StoreResult<Vec<Permission>>;
}

/// Everything the document service needs from persistence.
pub trait Backend: IdentityStore + DocumentStore + VersionHistory + PermissionLedger {}

impl<T> Backend for T where T: IdentityStore + DocumentStore + VersionHistory + PermissionLedger {}
