//! In-memory backend for tests and local development.
//!
//! [`MemoryStore`] keeps every table in a single mutex-guarded struct so each
//! trait method is atomic. Writes can be made to fail on demand to exercise
//! the service's partial-failure paths.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use docshare_core::{
    Document, DocumentId, Permission, PermissionLevel, User, UserId, Version,
};

use crate::backend::{DocumentStore, IdentityStore, PermissionLedger, VersionHistory};
use crate::error::{StoreError, StoreResult};
use crate::models::{Account, DocumentUpdate, NewDocument, NewUser, NewVersion};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, Account>,
    documents: BTreeMap<DocumentId, Document>,
    permissions: BTreeMap<(UserId, DocumentId), Permission>,
    versions: Vec<Version>,
    next_user_id: i64,
    next_document_id: i64,
    next_permission_id: i64,
    next_version_id: i64,
    failing_grant_users: HashSet<UserId>,
}

/// In-memory implementation of every backend trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_version_writes: AtomicBool,
    fail_document_writes: AtomicBool,
}

fn bump(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent `append_version` call fail.
    pub fn fail_version_writes(&self, fail: bool) {
        self.fail_version_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `insert_document` and `update_document` call fail.
    pub fn fail_document_writes(&self, fail: bool) {
        self.fail_document_writes.store(fail, Ordering::SeqCst);
    }

    /// Make grant writes for `user_id` fail until cleared.
    pub fn fail_grants_for(&self, user_id: UserId, fail: bool) {
        let mut tables = self.tables();
        if fail {
            tables.failing_grant_users.insert(user_id);
        } else {
            tables.failing_grant_users.remove(&user_id);
        }
    }

    /// Number of stored versions across all documents.
    pub fn version_count(&self) -> usize {
        self.tables().versions.len()
    }

    fn check_document_writes(&self) -> StoreResult<()> {
        if self.fail_document_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("document write rejected".into()));
        }
        Ok(())
    }
}

impl Tables {
    fn is_visible(&self, document: &Document, user_id: UserId) -> bool {
        document.is_authored_by(user_id)
            || document.is_public
            || self.permissions.contains_key(&(user_id, document.id))
    }

    fn visible_documents<'a>(
        &'a self,
        user_id: UserId,
    ) -> impl Iterator<Item = &'a Document> + 'a {
        self.documents
            .values()
            .filter(move |doc| self.is_visible(doc, user_id))
    }

    /// Grant writes need both rows to exist, like the foreign keys on
    /// `permissions`.
    fn check_grant_writes(&self, user_id: UserId, document_id: DocumentId) -> StoreResult<()> {
        if self.failing_grant_users.contains(&user_id) {
            return Err(StoreError::WriteFailed(format!(
                "grant write rejected for user {user_id}"
            )));
        }
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }
        if !self.documents.contains_key(&document_id) {
            return Err(StoreError::DocumentNotFound(document_id));
        }
        Ok(())
    }
}

fn newest_first(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User> {
        let mut tables = self.tables();
        if tables.users.values().any(|a| a.user.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email.clone()));
        }
        let id = UserId::new(bump(&mut tables.next_user_id));
        let created = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
        };
        tables.users.insert(
            id,
            Account {
                user: created.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(created)
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables().users.get(&id).map(|a| a.user.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .find_account_by_email(email)
            .await?
            .map(|account| account.user))
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|a| a.user.email == email)
            .cloned())
    }

    async fn search_users(
        &self,
        query: &str,
        exclude: UserId,
        limit: i64,
    ) -> StoreResult<Vec<User>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .tables()
            .users
            .values()
            .filter(|a| a.user.id != exclude && a.user.email.contains(query))
            .take(limit)
            .map(|a| a.user.clone())
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_document(&self, document: &NewDocument) -> StoreResult<Document> {
        self.check_document_writes()?;
        let mut tables = self.tables();
        let id = DocumentId::new(bump(&mut tables.next_document_id));
        let now = Utc::now();
        let created = Document {
            id,
            title: document.title.clone(),
            content: document.content.clone(),
            is_public: document.is_public,
            author_id: document.author_id,
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(id, created.clone());
        Ok(created)
    }

    async fn get_document(&self, id: DocumentId) -> StoreResult<Option<Document>> {
        Ok(self.tables().documents.get(&id).cloned())
    }

    async fn update_document(&self, update: &DocumentUpdate) -> StoreResult<Document> {
        self.check_document_writes()?;
        let mut tables = self.tables();
        let document = tables
            .documents
            .get_mut(&update.id)
            .ok_or(StoreError::DocumentNotFound(update.id))?;
        document.title = update.title.clone();
        document.content = update.content.clone();
        document.is_public = update.is_public;
        document.updated_at = Utc::now();
        Ok(document.clone())
    }

    async fn list_visible_documents(&self, user_id: UserId) -> StoreResult<Vec<Document>> {
        let tables = self.tables();
        let mut documents: Vec<Document> = tables.visible_documents(user_id).cloned().collect();
        newest_first(&mut documents);
        Ok(documents)
    }

    async fn search_visible_documents(
        &self,
        user_id: UserId,
        query: &str,
    ) -> StoreResult<Vec<Document>> {
        let tables = self.tables();
        let mut documents: Vec<Document> = tables
            .visible_documents(user_id)
            .filter(|doc| doc.title.contains(query) || doc.content.contains(query))
            .cloned()
            .collect();
        newest_first(&mut documents);
        Ok(documents)
    }
}

#[async_trait]
impl VersionHistory for MemoryStore {
    async fn append_version(&self, version: &NewVersion) -> StoreResult<Version> {
        if self.fail_version_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("version write rejected".into()));
        }
        let mut tables = self.tables();
        let stored = Version {
            id: bump(&mut tables.next_version_id),
            document_id: version.document_id,
            title: version.title.clone(),
            content: version.content.clone(),
            author_id: version.author_id,
            created_at: Utc::now(),
        };
        tables.versions.push(stored.clone());
        Ok(stored)
    }

    async fn list_versions(&self, document_id: DocumentId) -> StoreResult<Vec<Version>> {
        let tables = self.tables();
        let mut versions: Vec<Version> = tables
            .versions
            .iter()
            .filter(|v| v.document_id == document_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(versions)
    }
}

#[async_trait]
impl PermissionLedger for MemoryStore {
    async fn get_permission(
        &self,
        user_id: UserId,
        document_id: DocumentId,
    ) -> StoreResult<Option<Permission>> {
        Ok(self
            .tables()
            .permissions
            .get(&(user_id, document_id))
            .cloned())
    }

    async fn upsert_if_absent(
        &self,
        user_id: UserId,
        document_id: DocumentId,
        level: PermissionLevel,
    ) -> StoreResult<Permission> {
        let mut tables = self.tables();
        tables.check_grant_writes(user_id, document_id)?;
        if let Some(existing) = tables.permissions.get(&(user_id, document_id)) {
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let permission = Permission {
            id: bump(&mut tables.next_permission_id),
            user_id,
            document_id,
            level,
            created_at: now,
            updated_at: now,
        };
        tables
            .permissions
            .insert((user_id, document_id), permission.clone());
        Ok(permission)
    }

    async fn upsert_overwrite(
        &self,
        user_id: UserId,
        document_id: DocumentId,
        level: PermissionLevel,
    ) -> StoreResult<Permission> {
        let mut tables = self.tables();
        tables.check_grant_writes(user_id, document_id)?;
        let now = Utc::now();
        if let Some(existing) = tables.permissions.get_mut(&(user_id, document_id)) {
            existing.level = level;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let permission = Permission {
            id: bump(&mut tables.next_permission_id),
            user_id,
            document_id,
            level,
            created_at: now,
            updated_at: now,
        };
        tables
            .permissions
            .insert((user_id, document_id), permission.clone());
        Ok(permission)
    }

    async fn list_shared_document_ids(&self, user_id: UserId) -> StoreResult<BTreeSet<DocumentId>> {
        Ok(self
            .tables()
            .permissions
            .keys()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, doc_id)| *doc_id)
            .collect())
    }

    async fn list_document_permissions(
        &self,
        document_id: DocumentId,
    ) -> StoreResult<Vec<Permission>> {
        let tables = self.tables();
        let mut permissions: Vec<Permission> = tables
            .permissions
            .values()
            .filter(|p| p.document_id == document_id)
            .cloned()
            .collect();
        permissions.sort_by_key(|p| p.id);
        Ok(permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&new_user("ana@example.com")).await.unwrap();
        let err = store
            .insert_user(&new_user("ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    /// A store holding one author, one document and `readers` other users.
    async fn seeded(readers: usize) -> (MemoryStore, DocumentId, Vec<UserId>) {
        let store = MemoryStore::new();
        let author = store.insert_user(&new_user("author@example.com")).await.unwrap();
        let doc = store
            .insert_document(&NewDocument {
                title: "Notes".into(),
                content: String::new(),
                is_public: false,
                author_id: author.id,
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for i in 0..readers {
            let reader = store
                .insert_user(&new_user(&format!("reader{i}@example.com")))
                .await
                .unwrap();
            ids.push(reader.id);
        }
        (store, doc.id, ids)
    }

    #[tokio::test]
    async fn test_upsert_if_absent_keeps_existing_level() {
        let (store, doc, readers) = seeded(1).await;
        let user = readers[0];

        store
            .upsert_overwrite(user, doc, PermissionLevel::Edit)
            .await
            .unwrap();
        let kept = store
            .upsert_if_absent(user, doc, PermissionLevel::View)
            .await
            .unwrap();

        assert_eq!(kept.level, PermissionLevel::Edit);
        assert_eq!(store.list_document_permissions(doc).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrite_replaces_level_in_place() {
        let (store, doc, readers) = seeded(1).await;
        let user = readers[0];

        let first = store
            .upsert_overwrite(user, doc, PermissionLevel::Edit)
            .await
            .unwrap();
        let second = store
            .upsert_overwrite(user, doc, PermissionLevel::View)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.level, PermissionLevel::View);
    }

    #[tokio::test]
    async fn test_grant_fault_injection_is_per_user() {
        let (store, doc, readers) = seeded(2).await;
        store.fail_grants_for(readers[0], true);

        assert!(
            store
                .upsert_if_absent(readers[0], doc, PermissionLevel::View)
                .await
                .is_err()
        );
        assert!(
            store
                .upsert_if_absent(readers[1], doc, PermissionLevel::View)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_grants_require_existing_user_and_document() {
        let (store, doc, readers) = seeded(1).await;

        let err = store
            .upsert_if_absent(UserId::new(999), doc, PermissionLevel::View)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound(_)));

        let err = store
            .upsert_overwrite(readers[0], DocumentId::new(999), PermissionLevel::Edit)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound(_)));

        assert!(store.list_document_permissions(doc).await.unwrap().is_empty());
        assert!(
            store
                .get_permission(UserId::new(999), doc)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_shared_document_ids_across_documents() {
        let (store, first, readers) = seeded(2).await;
        let (reader, other) = (readers[0], readers[1]);
        let second = store
            .insert_document(&NewDocument {
                title: "More notes".into(),
                content: String::new(),
                is_public: true,
                author_id: other,
            })
            .await
            .unwrap()
            .id;

        store
            .upsert_if_absent(reader, first, PermissionLevel::View)
            .await
            .unwrap();
        store
            .upsert_overwrite(reader, first, PermissionLevel::Edit)
            .await
            .unwrap();
        store
            .upsert_overwrite(reader, second, PermissionLevel::View)
            .await
            .unwrap();
        store
            .upsert_if_absent(other, first, PermissionLevel::View)
            .await
            .unwrap();

        let shared = store.list_shared_document_ids(reader).await.unwrap();
        assert_eq!(shared, BTreeSet::from([first, second]));

        let none = store
            .list_shared_document_ids(UserId::new(999))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MemoryStore::new();
        let err = store
            .update_document(&DocumentUpdate {
                id: DocumentId::new(42),
                title: "t".into(),
                content: String::new(),
                is_public: false,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_search_users_excludes_caller_and_limits() {
        let store = MemoryStore::new();
        let me = store.insert_user(&new_user("me@example.com")).await.unwrap();
        for i in 0..5 {
            store
                .insert_user(&new_user(&format!("user{i}@example.com")))
                .await
                .unwrap();
        }

        let found = store.search_users("example", me.id, 3).await.unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|u| u.id != me.id));
    }
}
