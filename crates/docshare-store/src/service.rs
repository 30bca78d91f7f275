//! Document service: access-checked reads and the edit pipeline.
//!
//! [`DocumentService`] composes the access control rules from docshare-core
//! with a [`Backend`]. Every public operation that takes a [`Caller`] checks
//! access first. [`DocumentService::apply_edit`] is the exception: it trusts
//! that its caller already confirmed EDIT access.
//!
//! An edit runs in a fixed order:
//!
//! 1. snapshot the current title and content as a new version, attributed to
//!    the editor (failure aborts with the document unchanged);
//! 2. replace title, content and public flag (failure aborts; the snapshot
//!    stays as a harmless orphan);
//! 3. extract mentions from the new content;
//! 4. grant VIEW to each mentioned user other than the author, never
//!    downgrading an existing grant. A failed grant is logged and skipped.
//!
//! Concurrent edits to one document are last-writer-wins. Each writer's
//! pre-edit state is still captured in the version history.

use std::fmt;
use std::sync::Arc;

use docshare_core::{
    AccessLevel, Caller, Document, DocumentDraft, DocumentEdit, DocumentId, MentionMatcher,
    Permission, PermissionLevel, RegexMentionMatcher, User, UserId, Version, can_access,
    can_share, needs_permission_lookup,
};

use crate::backend::{Backend, DEFAULT_USER_SEARCH_LIMIT};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{DocumentUpdate, NewDocument, NewVersion};

/// Longest accepted title, in characters. Matches the column width.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Access-checked document operations over a storage backend.
#[derive(Clone)]
pub struct DocumentService {
    backend: Arc<dyn Backend>,
    matcher: Arc<dyn MentionMatcher>,
}

impl fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentService").finish_non_exhaustive()
    }
}

fn validate_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::ValidationFailed("title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ServiceError::ValidationFailed(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

impl DocumentService {
    /// Service using the default editor mention markup.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_matcher(backend, Arc::new(RegexMentionMatcher::default()))
    }

    /// Service with a custom mention matching strategy.
    pub fn with_matcher(backend: Arc<dyn Backend>, matcher: Arc<dyn MentionMatcher>) -> Self {
        Self { backend, matcher }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Load a document and check that `caller` may act on it at `required`.
    ///
    /// The caller's grant is only fetched when the decision depends on it.
    pub async fn authorize(
        &self,
        caller: Caller,
        document_id: DocumentId,
        required: AccessLevel,
    ) -> ServiceResult<Document> {
        let document = self.load_document(document_id).await?;

        let permission = match caller.user_id() {
            Some(user_id) if needs_permission_lookup(caller, &document, required) => {
                self.backend.get_permission(user_id, document_id).await?
            }
            _ => None,
        };

        can_access(caller, &document, permission.as_ref(), required).into_result()?;
        Ok(document)
    }

    async fn load_document(&self, document_id: DocumentId) -> ServiceResult<Document> {
        self.backend
            .get_document(document_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("document {document_id}")))
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Read a document. Public documents are readable anonymously.
    pub async fn get_document(
        &self,
        caller: Caller,
        document_id: DocumentId,
    ) -> ServiceResult<Document> {
        self.authorize(caller, document_id, AccessLevel::Read).await
    }

    /// Create a document owned by `author`.
    ///
    /// No version is recorded and mentions in the initial content are not
    /// shared; both happen on edit.
    pub async fn create_document(
        &self,
        author: UserId,
        draft: DocumentDraft,
    ) -> ServiceResult<Document> {
        validate_title(&draft.title)?;

        let document = self
            .backend
            .insert_document(&NewDocument {
                title: draft.title,
                content: draft.content,
                is_public: draft.is_public,
                author_id: author,
            })
            .await?;

        tracing::info!(document_id = %document.id, author_id = %author, "Document created");
        Ok(document)
    }

    /// Apply a full-replace edit to an already-authorized document.
    ///
    /// Does not check access. Callers must have confirmed EDIT for `editor`
    /// on `document` (see [`update_document`](Self::update_document)).
    pub async fn apply_edit(
        &self,
        editor: UserId,
        document: &Document,
        edit: DocumentEdit,
    ) -> ServiceResult<Document> {
        let snapshot = NewVersion::snapshot(document, editor);
        let version = self
            .backend
            .append_version(&snapshot)
            .await
            .inspect_err(|e| {
                tracing::error!(document_id = %document.id, error = %e, "Version snapshot failed, edit aborted");
            })?;
        tracing::debug!(document_id = %document.id, version_id = version.id, "Version recorded");

        let updated = self
            .backend
            .update_document(&DocumentUpdate {
                id: document.id,
                title: edit.title,
                content: edit.content,
                is_public: edit.is_public,
            })
            .await?;

        tracing::info!(document_id = %updated.id, editor_id = %editor, "Document updated");

        self.share_with_mentioned(&updated).await;

        Ok(updated)
    }

    /// Grant VIEW to everyone mentioned in the document except its author.
    async fn share_with_mentioned(&self, document: &Document) {
        let mentioned = self.matcher.extract(&document.content);

        for user_id in mentioned {
            if user_id == document.author_id {
                continue;
            }
            match self
                .backend
                .upsert_if_absent(user_id, document.id, PermissionLevel::View)
                .await
            {
                Ok(permission) => tracing::debug!(
                    document_id = %document.id,
                    user_id = %user_id,
                    level = %permission.level,
                    "Mention grant ensured"
                ),
                Err(e) => tracing::warn!(
                    document_id = %document.id,
                    user_id = %user_id,
                    error = %e,
                    "Mention grant failed, skipping"
                ),
            }
        }
    }

    /// Check EDIT access, validate, then run [`apply_edit`](Self::apply_edit).
    ///
    /// The document is re-read for the check; there is no concurrency token.
    pub async fn update_document(
        &self,
        caller: Caller,
        document_id: DocumentId,
        edit: DocumentEdit,
    ) -> ServiceResult<Document> {
        let document = self
            .authorize(caller, document_id, AccessLevel::Edit)
            .await?;
        validate_title(&edit.title)?;

        // authorize() only allows EDIT for an authenticated caller
        let editor = caller.user_id().ok_or(ServiceError::Unauthenticated)?;
        self.apply_edit(editor, &document, edit).await
    }

    /// Documents the user authored, that are public, or that are shared with
    /// them. Most recently updated first.
    pub async fn list_documents(&self, user_id: UserId) -> ServiceResult<Vec<Document>> {
        Ok(self.backend.list_visible_documents(user_id).await?)
    }

    /// Visible documents whose title or content contains `query`.
    ///
    /// The query is matched as given, surrounding whitespace included. A
    /// blank query matches nothing.
    pub async fn search_documents(
        &self,
        user_id: UserId,
        query: &str,
    ) -> ServiceResult<Vec<Document>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .backend
            .search_visible_documents(user_id, query)
            .await?)
    }

    // ========================================================================
    // Sharing
    // ========================================================================

    /// Set `email`'s grant on a document to exactly `level`. Author only.
    pub async fn share_document(
        &self,
        caller: Caller,
        document_id: DocumentId,
        email: &str,
        level: PermissionLevel,
    ) -> ServiceResult<Permission> {
        let document = self.load_document(document_id).await?;
        can_share(caller, &document)?;

        let email = email.trim();
        if email.is_empty() {
            return Err(ServiceError::ValidationFailed("email is required".into()));
        }

        let target = self
            .backend
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {email}")))?;

        if document.is_authored_by(target.id) {
            return Err(ServiceError::ValidationFailed(
                "cannot share a document with its author".into(),
            ));
        }

        let permission = self
            .backend
            .upsert_overwrite(target.id, document_id, level)
            .await?;

        tracing::info!(
            document_id = %document_id,
            user_id = %target.id,
            level = %level,
            "Document shared"
        );
        Ok(permission)
    }

    /// Grants on a document, oldest first.
    ///
    /// Only the author and users holding a grant may list them. Public
    /// visibility alone is not enough.
    pub async fn list_permissions(
        &self,
        caller: Caller,
        document_id: DocumentId,
    ) -> ServiceResult<Vec<Permission>> {
        let document = self
            .authorize(caller, document_id, AccessLevel::Read)
            .await?;
        let user_id = caller.user_id().ok_or(ServiceError::Unauthenticated)?;

        if !document.is_authored_by(user_id)
            && self
                .backend
                .get_permission(user_id, document_id)
                .await?
                .is_none()
        {
            return Err(ServiceError::Forbidden(
                "only the author and collaborators can list grants".into(),
            ));
        }

        Ok(self.backend.list_document_permissions(document_id).await?)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// A document's versions, newest first. Requires READ.
    pub async fn list_versions(
        &self,
        caller: Caller,
        document_id: DocumentId,
    ) -> ServiceResult<Vec<Version>> {
        self.authorize(caller, document_id, AccessLevel::Read)
            .await?;
        Ok(self.backend.list_versions(document_id).await?)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Other users whose email contains `query`, for share and mention
    /// pickers.
    pub async fn search_users(&self, caller: UserId, query: &str) -> ServiceResult<Vec<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .backend
            .search_users(query, caller, DEFAULT_USER_SEARCH_LIMIT)
            .await?)
    }
}
