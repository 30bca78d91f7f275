//! Document routes.
//!
//! - GET /api/documents - Documents visible to the caller
//! - POST /api/documents - Create a document
//! - GET /api/documents/search?q= - Search visible documents
//! - GET /api/documents/{id} - Read a document (anonymous if public)
//! - PUT /api/documents/{id} - Replace title, content and visibility
//! - GET /api/documents/{id}/versions - Version history, newest first

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use docshare_core::{Document, DocumentDraft, DocumentEdit, DocumentId, Version};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;
use crate::extract::MaybeUser;
use crate::state::AppState;

/// Query string for search endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/documents
///
/// Documents the caller authored, public documents, and documents shared
/// with the caller, most recently updated first.
async fn list_documents(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Document>>> {
    let documents = state.service().list_documents(user.id()).await?;
    Ok(Json(documents))
}

/// POST /api/documents
///
/// # Response
/// - 201 Created with the new document
/// - 400 Bad Request if the title is blank
async fn create_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(draft): Json<DocumentDraft>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let document = state.service().create_document(user.id(), draft).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/documents/search?q=
///
/// A blank query returns an empty list.
async fn search_documents(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let documents = state
        .service()
        .search_documents(user.id(), &query.q)
        .await?;
    Ok(Json(documents))
}

/// GET /api/documents/{id}
///
/// # Response
/// - 200 OK with the document
/// - 401 Unauthorized if the document is private and no token was sent
/// - 403 Forbidden if the caller holds no grant
/// - 404 Not Found
async fn get_document(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<DocumentId>,
) -> ApiResult<Json<Document>> {
    let document = state.service().get_document(caller.caller(), id).await?;
    Ok(Json(document))
}

/// PUT /api/documents/{id}
///
/// Full replace: omitted `content` and `isPublic` reset to empty and false.
/// Mentioned users gain VIEW access.
///
/// # Response
/// - 200 OK with the updated document
/// - 400 Bad Request if the title is blank
/// - 403 Forbidden without EDIT access
/// - 404 Not Found
async fn update_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<DocumentId>,
    Json(edit): Json<DocumentEdit>,
) -> ApiResult<Json<Document>> {
    let document = state
        .service()
        .update_document(user.caller(), id, edit)
        .await?;
    Ok(Json(document))
}

/// GET /api/documents/{id}/versions
///
/// Requires READ access; newest first.
async fn list_versions(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<DocumentId>,
) -> ApiResult<Json<Vec<Version>>> {
    let versions = state.service().list_versions(caller.caller(), id).await?;
    Ok(Json(versions))
}

/// Build document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/documents", get(list_documents).post(create_document))
        .route("/api/documents/search", get(search_documents))
        .route("/api/documents/{id}", get(get_document).put(update_document))
        .route("/api/documents/{id}/versions", get(list_versions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_defaults_to_empty() {
        let query: SearchQuery = serde_json::from_str("{}").unwrap();
        assert!(query.q.is_empty());
    }

    #[test]
    fn test_edit_body_is_camel_case() {
        let json = r#"{"title": "Plan", "content": "<p>x</p>", "isPublic": true}"#;
        let edit: DocumentEdit = serde_json::from_str(json).unwrap();
        assert!(edit.is_public);
        assert_eq!(edit.content, "<p>x</p>");
    }
}
