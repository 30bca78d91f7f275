//! Permission routes.
//!
//! - GET /api/documents/{id}/permissions - Grants on a document
//! - POST /api/documents/{id}/permissions - Share a document by email

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use docshare_core::{DocumentId, Permission, PermissionLevel};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;
use crate::extract::MaybeUser;
use crate::state::AppState;

/// Request body for sharing a document.
#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    /// Email of the user to share with.
    pub email: String,
    /// Level to set, replacing any existing grant.
    pub level: PermissionLevel,
}

/// GET /api/documents/{id}/permissions
///
/// Oldest grant first.
///
/// # Response
/// - 200 OK with the grants
/// - 401 Unauthorized for anonymous callers, even on public documents
/// - 403 Forbidden if the caller is neither the author nor a grantee
/// - 404 Not Found if the document does not exist
async fn list_permissions(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<DocumentId>,
) -> ApiResult<Json<Vec<Permission>>> {
    let permissions = state
        .service()
        .list_permissions(caller.caller(), id)
        .await?;
    Ok(Json(permissions))
}

/// POST /api/documents/{id}/permissions
///
/// Only the author can share. Re-sharing with the same user sets exactly
/// the requested level, which may be a downgrade.
///
/// # Request
/// ```json
/// { "email": "bob@example.com", "level": "EDIT" }
/// ```
///
/// # Response
/// - 201 Created with the resulting grant
/// - 400 Bad Request if the target is the author
/// - 403 Forbidden if the caller is not the author
/// - 404 Not Found if the document or target user does not exist
async fn share_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<DocumentId>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<(StatusCode, Json<Permission>)> {
    let permission = state
        .service()
        .share_document(user.caller(), id, &request.email, request.level)
        .await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

/// Build permission routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/documents/{id}/permissions",
        get(list_permissions).post(share_document),
    )
}
