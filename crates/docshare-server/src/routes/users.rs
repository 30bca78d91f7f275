//! User lookup routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use docshare_core::User;

use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;
use crate::routes::documents::SearchQuery;
use crate::state::AppState;

/// GET /api/users/search?q=
///
/// Other users whose email contains `q`, for the share dialog and mention
/// suggestions. The caller is never included.
async fn search_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.service().search_users(user.id(), &query.q).await?;
    Ok(Json(users))
}

/// Build user routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/users/search", get(search_users))
}
