//! Route definitions for the HTTP API.

pub mod auth;
pub mod documents;
pub mod health;
pub mod permissions;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(documents::routes())
        .merge(permissions::routes())
        .merge(users::routes())
        .with_state(state)
}
