//! Optional caller identity for routes that also serve anonymous requests.

use axum::{extract::FromRequestParts, http::request::Parts};
use docshare_core::{Caller, User};

use crate::auth::{authenticate, bearer_token};
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user, or `None` when no Authorization header was sent.
///
/// A header that is present but invalid is still rejected with 401; only a
/// missing header means anonymous.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn caller(&self) -> Caller {
        self.0.as_ref().map(|user| user.id).into()
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeUser(Some(authenticate(token, state).await?))),
            None => Ok(MaybeUser(None)),
        }
    }
}
