//! Access control decisions.
//!
//! [`can_access`] answers "may this caller perform this kind of operation on
//! this document?" from data the caller has already loaded: the document and
//! the caller's permission grant for it, if any. It has no side effects and
//! performs no lookups.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. READ on a public document is allowed for everyone, anonymous included.
//! 2. Anonymous callers are denied with [`DenyReason::Unauthenticated`].
//! 3. The document's author is allowed at every level. No grant is consulted.
//! 4. Otherwise the caller's grant decides: none denies, `VIEW` allows READ
//!    only, `EDIT` allows READ and EDIT.

use serde::{Deserialize, Serialize};

use crate::types::{Document, Permission, PermissionLevel, UserId};

/// The identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// No credentials were presented.
    Anonymous,
    /// An authenticated user.
    User(UserId),
}

impl Caller {
    /// The caller's user id, if authenticated.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }
}

impl From<UserId> for Caller {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}

impl From<Option<UserId>> for Caller {
    fn from(id: Option<UserId>) -> Self {
        id.map_or(Self::Anonymous, Self::User)
    }
}

/// The kind of operation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    Read,
    Edit,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// No identity where one is required.
    #[error("authentication required")]
    Unauthenticated,
    /// Identity known, grant insufficient.
    #[error("insufficient permission")]
    Forbidden,
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Convert into a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }
}

/// Decide whether `caller` may perform an operation at `required` level on
/// `document`.
///
/// `permission` must be the caller's own grant for this document (or `None`);
/// grants belonging to other users or documents are treated as absent.
#[must_use]
pub fn can_access(
    caller: Caller,
    document: &Document,
    permission: Option<&Permission>,
    required: AccessLevel,
) -> AccessDecision {
    if required == AccessLevel::Read && document.is_public {
        return AccessDecision::Allow;
    }

    let Some(user_id) = caller.user_id() else {
        return AccessDecision::Deny(DenyReason::Unauthenticated);
    };

    if document.is_authored_by(user_id) {
        return AccessDecision::Allow;
    }

    let grant = permission
        .filter(|p| p.user_id == user_id && p.document_id == document.id)
        .map(|p| p.level);

    match (grant, required) {
        (None, _) => AccessDecision::Deny(DenyReason::Forbidden),
        (Some(PermissionLevel::View), AccessLevel::Read) => AccessDecision::Allow,
        (Some(PermissionLevel::View), AccessLevel::Edit) => {
            AccessDecision::Deny(DenyReason::Forbidden)
        }
        (Some(PermissionLevel::Edit), _) => AccessDecision::Allow,
    }
}

/// Whether the caller needs its grant loaded to reach a decision.
///
/// Lets callers skip the permission lookup for public reads and for the
/// author, the two cases [`can_access`] settles without a grant.
#[must_use]
pub fn needs_permission_lookup(caller: Caller, document: &Document, required: AccessLevel) -> bool {
    if required == AccessLevel::Read && document.is_public {
        return false;
    }
    match caller.user_id() {
        None => false,
        Some(user_id) => !document.is_authored_by(user_id),
    }
}

/// Only the author may grant or change access to a document.
pub fn can_share(caller: Caller, document: &Document) -> Result<(), DenyReason> {
    match caller.user_id() {
        None => Err(DenyReason::Unauthenticated),
        Some(user_id) if document.is_authored_by(user_id) => Ok(()),
        Some(_) => Err(DenyReason::Forbidden),
    }
}
