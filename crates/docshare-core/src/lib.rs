//! docshare-core: Core types and decision logic for the Docshare document service
//!
//! This crate provides:
//! - Domain types for users, documents, permission grants and versions
//! - The access control decision function
//! - Mention extraction used for automatic sharing
//!
//! Nothing here performs I/O. Callers load documents and grants from the
//! store and hand them in.
//!
//! # Usage
//!
//! ```rust,ignore
//! use docshare_core::{AccessLevel, Caller, can_access};
//!
//! let decision = can_access(Caller::User(user.id), &document, grant.as_ref(), AccessLevel::Edit);
//! decision.into_result()?;
//! ```

pub mod access;
pub mod mention;
pub mod types;

pub use access::{
    AccessDecision, AccessLevel, Caller, DenyReason, can_access, can_share,
    needs_permission_lookup,
};
pub use mention::{
    DEFAULT_MENTION_PATTERN, MentionMatcher, RegexMentionMatcher, extract_mentioned_user_ids,
};
pub use types::*;
