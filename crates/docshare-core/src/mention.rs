//! Mention extraction from document content.
//!
//! The rich-text editor renders a mention as a span carrying the mentioned
//! user's id, e.g. `<span data-type="mention" data-id="7">@Bob</span>`.
//! Extraction collects those ids so an edit can share the document with
//! everyone it mentions.
//!
//! The markup convention belongs to the front end, so matching sits behind
//! the [`MentionMatcher`] trait. [`RegexMentionMatcher`] is the default.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::UserId;

/// Attribute pattern the editor emits for mentions.
pub const DEFAULT_MENTION_PATTERN: &str = r#"data-id="(\d+)""#;

static DEFAULT_MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_MENTION_PATTERN).expect("valid mention regex"));

/// Strategy for finding mentioned user ids in content.
///
/// Implementations must be pure and total: no I/O, no errors. Malformed
/// mentions are skipped.
pub trait MentionMatcher: Send + Sync {
    /// Return the set of user ids mentioned in `content`.
    fn extract(&self, content: &str) -> BTreeSet<UserId>;
}

/// Regex-based matcher.
///
/// The pattern's first capture group must capture the decimal id. Ids that
/// do not fit in an unsigned 32-bit integer are skipped.
#[derive(Debug, Clone)]
pub struct RegexMentionMatcher {
    pattern: Regex,
}

impl RegexMentionMatcher {
    /// Matcher for a custom pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Default for RegexMentionMatcher {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_MENTION_RE.clone(),
        }
    }
}

impl MentionMatcher for RegexMentionMatcher {
    fn extract(&self, content: &str) -> BTreeSet<UserId> {
        self.pattern
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .filter_map(|id| id.as_str().parse::<u32>().ok())
            .map(UserId::from)
            .collect()
    }
}

/// Extract mentioned user ids using the default editor markup.
#[must_use]
pub fn extract_mentioned_user_ids(content: &str) -> BTreeSet<UserId> {
    RegexMentionMatcher::default().extract(content)
}
