//! Content items - questions and answers with authorship and vote state

use crate::account::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a content item (question or answer), UUIDv7-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentId(u128);

impl ContentId {
    /// Generate a new UUIDv7-based ContentId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ContentId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ContentId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid content id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// The two kinds of votable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A question
    Question,
    /// An answer to a question
    Answer,
}

/// The public authorship of a content item
///
/// Distinct from `real_author`, which is always the posting account and is
/// kept for moderation even when the post is anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Authorship {
    /// Publicly attributed to an account
    Account(AccountId),
    /// Posted anonymously, keyed by a client-held token
    Anonymous(String),
    /// Posted anonymously with only a display name; no token was supplied
    Withheld,
}

impl Authorship {
    /// Whether the item was posted anonymously (token or withheld)
    pub fn is_anonymous(&self) -> bool {
        !matches!(self, Authorship::Account(_))
    }
}

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    /// Upvote
    Up,
    /// Downvote
    Down,
}

/// Aggregate vote counts for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    /// Number of accounts currently in the upvote set
    pub upvotes: u64,
    /// Number of accounts currently in the downvote set
    pub downvotes: u64,
}

/// The full vote record of an item: disjoint upvoter and downvoter sets
///
/// An account id appears in at most one of the two sets at any time; the
/// storage layer enforces this with a single keyed row per (item, voter).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteSets {
    /// Accounts that currently upvote the item
    pub upvotes: Vec<AccountId>,
    /// Accounts that currently downvote the item
    pub downvotes: Vec<AccountId>,
}

impl VoteSets {
    /// Aggregate counts over the two sets
    pub fn tally(&self) -> VoteTally {
        VoteTally {
            upvotes: self.upvotes.len() as u64,
            downvotes: self.downvotes.len() as u64,
        }
    }
}

/// A question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier
    pub id: ContentId,

    /// Title
    pub title: String,

    /// Body text
    pub body: String,

    /// Tag set
    pub tags: Vec<String>,

    /// Public authorship
    pub author: Authorship,

    /// The posting account, kept for moderation even on anonymous posts
    pub real_author: AccountId,

    /// Derived flag: true iff at least one live answer is accepted.
    /// Recomputed from the answer set on every acceptance transition,
    /// never incrementally tracked.
    pub is_accepted: bool,

    /// Number of live answers referencing this question
    pub answer_count: i64,

    /// View counter
    pub view_count: i64,

    /// Creation time (epoch seconds)
    pub created_at: u64,
}

/// An answer to a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Unique identifier
    pub id: ContentId,

    /// The question this answers
    pub question_id: ContentId,

    /// Body text
    pub body: String,

    /// Public authorship
    pub author: Authorship,

    /// The posting account, kept for moderation even on anonymous posts
    pub real_author: AccountId,

    /// Whether the question's author accepted this answer
    pub is_accepted: bool,

    /// Creation time (epoch seconds)
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_roundtrip() {
        let id = ContentId::new();
        let parsed = ContentId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_authorship_anonymity() {
        assert!(!Authorship::Account(AccountId::new()).is_anonymous());
        assert!(Authorship::Anonymous("tok-123".into()).is_anonymous());
        assert!(Authorship::Withheld.is_anonymous());
    }

    #[test]
    fn test_vote_sets_tally() {
        let sets = VoteSets {
            upvotes: vec![AccountId::from_value(1), AccountId::from_value(2)],
            downvotes: vec![AccountId::from_value(3)],
        };
        let tally = sets.tally();
        assert_eq!(tally.upvotes, 2);
        assert_eq!(tally.downvotes, 1);
    }
}
