//! Notifications - durable records of state transitions

use crate::account::AccountId;
use crate::content::ContentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a notification, UUIDv7-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(u128);

impl NotificationId {
    /// Generate a new UUIDv7-based NotificationId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a NotificationId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a NotificationId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid notification id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// The event class a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// An answer of yours was accepted
    Accept,
    /// Your question received an answer
    Answer,
    /// Someone followed you
    Follow,
}

/// A draft notification, before it is assigned an id and persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    /// The account to notify
    pub recipient: AccountId,
    /// The account that triggered the event, if any
    pub sender: Option<AccountId>,
    /// Event class
    pub kind: NotificationKind,
    /// Short human-readable title
    pub title: String,
    /// Human-readable message
    pub message: String,
    /// The question involved, if any
    pub question_id: Option<ContentId>,
    /// The answer involved, if any
    pub answer_id: Option<ContentId>,
}

/// A persisted notification
///
/// Created once per triggering event; only the read flag ever mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: NotificationId,
    /// The account to notify
    pub recipient: AccountId,
    /// The account that triggered the event, if any
    pub sender: Option<AccountId>,
    /// Event class
    pub kind: NotificationKind,
    /// Short human-readable title
    pub title: String,
    /// Human-readable message
    pub message: String,
    /// The question involved, if any
    pub question_id: Option<ContentId>,
    /// The answer involved, if any
    pub answer_id: Option<ContentId>,
    /// Whether the recipient has read it
    pub read: bool,
    /// Creation time (epoch seconds)
    pub created_at: u64,
}

impl Notification {
    /// Materialize a draft with a fresh id and timestamp, unread
    pub fn from_draft(draft: NotificationDraft, created_at: u64) -> Self {
        Self {
            id: NotificationId::new(),
            recipient: draft.recipient,
            sender: draft.sender,
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            question_id: draft.question_id,
            answer_id: draft.answer_id,
            read: false,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_starts_unread() {
        let draft = NotificationDraft {
            recipient: AccountId::new(),
            sender: None,
            kind: NotificationKind::Accept,
            title: "Answer accepted".into(),
            message: "Your answer was accepted".into(),
            question_id: None,
            answer_id: None,
        };
        let note = Notification::from_draft(draft.clone(), 42);
        assert!(!note.read);
        assert_eq!(note.created_at, 42);
        assert_eq!(note.recipient, draft.recipient);
    }
}
