//! Account module - registered identities with persistent reputation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an account based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability (signup order)
/// - 128-bit uniqueness without coordination
/// - RFC 9562-standard format with broad ecosystem support
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(u128);

impl AccountId {
    /// Generate a new UUIDv7-based AccountId
    ///
    /// # Examples
    ///
    /// ```
    /// use agora_domain::AccountId;
    ///
    /// let id = AccountId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an AccountId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an AccountId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid account id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Counters on an account mutated only by the reputation ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountCounter {
    /// Number of questions the account has asked
    QuestionsAsked,
    /// Number of answers the account has given
    AnswersGiven,
    /// Number of times one of the account's answers was accepted.
    /// High-water mark: unaccepting an answer never decrements it.
    AcceptedAnswers,
}

/// A registered account
///
/// Accounts are created at signup bootstrap and never hard-deleted, so
/// authored content always has a resolvable `real_author`. Reputation and the
/// contribution counters are mutated only by the reputation ledger; the
/// suspension window and ban flag only by moderation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,

    /// Unique public handle
    pub handle: String,

    /// Unique contact address
    pub contact: String,

    /// Additive contribution score; never decremented by this engine
    pub reputation: i64,

    /// Questions asked
    pub questions_asked: i64,

    /// Answers given
    pub answers_given: i64,

    /// Accepted-answer count (high-water mark)
    pub accepted_answers: i64,

    /// Start of the suspension window (epoch seconds), if any
    pub suspended_from: Option<u64>,

    /// End of the suspension window (epoch seconds), if any
    pub suspended_until: Option<u64>,

    /// Moderation note for the suspension
    pub suspension_reason: Option<String>,

    /// Banned accounts fail every mutating operation
    pub banned: bool,

    /// Moderators may edit and delete any content item
    pub moderator: bool,
}

impl Account {
    /// Create a new account with zeroed counters and no moderation state
    pub fn new(id: AccountId, handle: String, contact: String) -> Self {
        Self {
            id,
            handle,
            contact,
            reputation: 0,
            questions_asked: 0,
            answers_given: 0,
            accepted_answers: 0,
            suspended_from: None,
            suspended_until: None,
            suspension_reason: None,
            banned: false,
            moderator: false,
        }
    }

    /// Whether `now` (epoch seconds) falls inside the suspension window
    pub fn is_suspended_at(&self, now: u64) -> bool {
        match (self.suspended_from, self.suspended_until) {
            (Some(from), Some(until)) => now >= from && now < until,
            (Some(from), None) => now >= from,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_ordering() {
        let id1 = AccountId::from_value(1000);
        let id2 = AccountId::from_value(2000);

        assert!(id1 < id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_account_id_display_and_parse() {
        let id = AccountId::new();
        let id_str = id.to_string();

        assert_eq!(id_str.len(), 36);

        let parsed = AccountId::from_string(&id_str).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_account_id_invalid_string() {
        assert!(AccountId::from_string("not-a-valid-uuid").is_err());
        assert!(AccountId::from_string("").is_err());
    }

    #[test]
    fn test_suspension_window() {
        let mut account = Account::new(AccountId::new(), "ada".into(), "ada@example.org".into());
        assert!(!account.is_suspended_at(1_000));

        account.suspended_from = Some(500);
        account.suspended_until = Some(2_000);
        assert!(account.is_suspended_at(1_000));
        assert!(!account.is_suspended_at(2_000));
        assert!(!account.is_suspended_at(400));
    }

    #[test]
    fn test_open_ended_suspension() {
        let mut account = Account::new(AccountId::new(), "ada".into(), "ada@example.org".into());
        account.suspended_from = Some(500);
        assert!(account.is_suspended_at(u64::MAX));
        assert!(!account.is_suspended_at(499));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: AccountId ordering matches u128 ordering
        #[test]
        fn test_id_ordering_property(a: u128, b: u128) {
            let id_a = AccountId::from_value(a);
            let id_b = AccountId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        /// Property: round-trip through string representation preserves the id
        #[test]
        fn test_id_string_roundtrip(value: u128) {
            let id = AccountId::from_value(value);
            let id_str = id.to_string();

            match AccountId::from_string(&id_str) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }

        /// Property: a closed suspension window is half-open [from, until)
        #[test]
        fn test_suspension_half_open(from in 0u64..10_000, len in 1u64..10_000) {
            let mut account = Account::new(AccountId::new(), "h".into(), "c".into());
            account.suspended_from = Some(from);
            account.suspended_until = Some(from + len);

            prop_assert!(account.is_suspended_at(from));
            prop_assert!(!account.is_suspended_at(from + len));
        }
    }
}
