//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the core engine and
//! infrastructure. Persistence lives in `agora-store`; realtime push in
//! `agora-notify`; blob storage is an external collaborator reached only for
//! compensating cleanup.
//!
//! All coordination happens through the backing store's per-statement
//! atomicity: counter mutations are expressed as deltas and vote mutations as
//! keyed set operations, never as read-modify-write of a whole record.

use crate::account::{Account, AccountCounter, AccountId};
use crate::content::{Answer, ContentId, ItemKind, Question, VoteDirection, VoteSets};
use crate::notification::{Notification, NotificationId};

/// Trait for account persistence
///
/// Implemented by the infrastructure layer (agora-store)
pub trait AccountStore {
    /// Error type for store operations
    type Error;

    /// Insert a new account
    fn insert_account(&mut self, account: &Account) -> Result<(), Self::Error>;

    /// Get an account by id
    fn get_account(&self, id: AccountId) -> Result<Option<Account>, Self::Error>;

    /// Atomically add `delta` to the account's reputation
    fn adjust_reputation(&mut self, id: AccountId, delta: i64) -> Result<(), Self::Error>;

    /// Atomically add `delta` to one of the account's contribution counters
    fn adjust_counter(
        &mut self,
        id: AccountId,
        counter: AccountCounter,
        delta: i64,
    ) -> Result<(), Self::Error>;
}

/// Trait for question/answer persistence and the vote ledger's set primitives
///
/// Implemented by the infrastructure layer (agora-store)
pub trait ContentStore {
    /// Error type for store operations
    type Error;

    /// Insert a new question
    fn insert_question(&mut self, question: &Question) -> Result<(), Self::Error>;

    /// Get a question by id
    fn get_question(&self, id: ContentId) -> Result<Option<Question>, Self::Error>;

    /// Insert a new answer
    fn insert_answer(&mut self, answer: &Answer) -> Result<(), Self::Error>;

    /// Get an answer by id
    fn get_answer(&self, id: ContentId) -> Result<Option<Answer>, Self::Error>;

    /// All live answers referencing a question
    fn answers_for_question(&self, question_id: ContentId) -> Result<Vec<Answer>, Self::Error>;

    /// Whether an item of the given kind exists
    fn item_exists(&self, kind: ItemKind, id: ContentId) -> Result<bool, Self::Error>;

    /// Replace an item's body; returns false when the item does not exist
    fn update_body(&mut self, kind: ItemKind, id: ContentId, body: &str)
        -> Result<bool, Self::Error>;

    /// Delete an answer and its votes; returns false when it does not exist
    fn delete_answer(&mut self, id: ContentId) -> Result<bool, Self::Error>;

    /// Delete a question, all answers referencing it, and all their votes.
    /// Returns false when the question does not exist.
    fn delete_question_cascade(&mut self, id: ContentId) -> Result<bool, Self::Error>;

    /// Atomically add `delta` to a question's live-answer count
    fn adjust_answer_count(&mut self, question_id: ContentId, delta: i64)
        -> Result<(), Self::Error>;

    /// Set an answer's acceptance flag
    fn set_answer_accepted(&mut self, id: ContentId, accepted: bool) -> Result<(), Self::Error>;

    /// Count of live accepted answers for a question
    fn accepted_answer_count(&self, question_id: ContentId) -> Result<u64, Self::Error>;

    /// Set a question's derived acceptance flag
    fn set_question_accepted(&mut self, id: ContentId, accepted: bool) -> Result<(), Self::Error>;

    /// Remove the voter's vote in the given direction only.
    /// Returns true when a vote was removed.
    fn remove_vote_in_direction(
        &mut self,
        kind: ItemKind,
        id: ContentId,
        voter: AccountId,
        direction: VoteDirection,
    ) -> Result<bool, Self::Error>;

    /// Put the voter's vote, replacing any prior vote in either direction.
    /// One keyed row per (item, voter) keeps the two sets disjoint.
    fn put_vote(
        &mut self,
        kind: ItemKind,
        id: ContentId,
        voter: AccountId,
        direction: VoteDirection,
    ) -> Result<(), Self::Error>;

    /// The item's current upvoter and downvoter sets
    fn vote_sets(&self, kind: ItemKind, id: ContentId) -> Result<VoteSets, Self::Error>;
}

/// Trait for durable notification persistence
///
/// Implemented by the infrastructure layer (agora-store)
pub trait NotificationStore {
    /// Error type for store operations
    type Error;

    /// Insert a notification
    fn insert_notification(&mut self, notification: &Notification) -> Result<(), Self::Error>;

    /// Notifications for a recipient, newest first
    fn notifications_for(&self, recipient: AccountId) -> Result<Vec<Notification>, Self::Error>;

    /// Mark a notification read; returns false when it does not exist
    /// or belongs to a different recipient
    fn mark_read(
        &mut self,
        id: NotificationId,
        recipient: AccountId,
    ) -> Result<bool, Self::Error>;
}

/// Trait for the external blob store holding uploaded images
///
/// The core only ever deletes: uploads happen before content creation, and
/// when the subsequent store write fails the already-uploaded assets must be
/// cleaned up as a compensating action. There is no transactional link
/// between the blob store and the document store.
pub trait AssetStore {
    /// Error type for blob operations
    type Error;

    /// Delete an uploaded asset by key
    fn delete_asset(&mut self, key: &str) -> Result<(), Self::Error>;
}

/// Trait for the best-effort realtime push channel
///
/// A push is a hint layered on top of durable storage: a missed event must
/// not lose the notification, since clients can always re-fetch.
pub trait RealtimeSink {
    /// Error type for push operations
    type Error;

    /// Push a freshly persisted notification toward its recipient
    fn push(&self, notification: &Notification) -> Result<(), Self::Error>;
}
