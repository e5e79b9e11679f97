//! Agora Domain Layer
//!
//! This crate contains the core business model for Agora's voting, acceptance
//! and reputation engine. It defines the fundamental entities, the dual-identity
//! actor model, the shared error taxonomy, and the trait interfaces that all
//! other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Account**: A registered identity with persistent reputation and counters
//! - **Actor**: The dual-identity sum type - authenticated account or anonymous token
//! - **Question / Answer**: Content items carrying authorship, vote sets and acceptance state
//! - **Notification**: A durable, at-most-once record of a state transition
//!
//! ## Architecture
//!
//! This crate holds business logic and contracts only. Infrastructure
//! implementations (SQLite persistence, HTTP transport, realtime push) live in
//! other crates behind the traits defined here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod actor;
pub mod content;
pub mod error;
pub mod notification;
pub mod traits;

// Re-exports for convenience
pub use account::{Account, AccountCounter, AccountId};
pub use actor::{Actor, Credentials};
pub use content::{
    Answer, Authorship, ContentId, ItemKind, Question, VoteDirection, VoteSets, VoteTally,
};
pub use error::CoreError;
pub use notification::{Notification, NotificationDraft, NotificationId, NotificationKind};
