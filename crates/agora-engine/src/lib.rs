//! Agora Core Engine
//!
//! The vote / acceptance / reputation consistency engine. This crate holds
//! the logic with real invariants:
//!
//! - **Vote ledger**: one vote per account per item, with toggle semantics,
//!   expressed as keyed set mutations the store applies atomically
//! - **Acceptance state machine**: per-answer accept toggle gated on the
//!   question's author, with the question's derived flag recomputed from the
//!   authoritative answer set on every transition
//! - **Reputation ledger**: additive scoring applied synchronously with the
//!   operation that justifies it; the accepted-answers counter is a
//!   high-water mark
//! - **Content orchestration**: creation and deletion with cascade,
//!   compensating asset cleanup, and best-effort notification fan-out
//!
//! All coordination relies on the backing store's per-statement atomicity;
//! the engine keeps no in-process state between invocations.

#![warn(missing_docs)]

mod acceptance;
mod content;
mod reputation;
mod votes;

pub use acceptance::AcceptanceEngine;
pub use content::{ContentEngine, NewAnswer, NewQuestion, NoAssets, MIN_BODY_CHARS};
pub use reputation::{
    ReputationLedger, RewardReason, ANSWER_CREATED_REPUTATION, QUESTION_CREATED_REPUTATION,
};
pub use votes::VoteLedger;
