//! The reputation ledger - additive scoring for contribution volume

use agora_domain::traits::AccountStore;
use agora_domain::{AccountCounter, AccountId, CoreError};

/// Reputation awarded to the author when a question is created
pub const QUESTION_CREATED_REPUTATION: i64 = 50;

/// Reputation awarded to the author when an answer is created
pub const ANSWER_CREATED_REPUTATION: i64 = 100;

/// The operation justifying a reputation mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardReason {
    /// A question was created
    QuestionCreated,
    /// An answer was created
    AnswerCreated,
    /// An answer transitioned to accepted. Moves only the accepted-answers
    /// counter; reputation itself is not incremented at acceptance.
    AnswerAccepted,
}

/// Applies point deltas and contribution counters to accounts
///
/// Mutations are applied synchronously within the operation that justifies
/// them, as atomic store-side increments. There is no rollback path if a
/// later step of the same request fails after reputation was applied; that
/// partial application is a known gap of the system, accepted rather than
/// compensated.
pub struct ReputationLedger;

impl ReputationLedger {
    /// Create a new reputation ledger
    pub fn new() -> Self {
        Self
    }

    /// Award the deltas for `reason` to the account
    pub fn award<A: AccountStore>(
        &self,
        accounts: &mut A,
        account_id: AccountId,
        reason: RewardReason,
    ) -> Result<(), CoreError>
    where
        A::Error: std::fmt::Display,
    {
        match reason {
            RewardReason::QuestionCreated => {
                accounts
                    .adjust_reputation(account_id, QUESTION_CREATED_REPUTATION)
                    .map_err(CoreError::store)?;
                accounts
                    .adjust_counter(account_id, AccountCounter::QuestionsAsked, 1)
                    .map_err(CoreError::store)?;
            }
            RewardReason::AnswerCreated => {
                accounts
                    .adjust_reputation(account_id, ANSWER_CREATED_REPUTATION)
                    .map_err(CoreError::store)?;
                accounts
                    .adjust_counter(account_id, AccountCounter::AnswersGiven, 1)
                    .map_err(CoreError::store)?;
            }
            RewardReason::AnswerAccepted => {
                accounts
                    .adjust_counter(account_id, AccountCounter::AcceptedAnswers, 1)
                    .map_err(CoreError::store)?;
            }
        }

        tracing::debug!(account = %account_id, ?reason, "reputation awarded");
        Ok(())
    }
}

impl Default for ReputationLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_domain::Account;
    use agora_store::SqliteStore;

    fn store_with_account() -> (SqliteStore, AccountId) {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let account = Account::new(AccountId::new(), "ada".into(), "ada@example.org".into());
        store.insert_account(&account).unwrap();
        (store, account.id)
    }

    #[test]
    fn test_question_creation_award() {
        let (mut store, id) = store_with_account();
        let ledger = ReputationLedger::new();

        ledger
            .award(&mut store, id, RewardReason::QuestionCreated)
            .unwrap();

        let account = store.get_account(id).unwrap().unwrap();
        assert_eq!(account.reputation, QUESTION_CREATED_REPUTATION);
        assert_eq!(account.questions_asked, 1);
        assert_eq!(account.answers_given, 0);
    }

    #[test]
    fn test_answer_creation_award() {
        let (mut store, id) = store_with_account();
        let ledger = ReputationLedger::new();

        ledger
            .award(&mut store, id, RewardReason::AnswerCreated)
            .unwrap();

        let account = store.get_account(id).unwrap().unwrap();
        assert_eq!(account.reputation, ANSWER_CREATED_REPUTATION);
        assert_eq!(account.answers_given, 1);
    }

    #[test]
    fn test_acceptance_moves_counter_not_reputation() {
        let (mut store, id) = store_with_account();
        let ledger = ReputationLedger::new();

        ledger
            .award(&mut store, id, RewardReason::AnswerAccepted)
            .unwrap();

        let account = store.get_account(id).unwrap().unwrap();
        assert_eq!(account.reputation, 0);
        assert_eq!(account.accepted_answers, 1);
    }

    #[test]
    fn test_missing_account_surfaces_store_error() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let ledger = ReputationLedger::new();

        let err = ledger
            .award(&mut store, AccountId::new(), RewardReason::AnswerCreated)
            .unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
    }
}
