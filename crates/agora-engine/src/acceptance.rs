//! The acceptance state machine - per-answer accept toggle with a derived
//! question flag

use crate::reputation::{ReputationLedger, RewardReason};
use agora_domain::traits::{AccountStore, ContentStore, NotificationStore, RealtimeSink};
use agora_domain::{
    Actor, Authorship, ContentId, CoreError, NotificationDraft, NotificationKind,
};
use agora_notify::Fanout;

/// Governs the `Unaccepted -> Accepted -> Unaccepted` toggle per answer
///
/// Multiple answers of one question may be independently accepted. The parent
/// question's `is_accepted` is a derived OR over its live answers' flags,
/// recomputed from the authoritative answer set on every transition rather
/// than incrementally tracked, so ad hoc increment/decrement pairs can never
/// make it drift.
pub struct AcceptanceEngine {
    reputation: ReputationLedger,
}

impl AcceptanceEngine {
    /// Create a new acceptance engine
    pub fn new() -> Self {
        Self {
            reputation: ReputationLedger::new(),
        }
    }

    /// Toggle acceptance of an answer
    ///
    /// Only the authenticated author of the parent question may transition.
    /// On `Unaccepted -> Accepted` the answering account's accepted-answers
    /// counter is incremented and an accept notification goes out to the
    /// answer's author (skipped for anonymous authorship - there is no
    /// recipient). On `Accepted -> Unaccepted` the counter is NOT
    /// decremented: it is a high-water mark, and a later re-accept is a
    /// fresh transition that increments it again.
    ///
    /// Returns the answer's new acceptance flag.
    ///
    /// # Errors
    ///
    /// `NotFound` when the answer or its question is missing; `Forbidden`
    /// when the actor is not the question's author.
    pub fn toggle<S, R>(
        &self,
        store: &mut S,
        fanout: &Fanout<R>,
        answer_id: ContentId,
        actor: &Actor,
        now: u64,
    ) -> Result<bool, CoreError>
    where
        S: ContentStore + AccountStore + NotificationStore,
        <S as ContentStore>::Error: std::fmt::Display,
        <S as AccountStore>::Error: std::fmt::Display,
        <S as NotificationStore>::Error: std::fmt::Display,
        R: RealtimeSink,
        R::Error: std::fmt::Display,
    {
        let answer = store
            .get_answer(answer_id)
            .map_err(CoreError::store)?
            .ok_or_else(|| CoreError::not_found(format!("answer {}", answer_id)))?;

        let question = store
            .get_question(answer.question_id)
            .map_err(CoreError::store)?
            .ok_or_else(|| CoreError::not_found(format!("question {}", answer.question_id)))?;

        match actor {
            Actor::Authenticated(id) if *id == question.real_author => {}
            Actor::Authenticated(_) => {
                return Err(CoreError::forbidden(
                    "only the question's author may accept answers",
                ))
            }
            Actor::Anonymous(_) => {
                return Err(CoreError::forbidden(
                    "only the question's author may accept answers",
                ))
            }
        }

        let now_accepted = !answer.is_accepted;
        store
            .set_answer_accepted(answer_id, now_accepted)
            .map_err(CoreError::store)?;

        if now_accepted {
            self.reputation
                .award(store, answer.real_author, RewardReason::AnswerAccepted)?;

            if let Authorship::Account(recipient) = answer.author {
                fanout.send(
                    store,
                    NotificationDraft {
                        recipient,
                        sender: Some(question.real_author),
                        kind: NotificationKind::Accept,
                        title: "Answer accepted".to_string(),
                        message: format!("Your answer to \"{}\" was accepted", question.title),
                        question_id: Some(question.id),
                        answer_id: Some(answer_id),
                    },
                    now,
                );
            }
        }

        // Count-then-set over the live answers. This recompute is not atomic
        // with the flag write above: two concurrent toggles on different
        // answers of the same question can leave a transiently stale value,
        // which the next transition's recompute corrects.
        let any_accepted = store
            .accepted_answer_count(question.id)
            .map_err(CoreError::store)?
            > 0;
        store
            .set_question_accepted(question.id, any_accepted)
            .map_err(CoreError::store)?;

        tracing::debug!(
            answer = %answer_id,
            question = %question.id,
            accepted = now_accepted,
            "acceptance toggled"
        );

        Ok(now_accepted)
    }
}

impl Default for AcceptanceEngine {
    fn default() -> Self {
        Self::new()
    }
}
