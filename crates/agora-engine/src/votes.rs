//! The vote ledger - per-item voter sets with toggle semantics

use agora_domain::traits::ContentStore;
use agora_domain::{Actor, ContentId, CoreError, ItemKind, VoteDirection, VoteSets};

/// Applies votes to questions and answers
///
/// Only authenticated actors may vote; anonymous actors are rejected with
/// `Unauthorized`. This is a deliberate asymmetry from posting, preserved as
/// observed behavior. There is no self-vote restriction: an author may vote
/// on their own content.
///
/// Voting never changes reputation. Vote counts are informational ranking
/// signals only; reputation moves only at creation and acceptance time.
pub struct VoteLedger;

impl VoteLedger {
    /// Create a new vote ledger
    pub fn new() -> Self {
        Self
    }

    /// Apply a vote with idempotent toggle semantics
    ///
    /// - already in the requested direction's set: remove it (un-vote)
    /// - in the opposite set: move it to the requested set (flip)
    /// - in neither: add it
    ///
    /// The toggle is two keyed store operations - a directional delete, then
    /// an upsert - so concurrent voters on the same item cannot lose each
    /// other's updates and an account can never sit in both sets at once.
    ///
    /// Returns the item's updated vote sets.
    pub fn apply_vote<S: ContentStore>(
        &self,
        store: &mut S,
        kind: ItemKind,
        item_id: ContentId,
        actor: &Actor,
        direction: VoteDirection,
    ) -> Result<VoteSets, CoreError>
    where
        S::Error: std::fmt::Display,
    {
        let voter = match actor {
            Actor::Authenticated(id) => *id,
            Actor::Anonymous(_) => return Err(CoreError::Unauthorized),
        };

        if !store.item_exists(kind, item_id).map_err(CoreError::store)? {
            return Err(CoreError::not_found(format!("{:?} {}", kind, item_id)));
        }

        let removed = store
            .remove_vote_in_direction(kind, item_id, voter, direction)
            .map_err(CoreError::store)?;
        if removed {
            tracing::debug!(item = %item_id, voter = %voter, "vote removed");
        } else {
            store
                .put_vote(kind, item_id, voter, direction)
                .map_err(CoreError::store)?;
            tracing::debug!(item = %item_id, voter = %voter, ?direction, "vote recorded");
        }

        store.vote_sets(kind, item_id).map_err(CoreError::store)
    }
}

impl Default for VoteLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_domain::traits::AccountStore;
    use agora_domain::{Account, AccountId, Authorship, Question};
    use agora_store::SqliteStore;

    fn seed_question(store: &mut SqliteStore) -> (AccountId, ContentId) {
        let author = Account::new(AccountId::new(), "ada".into(), "ada@example.org".into());
        store.insert_account(&author).unwrap();

        let question = Question {
            id: ContentId::new(),
            title: "How do toggles work?".into(),
            body: "Toggling votes, explained".into(),
            tags: vec!["votes".into()],
            author: Authorship::Account(author.id),
            real_author: author.id,
            is_accepted: false,
            answer_count: 0,
            view_count: 0,
            created_at: 1,
        };
        store.insert_question(&question).unwrap();
        (author.id, question.id)
    }

    #[test]
    fn test_vote_then_unvote_restores_prior_state() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let (author, question) = seed_question(&mut store);
        let ledger = VoteLedger::new();
        let actor = Actor::Authenticated(author);

        let sets = ledger
            .apply_vote(&mut store, ItemKind::Question, question, &actor, VoteDirection::Up)
            .unwrap();
        assert_eq!(sets.upvotes, vec![author]);

        let sets = ledger
            .apply_vote(&mut store, ItemKind::Question, question, &actor, VoteDirection::Up)
            .unwrap();
        assert!(sets.upvotes.is_empty());
        assert!(sets.downvotes.is_empty());
    }

    #[test]
    fn test_flip_moves_between_sets() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let (author, question) = seed_question(&mut store);
        let ledger = VoteLedger::new();
        let actor = Actor::Authenticated(author);

        ledger
            .apply_vote(&mut store, ItemKind::Question, question, &actor, VoteDirection::Up)
            .unwrap();
        let sets = ledger
            .apply_vote(&mut store, ItemKind::Question, question, &actor, VoteDirection::Down)
            .unwrap();

        assert!(sets.upvotes.is_empty());
        assert_eq!(sets.downvotes, vec![author]);
    }

    #[test]
    fn test_anonymous_actor_cannot_vote() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let (_, question) = seed_question(&mut store);
        let ledger = VoteLedger::new();

        let err = ledger
            .apply_vote(
                &mut store,
                ItemKind::Question,
                question,
                &Actor::Anonymous("tok".into()),
                VoteDirection::Up,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized));
    }

    #[test]
    fn test_missing_item_is_not_found() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let (author, _) = seed_question(&mut store);
        let ledger = VoteLedger::new();

        let err = ledger
            .apply_vote(
                &mut store,
                ItemKind::Answer,
                ContentId::new(),
                &Actor::Authenticated(author),
                VoteDirection::Up,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_sets_stay_disjoint_under_any_sequence() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let (author, question) = seed_question(&mut store);
        let ledger = VoteLedger::new();

        let voters: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
        let sequence = [
            VoteDirection::Up,
            VoteDirection::Down,
            VoteDirection::Down,
            VoteDirection::Up,
            VoteDirection::Down,
        ];

        for (i, direction) in sequence.iter().enumerate() {
            let actor = Actor::Authenticated(voters[i % voters.len()]);
            let sets = ledger
                .apply_vote(&mut store, ItemKind::Question, question, &actor, *direction)
                .unwrap();
            for up in &sets.upvotes {
                assert!(!sets.downvotes.contains(up), "voter in both sets");
            }
        }

        // The question author can vote too; no self-restriction is enforced
        let sets = ledger
            .apply_vote(
                &mut store,
                ItemKind::Question,
                question,
                &Actor::Authenticated(author),
                VoteDirection::Up,
            )
            .unwrap();
        assert!(sets.upvotes.contains(&author));
    }
}
