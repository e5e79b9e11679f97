//! Content orchestration - creation, edit, and cascading deletion

use crate::reputation::{ReputationLedger, RewardReason};
use agora_domain::traits::{
    AccountStore, AssetStore, ContentStore, NotificationStore, RealtimeSink,
};
use agora_domain::{
    AccountId, Actor, Answer, Authorship, ContentId, CoreError, ItemKind, NotificationDraft,
    NotificationKind, Question,
};
use agora_identity::IdentityResolver;
use agora_notify::Fanout;

/// Minimum number of characters for a question or answer body
pub const MIN_BODY_CHARS: usize = 2;

/// Input for creating a question
#[derive(Debug, Clone)]
pub struct NewQuestion {
    /// Title; must not be empty
    pub title: String,
    /// Body text
    pub body: String,
    /// Tag set
    pub tags: Vec<String>,
    /// Post without public attribution
    pub anonymous: bool,
    /// Client-held token to key anonymous edit/delete rights, if supplied
    pub anon_token: Option<String>,
    /// Keys of assets already uploaded for this post
    pub asset_keys: Vec<String>,
}

/// Input for creating an answer
#[derive(Debug, Clone)]
pub struct NewAnswer {
    /// The question being answered
    pub question_id: ContentId,
    /// Body text
    pub body: String,
    /// Post without public attribution
    pub anonymous: bool,
    /// Client-held token to key anonymous edit/delete rights, if supplied
    pub anon_token: Option<String>,
    /// Keys of assets already uploaded for this post
    pub asset_keys: Vec<String>,
}

/// Asset store for requests that carry no uploads
pub struct NoAssets;

impl AssetStore for NoAssets {
    type Error = std::convert::Infallible;

    fn delete_asset(&mut self, _key: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Orchestrates content mutations around the vote/acceptance/reputation core
///
/// Creation requires an authenticated actor even for anonymous posts: the
/// account is always recorded as `real_author` for moderation, and only the
/// public authorship is withheld. Guestless anonymity exists solely for
/// edit/delete via the client token.
pub struct ContentEngine {
    resolver: IdentityResolver,
    reputation: ReputationLedger,
}

impl ContentEngine {
    /// Create a new content engine
    pub fn new() -> Self {
        Self {
            resolver: IdentityResolver::new(),
            reputation: ReputationLedger::new(),
        }
    }

    fn validate_body(body: &str) -> Result<(), CoreError> {
        if body.chars().count() < MIN_BODY_CHARS {
            return Err(CoreError::Validation(format!(
                "content must be at least {} characters",
                MIN_BODY_CHARS
            )));
        }
        Ok(())
    }

    fn authorship(account: AccountId, anonymous: bool, token: Option<String>) -> Authorship {
        if !anonymous {
            return Authorship::Account(account);
        }
        match token {
            Some(t) if !t.is_empty() => Authorship::Anonymous(t),
            _ => Authorship::Withheld,
        }
    }

    /// Delete already-uploaded assets after a failed creation
    ///
    /// There is no transactional link between the blob store and the document
    /// store, so this compensating cleanup is explicit. Cleanup failures are
    /// logged; the original error still surfaces.
    fn clean_up_assets<B>(&self, assets: &mut B, keys: &[String])
    where
        B: AssetStore,
        B::Error: std::fmt::Display,
    {
        for key in keys {
            if let Err(e) = assets.delete_asset(key) {
                tracing::warn!(asset = %key, "compensating asset cleanup failed: {}", e);
            }
        }
    }

    /// Create a question
    ///
    /// Awards +50 reputation to the author and increments their
    /// questions-asked counter.
    pub fn create_question<S, B>(
        &self,
        store: &mut S,
        assets: &mut B,
        new: NewQuestion,
        actor: &Actor,
        now: u64,
    ) -> Result<Question, CoreError>
    where
        S: ContentStore + AccountStore,
        <S as ContentStore>::Error: std::fmt::Display,
        <S as AccountStore>::Error: std::fmt::Display,
        B: AssetStore,
        B::Error: std::fmt::Display,
    {
        let account = actor.account_id().ok_or(CoreError::Unauthorized)?;

        if new.title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        Self::validate_body(&new.body)?;

        let question = Question {
            id: ContentId::new(),
            title: new.title,
            body: new.body,
            tags: new.tags,
            author: Self::authorship(account, new.anonymous, new.anon_token),
            real_author: account,
            is_accepted: false,
            answer_count: 0,
            view_count: 0,
            created_at: now,
        };

        if let Err(e) = store.insert_question(&question) {
            self.clean_up_assets(assets, &new.asset_keys);
            return Err(CoreError::store(e));
        }

        self.reputation
            .award(store, account, RewardReason::QuestionCreated)?;

        Ok(question)
    }

    /// Create an answer
    ///
    /// Awards +100 reputation to the author, increments the question's live
    /// answer count, and notifies the question's real author best-effort.
    pub fn create_answer<S, B, R>(
        &self,
        store: &mut S,
        assets: &mut B,
        fanout: &Fanout<R>,
        new: NewAnswer,
        actor: &Actor,
        now: u64,
    ) -> Result<Answer, CoreError>
    where
        S: ContentStore + AccountStore + NotificationStore,
        <S as ContentStore>::Error: std::fmt::Display,
        <S as AccountStore>::Error: std::fmt::Display,
        <S as NotificationStore>::Error: std::fmt::Display,
        B: AssetStore,
        B::Error: std::fmt::Display,
        R: RealtimeSink,
        R::Error: std::fmt::Display,
    {
        let account = actor.account_id().ok_or(CoreError::Unauthorized)?;
        Self::validate_body(&new.body)?;

        let question = store
            .get_question(new.question_id)
            .map_err(CoreError::store)?
            .ok_or_else(|| CoreError::not_found(format!("question {}", new.question_id)))?;

        let answer = Answer {
            id: ContentId::new(),
            question_id: question.id,
            body: new.body,
            author: Self::authorship(account, new.anonymous, new.anon_token),
            real_author: account,
            is_accepted: false,
            created_at: now,
        };

        if let Err(e) = store.insert_answer(&answer) {
            self.clean_up_assets(assets, &new.asset_keys);
            return Err(CoreError::store(e));
        }

        store
            .adjust_answer_count(question.id, 1)
            .map_err(CoreError::store)?;
        self.reputation
            .award(store, account, RewardReason::AnswerCreated)?;

        // Fan-out swallows its own failures, including self-notification.
        fanout.send(
            store,
            NotificationDraft {
                recipient: question.real_author,
                sender: Some(account),
                kind: NotificationKind::Answer,
                title: "New answer".to_string(),
                message: format!("Your question \"{}\" received an answer", question.title),
                question_id: Some(question.id),
                answer_id: Some(answer.id),
            },
            now,
        );

        Ok(answer)
    }

    /// Replace an item's body, subject to the edit authorization rule
    pub fn update_body<S>(
        &self,
        store: &mut S,
        kind: ItemKind,
        item_id: ContentId,
        body: String,
        actor: &Actor,
    ) -> Result<(), CoreError>
    where
        S: ContentStore + AccountStore,
        <S as ContentStore>::Error: std::fmt::Display,
        <S as AccountStore>::Error: std::fmt::Display,
    {
        let (author, real_author) = self.load_authorship(store, kind, item_id)?;
        self.resolver
            .authorize_edit(actor, &author, real_author, store)?;
        Self::validate_body(&body)?;

        let updated = store
            .update_body(kind, item_id, &body)
            .map_err(CoreError::store)?;
        if !updated {
            return Err(CoreError::not_found(format!("{:?} {}", kind, item_id)));
        }
        Ok(())
    }

    /// Delete an item, subject to the edit authorization rule
    ///
    /// Deleting a question cascades to all of its answers and their votes, so
    /// no answer referencing the deleted question remains queryable. Deleting
    /// an answer decrements the question's live answer count and recomputes
    /// its derived acceptance flag, since an accepted answer may have gone.
    pub fn delete<S>(
        &self,
        store: &mut S,
        kind: ItemKind,
        item_id: ContentId,
        actor: &Actor,
    ) -> Result<(), CoreError>
    where
        S: ContentStore + AccountStore,
        <S as ContentStore>::Error: std::fmt::Display,
        <S as AccountStore>::Error: std::fmt::Display,
    {
        let (author, real_author) = self.load_authorship(store, kind, item_id)?;
        self.resolver
            .authorize_edit(actor, &author, real_author, store)?;

        match kind {
            ItemKind::Question => {
                let deleted = store
                    .delete_question_cascade(item_id)
                    .map_err(CoreError::store)?;
                if !deleted {
                    return Err(CoreError::not_found(format!("question {}", item_id)));
                }
                tracing::info!(question = %item_id, "question deleted with cascade");
            }
            ItemKind::Answer => {
                let answer = store
                    .get_answer(item_id)
                    .map_err(CoreError::store)?
                    .ok_or_else(|| CoreError::not_found(format!("answer {}", item_id)))?;

                store.delete_answer(item_id).map_err(CoreError::store)?;
                store
                    .adjust_answer_count(answer.question_id, -1)
                    .map_err(CoreError::store)?;

                let any_accepted = store
                    .accepted_answer_count(answer.question_id)
                    .map_err(CoreError::store)?
                    > 0;
                store
                    .set_question_accepted(answer.question_id, any_accepted)
                    .map_err(CoreError::store)?;
            }
        }
        Ok(())
    }

    fn load_authorship<S>(
        &self,
        store: &S,
        kind: ItemKind,
        item_id: ContentId,
    ) -> Result<(Authorship, AccountId), CoreError>
    where
        S: ContentStore,
        S::Error: std::fmt::Display,
    {
        match kind {
            ItemKind::Question => {
                let question = store
                    .get_question(item_id)
                    .map_err(CoreError::store)?
                    .ok_or_else(|| CoreError::not_found(format!("question {}", item_id)))?;
                Ok((question.author, question.real_author))
            }
            ItemKind::Answer => {
                let answer = store
                    .get_answer(item_id)
                    .map_err(CoreError::store)?
                    .ok_or_else(|| CoreError::not_found(format!("answer {}", item_id)))?;
                Ok((answer.author, answer.real_author))
            }
        }
    }
}

impl Default for ContentEngine {
    fn default() -> Self {
        Self::new()
    }
}
