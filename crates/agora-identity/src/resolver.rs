//! Actor resolution and authorization logic

use agora_domain::traits::AccountStore;
use agora_domain::{AccountId, Actor, Authorship, CoreError, Credentials};

/// Resolves request credentials into actors and checks content rights
///
/// Every authorization decision pattern-matches both arms of `Actor`
/// explicitly. The anonymous arm is authorized by plain string equality
/// against the content's `author` token: the system cannot verify possession
/// of an anonymous token, and this weak guarantee is a documented limitation
/// of the anonymous model, not a flaw to harden here.
pub struct IdentityResolver;

impl IdentityResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve credentials into an actor, for a mutating operation
    ///
    /// An authenticated principal must map to a non-banned account outside
    /// its suspension window; banned or suspended accounts get `Forbidden`.
    /// A bare anonymous token resolves at face value. Requests carrying
    /// neither are `Unauthorized`.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Identity material extracted from the request
    /// * `accounts` - Account store for principal lookup
    /// * `now` - Current time (epoch seconds) for the suspension-window check
    pub fn resolve_actor<A: AccountStore>(
        &self,
        credentials: &Credentials,
        accounts: &A,
        now: u64,
    ) -> Result<Actor, CoreError>
    where
        A::Error: std::fmt::Display,
    {
        if let Some(id) = credentials.account {
            let account = accounts
                .get_account(id)
                .map_err(CoreError::store)?
                .ok_or(CoreError::Unauthorized)?;

            if account.banned {
                return Err(CoreError::forbidden("account is banned"));
            }
            if account.is_suspended_at(now) {
                let reason = account
                    .suspension_reason
                    .unwrap_or_else(|| "account is suspended".to_string());
                return Err(CoreError::Forbidden(reason));
            }

            return Ok(Actor::Authenticated(id));
        }

        match &credentials.anon_token {
            Some(token) if !token.is_empty() => Ok(Actor::Anonymous(token.clone())),
            _ => Err(CoreError::Unauthorized),
        }
    }

    /// Authorize an edit or delete on a content item
    ///
    /// Grants access when the actor is the authenticated `real_author`, an
    /// authenticated moderator, or an anonymous actor whose token equals the
    /// item's anonymous `author` token. Everything else is `Forbidden`.
    pub fn authorize_edit<A: AccountStore>(
        &self,
        actor: &Actor,
        author: &Authorship,
        real_author: AccountId,
        accounts: &A,
    ) -> Result<(), CoreError>
    where
        A::Error: std::fmt::Display,
    {
        match actor {
            Actor::Authenticated(id) => {
                if *id == real_author {
                    return Ok(());
                }
                let is_moderator = accounts
                    .get_account(*id)
                    .map_err(CoreError::store)?
                    .map(|a| a.moderator)
                    .unwrap_or(false);
                if is_moderator {
                    Ok(())
                } else {
                    Err(CoreError::forbidden("not the author of this item"))
                }
            }
            Actor::Anonymous(token) => match author {
                Authorship::Anonymous(item_token) if item_token == token => Ok(()),
                _ => Err(CoreError::forbidden("anonymous token does not match")),
            },
        }
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}
