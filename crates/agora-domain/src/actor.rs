//! The dual-identity actor model
//!
//! Agora treats authenticated accounts and ephemeral anonymous posters
//! uniformly through a tagged sum type. Every authorization check must
//! pattern-match both arms explicitly; there are no null-checks.

use crate::account::AccountId;
use serde::{Deserialize, Serialize};

/// The acting party behind a request
///
/// The `Anonymous` arm carries a client-held opaque token. It is trusted at
/// face value: the system cannot cryptographically verify anonymous authorship
/// and authorizes by string equality against the `author` field of content the
/// anonymous actor created. This is a deliberately weak guarantee, documented
/// as a limitation of the anonymous model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A resolved, non-banned account outside any suspension window
    Authenticated(AccountId),
    /// An unverified client-held token
    Anonymous(String),
}

impl Actor {
    /// The account id, when the actor is authenticated
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            Actor::Authenticated(id) => Some(*id),
            Actor::Anonymous(_) => None,
        }
    }
}

/// Raw identity material extracted from a request before resolution
///
/// A request may carry a session principal, a client-supplied anonymous
/// token, both (a signed-in account managing content it posted anonymously),
/// or neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Session principal, already verified by the transport layer
    pub account: Option<AccountId>,
    /// Client-generated anonymous token, persisted client-side
    pub anon_token: Option<String>,
}

impl Credentials {
    /// Credentials for an authenticated session
    pub fn authenticated(account: AccountId) -> Self {
        Self {
            account: Some(account),
            anon_token: None,
        }
    }

    /// Credentials carrying only an anonymous token
    pub fn anonymous(token: impl Into<String>) -> Self {
        Self {
            account: None,
            anon_token: Some(token.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_accessor() {
        let id = AccountId::new();
        assert_eq!(Actor::Authenticated(id).account_id(), Some(id));
        assert_eq!(Actor::Anonymous("tok".into()).account_id(), None);
    }
}
