//! Session token handling with JWT
//!
//! Token issuance belongs to the external auth service; this module decodes
//! and validates bearer tokens into an account principal. `generate_token`
//! exists for that service and for tests.

use agora_domain::AccountId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session management error
#[derive(Debug, Error)]
pub enum SessionError {
    /// JWT encoding failed
    #[error("Failed to encode JWT: {0}")]
    JwtEncode(jsonwebtoken::errors::Error),

    /// Token expired
    #[error("Session token expired")]
    TokenExpired,

    /// Invalid token
    #[error("Invalid session token")]
    InvalidToken,
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account identifier (UUID string)
    pub account_id: String,

    /// Token expiration timestamp (Unix epoch)
    pub exp: u64,

    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Session manager handles JWT token generation and validation
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_secs: u64,
}

impl SessionManager {
    /// Create a new session manager with the given JWT secret and expiry
    pub fn new(jwt_secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_secs,
        }
    }

    /// Generate a new session token for the given account
    pub fn generate_token(&self, account: AccountId) -> Result<String, SessionError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let claims = SessionClaims {
            account_id: account.to_string(),
            exp: now + self.token_expiry_secs,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(SessionError::JwtEncode)
    }

    /// Validate a bearer token and return the account principal
    pub fn verify_token(&self, token: &str) -> Result<AccountId, SessionError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            })?;

        AccountId::from_string(&data.claims.account_id).map_err(|_| SessionError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let manager = SessionManager::new("test-secret", 3600);
        let account = AccountId::new();

        let token = manager.generate_token(account).unwrap();
        let verified = manager.verify_token(&token).unwrap();
        assert_eq!(verified, account);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let manager = SessionManager::new("test-secret", 3600);
        let other = SessionManager::new("other-secret", 3600);
        let token = manager.generate_token(AccountId::new()).unwrap();

        assert!(matches!(
            other.verify_token(&token),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let manager = SessionManager::new("test-secret", 3600);
        assert!(matches!(
            manager.verify_token("not-a-jwt"),
            Err(SessionError::InvalidToken)
        ));
    }
}
