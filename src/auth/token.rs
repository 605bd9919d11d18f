use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Intern id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
    pub intern_id: i32,
    pub expires_in: i64,
}

/// Issues and validates HS256 session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        assert!(!secret.is_empty(), "Token secret must not be empty");
        assert!(ttl > Duration::zero(), "Token lifetime must be positive");
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn issue(&self, intern_id: i32) -> Result<SessionToken, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: intern_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(SessionToken {
            token,
            intern_id,
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Resolves a token to the intern id it was issued for.
    pub fn validate(&self, token: &str) -> Result<i32, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::NotAuthenticated)?;
        data.claims
            .sub
            .parse::<i32>()
            .map_err(|_| AuthError::NotAuthenticated)
    }
}
