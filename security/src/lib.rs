// security/src/lib.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{DomainError, DomainResult};

pub mod bearer;

pub use bearer::BearerRejection;

/// How long an issued capability token stays valid.
pub const TOKEN_VALIDITY_DAYS: i64 = 30;

/// Claims embedded in a capability token: the identity id as subject plus
/// issue and expiry timestamps in seconds since the epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issues a token bound to `identity_id`, valid for
    /// [`TOKEN_VALIDITY_DAYS`] from now.
    pub fn issue(&self, identity_id: Uuid) -> DomainResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity_id,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("Failed to encode token: {}", e)))
    }

    /// Verifies signature and expiry. Malformed, forged and expired tokens
    /// produce the same authentication error.
    pub fn verify(&self, token: &str) -> DomainResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| DomainError::authentication("Not authorized, token invalid or expired"))
    }
}
