//! services/api/src/adapters/token.rs
//!
//! HS256 JWT implementation of the `TokenService` port. The subject claim
//! carries the user's email.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use skillpath_core::ports::{PortError, PortResult, TokenService};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct JwtTokenAdapter {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtTokenAdapter {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

impl TokenService for JwtTokenAdapter {
    fn issue(&self, subject: &str) -> PortResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PortError::Unexpected(format!("Failed to sign token: {}", e)))
    }

    fn verify(&self, token: &str) -> PortResult<String> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                warn!("Rejected bearer token: {}", e);
                PortError::Unauthorized
            })?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_subject() {
        let adapter = JwtTokenAdapter::new("test-secret", Duration::hours(1));
        let token = adapter.issue("ada@example.com").unwrap();
        assert_eq!(adapter.verify(&token).unwrap(), "ada@example.com");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtTokenAdapter::new("secret-a", Duration::hours(1));
        let verifier = JwtTokenAdapter::new("secret-b", Duration::hours(1));
        let token = issuer.issue("ada@example.com").unwrap();
        assert!(matches!(verifier.verify(&token), Err(PortError::Unauthorized)));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s leeway.
        let adapter = JwtTokenAdapter::new("test-secret", Duration::minutes(-5));
        let token = adapter.issue("ada@example.com").unwrap();
        assert!(matches!(adapter.verify(&token), Err(PortError::Unauthorized)));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let adapter = JwtTokenAdapter::new("test-secret", Duration::hours(1));
        assert!(matches!(adapter.verify("abc.def"), Err(PortError::Unauthorized)));
    }
}
