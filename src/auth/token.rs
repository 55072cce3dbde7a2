//! JWT bearer tokens for staff sessions (HS256, shared secret).

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Staff id the token was issued to.
    pub sub: String,
    /// Role at issue time. Authorization still re-reads the staff row;
    /// the claim is informational, not authoritative.
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies staff session tokens.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn sign(&self, staff_id: &Uuid, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: staff_id.to_string(),
            role: role.as_str().to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry. Any failure collapses to `Err`;
    /// callers treat every variant as "not authenticated".
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
