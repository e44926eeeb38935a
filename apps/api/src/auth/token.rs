//! Access token issuance and verification.
//!
//! Tokens are stateless HS256 JWTs: validity is signature plus expiry,
//! there is no server-side revocation list and no refresh mechanism.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account email.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issue a signed access token for `email`, expiring `ttl_minutes` from now.
pub fn issue_token(
    email: &str,
    secret: &[u8],
    ttl_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Verify a token's signature and expiry, returning the claims on success.
#[allow(dead_code)]
pub fn verify_token(token: &str, secret: &[u8]) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .ok()
        .map(|data| data.claims)
}
