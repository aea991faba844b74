use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims embedded in every access token. `sub` is the user's email.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).context("Failed to hash password")
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool> {
    verify(password, hashed).context("Failed to verify password")
}

/// Mints a signed, time-limited bearer token for the given email.
pub fn create_access_token(email: &str, secret: &str, expire_minutes: i64) -> Result<String> {
    let exp = (Utc::now() + Duration::minutes(expire_minutes)).timestamp() as usize;
    let claims = Claims {
        sub: email.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to sign access token")
}

/// Decodes and verifies a bearer token.
/// Returns None on expiry, tamper, or any other validation failure.
pub fn decode_access_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_password_hash_and_verify() {
        let hashed = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hashed).unwrap());
        assert!(!verify_password("wrong password", &hashed).unwrap());
    }

    #[test]
    fn test_token_round_trip() {
        let token = create_access_token("dane@ryzerecruiting.com", SECRET, 60).unwrap();
        let claims = decode_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "dane@ryzerecruiting.com");
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = create_access_token("dane@ryzerecruiting.com", SECRET, 60).unwrap();
        assert!(decode_access_token(&token, "other-secret").is_none());
    }

    #[test]
    fn test_token_rejects_expired() {
        // Far enough in the past to clear the default 60s validation leeway.
        let token = create_access_token("dane@ryzerecruiting.com", SECRET, -5).unwrap();
        assert!(decode_access_token(&token, SECRET).is_none());
    }

    #[test]
    fn test_token_rejects_tampered() {
        let token = create_access_token("dane@ryzerecruiting.com", SECRET, 60).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(decode_access_token(&tampered, SECRET).is_none());
    }
}
