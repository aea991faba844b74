use anyhow::{Context, Result};
use rand::{distributions::Alphanumeric, Rng};
use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};

/// Provider profile stashed between the OAuth callback and signup completion.
/// Lives in Redis so the two-phase flow holds across server instances and
/// restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub provider: String,
    pub provider_id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A signup left incomplete for longer restarts from the provider redirect.
const PENDING_TTL_SECS: u64 = 300;
const STATE_TTL_SECS: u64 = 300;

const TOKEN_LEN: usize = 48;

fn pending_key(token: &str) -> String {
    format!("oauth:pending:{token}")
}

fn state_key(value: &str) -> String {
    format!("oauth:state:{value}")
}

pub fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Stores the provider profile under a fresh opaque token with TTL.
pub async fn stash_pending_signup(redis: &RedisClient, profile: &ProviderProfile) -> Result<String> {
    let token = random_token();
    let payload = serde_json::to_string(profile).context("Failed to serialize pending signup")?;

    let mut conn = redis.get_multiplexed_async_connection().await?;
    conn.set_ex::<_, _, ()>(pending_key(&token), payload, PENDING_TTL_SECS)
        .await?;

    Ok(token)
}

/// Consumes the pending signup: the opaque token works exactly once.
/// Returns None when the token is unknown or has expired.
pub async fn take_pending_signup(
    redis: &RedisClient,
    token: &str,
) -> Result<Option<ProviderProfile>> {
    let key = pending_key(token);
    let mut conn = redis.get_multiplexed_async_connection().await?;

    let payload: Option<String> = conn.get(&key).await?;
    let Some(payload) = payload else {
        return Ok(None);
    };
    conn.del::<_, ()>(&key).await?;

    let profile = serde_json::from_str(&payload).context("Corrupt pending signup payload")?;
    Ok(Some(profile))
}

/// Stores an anti-forgery state value ahead of the provider redirect.
pub async fn stash_oauth_state(redis: &RedisClient, value: &str) -> Result<()> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    conn.set_ex::<_, _, ()>(state_key(value), "1", STATE_TTL_SECS)
        .await?;
    Ok(())
}

/// Verifies and consumes a state value from a provider callback.
pub async fn take_oauth_state(redis: &RedisClient, value: &str) -> Result<bool> {
    let key = state_key(value);
    let mut conn = redis.get_multiplexed_async_connection().await?;

    let found: Option<String> = conn.get(&key).await?;
    if found.is_some() {
        conn.del::<_, ()>(&key).await?;
    }
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_shape() {
        let token = random_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_tokens_are_unique() {
        assert_ne!(random_token(), random_token());
    }

    #[test]
    fn test_provider_profile_round_trips() {
        let profile = ProviderProfile {
            provider: "google".to_string(),
            provider_id: "108234".to_string(),
            email: "dane@ryzerecruiting.com".to_string(),
            full_name: Some("Dane Ahern".to_string()),
            avatar_url: None,
        };
        let payload = serde_json::to_string(&profile).unwrap();
        let back: ProviderProfile = serde_json::from_str(&payload).unwrap();
        assert_eq!(back.provider_id, profile.provider_id);
        assert_eq!(back.email, profile.email);
    }
}
