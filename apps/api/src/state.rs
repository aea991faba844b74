use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Backs the OAuth pending-signup and state stores (per-key TTL), so the
    /// two-phase signup survives restarts and multiple server instances.
    pub redis: RedisClient,
    pub llm: LlmClient,
    pub config: Config,
}
