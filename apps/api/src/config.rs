use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Required variables abort startup when missing; per-collaborator API keys
/// default to empty, and the owning service skips itself when unconfigured.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,

    /// JWT signing secret.
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    /// Matching email grants admin access even without the superuser flag.
    pub admin_email: String,

    // OAuth identity providers
    pub google_client_id: String,
    pub google_client_secret: String,
    pub linkedin_client_id: String,
    pub linkedin_client_secret: String,

    // Conferencing (Zoom server-to-server OAuth)
    pub zoom_account_id: String,
    pub zoom_client_id: String,
    pub zoom_client_secret: String,

    // Google Calendar (separate credentials from the identity provider)
    pub google_calendar_client_id: String,
    pub google_calendar_client_secret: String,
    pub google_refresh_token: String,
    pub google_calendar_id: String,

    // Outbound notifications
    pub resend_api_key: String,
    pub from_email: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_from_number: String,

    // AI brief generation
    pub anthropic_api_key: String,

    pub frontend_url: String,
    pub backend_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            secret_key: require_env("SECRET_KEY")?,
            access_token_expire_minutes: env_or("ACCESS_TOKEN_EXPIRE_MINUTES", "1440")
                .parse::<i64>()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a number of minutes")?,
            admin_email: env_or("ADMIN_EMAIL", ""),
            google_client_id: env_or("GOOGLE_CLIENT_ID", ""),
            google_client_secret: env_or("GOOGLE_CLIENT_SECRET", ""),
            linkedin_client_id: env_or("LINKEDIN_CLIENT_ID", ""),
            linkedin_client_secret: env_or("LINKEDIN_CLIENT_SECRET", ""),
            zoom_account_id: env_or("ZOOM_ACCOUNT_ID", ""),
            zoom_client_id: env_or("ZOOM_CLIENT_ID", ""),
            zoom_client_secret: env_or("ZOOM_CLIENT_SECRET", ""),
            google_calendar_client_id: env_or("GOOGLE_CALENDAR_CLIENT_ID", ""),
            google_calendar_client_secret: env_or("GOOGLE_CALENDAR_CLIENT_SECRET", ""),
            google_refresh_token: env_or("GOOGLE_REFRESH_TOKEN", ""),
            google_calendar_id: env_or("GOOGLE_CALENDAR_ID", "primary"),
            resend_api_key: env_or("RESEND_API_KEY", ""),
            from_email: env_or("FROM_EMAIL", "hello@ryzerecruiting.com"),
            twilio_account_sid: env_or("TWILIO_ACCOUNT_SID", ""),
            twilio_auth_token: env_or("TWILIO_AUTH_TOKEN", ""),
            twilio_from_number: env_or("TWILIO_FROM_NUMBER", ""),
            anthropic_api_key: env_or("ANTHROPIC_API_KEY", ""),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:3000"),
            backend_url: env_or("BACKEND_URL", "http://localhost:8000"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
