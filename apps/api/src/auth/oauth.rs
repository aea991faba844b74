use std::str::FromStr;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::auth::handlers::{mint_token, normalize_email, TokenResponse, UserSummary};
use crate::auth::pending::{
    random_token, stash_oauth_state, stash_pending_signup, take_oauth_state, take_pending_signup,
    ProviderProfile,
};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::{PublicRole, User, UserRole};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Linkedin,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Linkedin => "linkedin",
        }
    }

    fn authorize_endpoint(self) -> &'static str {
        match self {
            OAuthProvider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            OAuthProvider::Linkedin => "https://www.linkedin.com/oauth/v2/authorization",
        }
    }

    fn token_endpoint(self) -> &'static str {
        match self {
            OAuthProvider::Google => "https://oauth2.googleapis.com/token",
            OAuthProvider::Linkedin => "https://www.linkedin.com/oauth/v2/accessToken",
        }
    }

    fn userinfo_endpoint(self) -> &'static str {
        match self {
            OAuthProvider::Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            OAuthProvider::Linkedin => "https://api.linkedin.com/v2/userinfo",
        }
    }

    fn client_credentials(self, config: &Config) -> (&str, &str) {
        match self {
            OAuthProvider::Google => (&config.google_client_id, &config.google_client_secret),
            OAuthProvider::Linkedin => (&config.linkedin_client_id, &config.linkedin_client_secret),
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            "linkedin" => Ok(OAuthProvider::Linkedin),
            _ => Err(()),
        }
    }
}

fn parse_provider(provider: &str) -> Result<OAuthProvider, AppError> {
    provider
        .parse()
        .map_err(|()| AppError::NotFound(format!("Unknown OAuth provider '{provider}'")))
}

fn redirect_uri(provider: OAuthProvider, config: &Config) -> String {
    format!(
        "{}/api/auth/oauth/{}/callback",
        config.backend_url,
        provider.as_str()
    )
}

fn build_authorize_url(
    endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    state_value: &str,
) -> anyhow::Result<Url> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", "openid email profile")
        .append_pair("state", state_value);
    Ok(url)
}

/// GET /api/auth/oauth/:provider
/// Redirects the browser to the provider's consent screen.
pub async fn oauth_authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Redirect, AppError> {
    let provider = parse_provider(&provider)?;
    let (client_id, _) = provider.client_credentials(&state.config);
    if client_id.is_empty() {
        return Err(AppError::Validation(format!(
            "{} login is not configured",
            provider.as_str()
        )));
    }

    let anti_forgery = random_token();
    stash_oauth_state(&state.redis, &anti_forgery)
        .await
        .map_err(AppError::Internal)?;

    let url = build_authorize_url(
        provider.authorize_endpoint(),
        client_id,
        &redirect_uri(provider, &state.config),
        &anti_forgery,
    )
    .map_err(AppError::Internal)?;

    Ok(Redirect::temporary(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

/// GET /api/auth/oauth/:provider/callback
///
/// Phase 1 of the two-phase signup: the provider identity is known here but
/// the application role is not. Known identities get a token immediately;
/// unknown ones are stashed under a short-lived opaque token and the frontend
/// collects the role before completion.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, AppError> {
    let provider = parse_provider(&provider)?;

    if !take_oauth_state(&state.redis, &query.state)
        .await
        .map_err(AppError::Internal)?
    {
        warn!("OAuth callback with unknown state for {}", provider.as_str());
        return Err(AppError::Validation(
            "Invalid or expired OAuth state".to_string(),
        ));
    }

    let profile = exchange_code(provider, &state.config, &query.code)
        .await
        .map_err(|e| AppError::OAuth(e.to_string()))?;

    // Known provider identity → token straight away
    let existing: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE oauth_provider = $1 AND oauth_provider_id = $2")
            .bind(&profile.provider)
            .bind(&profile.provider_id)
            .fetch_optional(&state.db)
            .await?;
    if let Some(user) = existing {
        refresh_profile_fields(&state, &user, &profile).await?;
        return token_redirect(&state, &user.email);
    }

    // Same email already registered (password or other provider) → link the
    // identity and mint a token
    let by_email: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(normalize_email(&profile.email))
        .fetch_optional(&state.db)
        .await?;
    if let Some(user) = by_email {
        link_provider(&state, user.id, &profile).await?;
        return token_redirect(&state, &user.email);
    }

    // New identity: stash the profile and let the frontend collect the role
    let signup_token = stash_pending_signup(&state.redis, &profile)
        .await
        .map_err(AppError::Internal)?;
    info!("Stashed pending {} signup for role selection", provider.as_str());
    Ok(Redirect::temporary(&format!(
        "{}/oauth/complete-signup?signup_token={signup_token}",
        state.config.frontend_url
    )))
}

#[derive(Debug, Deserialize)]
pub struct CompleteSignupRequest {
    pub signup_token: String,
    pub role: PublicRole,
}

/// POST /api/auth/oauth/complete-signup
///
/// Phase 2: the user has picked a role. The opaque token is consumed whether
/// or not a row is created, so replays fail.
pub async fn complete_signup(
    State(state): State<AppState>,
    Json(req): Json<CompleteSignupRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let profile = take_pending_signup(&state.redis, &req.signup_token)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::Validation("Invalid or expired signup token".to_string()))?;

    let email = normalize_email(&profile.email);

    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let user = match existing {
        Some(user) => link_provider(&state, user.id, &profile).await?,
        None => {
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users
                    (email, full_name, avatar_url, oauth_provider, oauth_provider_id, role)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(&email)
            .bind(&profile.full_name)
            .bind(&profile.avatar_url)
            .bind(&profile.provider)
            .bind(&profile.provider_id)
            .bind(UserRole::from(req.role))
            .fetch_one(&state.db)
            .await?
        }
    };

    let access_token = mint_token(&state, &user.email)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user: UserSummary::from(&user),
    }))
}

fn token_redirect(state: &AppState, email: &str) -> Result<Redirect, AppError> {
    let token = mint_token(state, email)?;
    Ok(Redirect::temporary(&format!(
        "{}/oauth/callback#token={token}",
        state.config.frontend_url
    )))
}

/// Keeps name and avatar current on returning OAuth logins.
async fn refresh_profile_fields(
    state: &AppState,
    user: &User,
    profile: &ProviderProfile,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET full_name = COALESCE($2, full_name),
            avatar_url = COALESCE($3, avatar_url),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .bind(&profile.full_name)
    .bind(&profile.avatar_url)
    .execute(&state.db)
    .await?;
    Ok(())
}

/// Attaches a provider identity to an existing account.
async fn link_provider(
    state: &AppState,
    user_id: uuid::Uuid,
    profile: &ProviderProfile,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET oauth_provider = $2,
            oauth_provider_id = $3,
            avatar_url = COALESCE(avatar_url, $4),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&profile.provider)
    .bind(&profile.provider_id)
    .bind(&profile.avatar_url)
    .fetch_one(&state.db)
    .await?;
    Ok(user)
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkedinUserInfo {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

/// Exchanges an authorization code for the provider's user profile.
async fn exchange_code(
    provider: OAuthProvider,
    config: &Config,
    code: &str,
) -> anyhow::Result<ProviderProfile> {
    let (client_id, client_secret) = provider.client_credentials(config);
    let redirect = redirect_uri(provider, config);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let token: TokenPayload = http
        .post(provider.token_endpoint())
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let userinfo = http
        .get(provider.userinfo_endpoint())
        .bearer_auth(&token.access_token)
        .send()
        .await?
        .error_for_status()?;

    match provider {
        OAuthProvider::Google => {
            let info: GoogleUserInfo = userinfo.json().await?;
            Ok(ProviderProfile {
                provider: provider.as_str().to_string(),
                provider_id: info.id,
                email: info.email,
                full_name: info.name,
                avatar_url: info.picture,
            })
        }
        OAuthProvider::Linkedin => {
            let info: LinkedinUserInfo = userinfo.json().await?;
            Ok(ProviderProfile {
                provider: provider.as_str().to_string(),
                provider_id: info.sub,
                email: info.email,
                full_name: info.name,
                avatar_url: info.picture,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        assert_eq!(
            "google".parse::<OAuthProvider>().unwrap(),
            OAuthProvider::Google
        );
        assert_eq!(
            "linkedin".parse::<OAuthProvider>().unwrap(),
            OAuthProvider::Linkedin
        );
        assert!("github".parse::<OAuthProvider>().is_err());
    }

    #[test]
    fn test_build_authorize_url_carries_params() {
        let url = build_authorize_url(
            "https://accounts.google.com/o/oauth2/v2/auth",
            "client-123",
            "http://localhost:8000/api/auth/oauth/google/callback",
            "state-abc",
        )
        .unwrap();

        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("response_type".to_string(), "code".to_string())));
        assert!(query.contains(&("client_id".to_string(), "client-123".to_string())));
        assert!(query.contains(&("state".to_string(), "state-abc".to_string())));
        assert!(query.contains(&("scope".to_string(), "openid email profile".to_string())));
    }

    #[test]
    fn test_redirect_uri_is_provider_scoped() {
        let url = format!(
            "{}/api/auth/oauth/{}/callback",
            "http://localhost:8000",
            OAuthProvider::Linkedin.as_str()
        );
        assert_eq!(
            url,
            "http://localhost:8000/api/auth/oauth/linkedin/callback"
        );
    }
}
