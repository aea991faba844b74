use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extract::CurrentUser;
use crate::auth::security::{create_access_token, hash_password, verify_password};
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::user::{PublicRole, User, UserRole};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: PublicRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub oauth_provider: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            oauth_provider: user.oauth_provider,
            avatar_url: user.avatar_url,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Denormalized user summary returned alongside a freshly minted token.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_superuser: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            is_superuser: user.is_superuser,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserSummary,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let email = normalize_email(&req.email);
    if !email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    validate_password(&req.password)?;

    let hashed = hash_password(&req.password).map_err(AppError::Internal)?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (email, full_name, hashed_password, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(&req.full_name)
    .bind(&hashed)
    .bind(UserRole::from(req.role))
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already registered".to_string())
        } else {
            e.into()
        }
    })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = normalize_email(&req.email);

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or(AppError::Unauthorized)?;

    // OAuth-only identities have no password to check against
    let hashed = user.hashed_password.as_deref().ok_or(AppError::Unauthorized)?;
    if !verify_password(&req.password, hashed).map_err(AppError::Internal)? {
        return Err(AppError::Unauthorized);
    }
    if !user.is_active {
        return Err(AppError::Validation("Inactive user account".to_string()));
    }

    let access_token = mint_token(&state, &user.email)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user: UserSummary::from(&user),
    }))
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

pub(crate) fn mint_token(state: &AppState, email: &str) -> Result<String, AppError> {
    create_access_token(
        email,
        &state.config.secret_key,
        state.config.access_token_expire_minutes,
    )
    .map_err(AppError::Internal)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 100 {
        return Err(AppError::Validation(
            "Password must be between 8 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_and_trims() {
        assert_eq!(
            normalize_email("  Dane@RyzeRecruiting.COM "),
            "dane@ryzerecruiting.com"
        );
    }

    #[test]
    fn test_validate_password_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("eight8ch").is_ok());
        assert!(validate_password(&"x".repeat(100)).is_ok());
        assert!(validate_password(&"x".repeat(101)).is_err());
    }
}
