use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::auth::extract::AdminUser;
use crate::auth::handlers::normalize_email;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::waitlist::WaitlistEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WaitlistCreate {
    pub email: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "landing_page".to_string()
}

/// POST /api/waitlist
/// Adds an email to the waitlist. Returns 409 if the email already exists
/// (the frontend treats this as success); the original entry is untouched.
pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(payload): Json<WaitlistCreate>,
) -> Result<(StatusCode, Json<WaitlistEntry>), AppError> {
    let email = normalize_email(&payload.email);
    if !email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    let entry: WaitlistEntry =
        sqlx::query_as("INSERT INTO waitlist (email, source) VALUES ($1, $2) RETURNING *")
            .bind(&email)
            .bind(&payload.source)
            .fetch_one(&state.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("This email is already on the waitlist.".to_string())
                } else {
                    e.into()
                }
            })?;

    info!("Waitlist signup: {}", entry.email);
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/waitlist — admin only, newest first.
pub async fn list_waitlist(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<WaitlistEntry>>, AppError> {
    let entries =
        sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waitlist_create_defaults_source() {
        let payload: WaitlistCreate =
            serde_json::from_str(r#"{"email": "hire@acme.com"}"#).unwrap();
        assert_eq!(payload.source, "landing_page");
    }

    #[test]
    fn test_waitlist_create_explicit_source() {
        let payload: WaitlistCreate =
            serde_json::from_str(r#"{"email": "hire@acme.com", "source": "webinar"}"#).unwrap();
        assert_eq!(payload.source, "webinar");
    }
}
