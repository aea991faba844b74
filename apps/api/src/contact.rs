use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::contact::Contact;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactCreate {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// POST /api/contact
pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactCreate>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    if payload.name.trim().is_empty() || payload.message.trim().is_empty() {
        return Err(AppError::Validation(
            "Name and message are required".to_string(),
        ));
    }
    if !payload.email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    let contact: Contact =
        sqlx::query_as("INSERT INTO contacts (name, email, message) VALUES ($1, $2, $3) RETURNING *")
            .bind(payload.name.trim())
            .bind(payload.email.trim())
            .bind(payload.message.trim())
            .fetch_one(&state.db)
            .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}
