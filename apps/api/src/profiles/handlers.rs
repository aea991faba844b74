use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::models::employer_profile::EmployerProfile;
use crate::state::AppState;

/// GET /api/employer-profiles
/// Admin only. Newest first.
pub async fn list_employer_profiles(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<EmployerProfile>>, AppError> {
    let profiles = sqlx::query_as::<_, EmployerProfile>(
        "SELECT * FROM employer_profiles ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(profiles))
}

/// GET /api/employer-profiles/:id
/// Admin only. Used by the admin dashboard to render the AI brief panel.
pub async fn get_employer_profile(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployerProfile>, AppError> {
    let profile: Option<EmployerProfile> =
        sqlx::query_as("SELECT * FROM employer_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?;
    let profile =
        profile.ok_or_else(|| AppError::NotFound("Employer profile not found".to_string()))?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct EmployerProfileUpdate {
    pub recruiter_notes: Option<String>,
    /// prospect | active_client | placed | inactive | not_a_fit
    pub relationship_status: Option<String>,
}

/// PATCH /api/employer-profiles/:id
/// Admin only. Updates the recruiter-maintained fields; AI fields are only
/// ever written by the booking confirmation flow.
pub async fn update_employer_profile(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<EmployerProfileUpdate>,
) -> Result<Json<EmployerProfile>, AppError> {
    let profile: Option<EmployerProfile> = sqlx::query_as(
        r#"
        UPDATE employer_profiles
        SET recruiter_notes = COALESCE($2, recruiter_notes),
            relationship_status = COALESCE($3, relationship_status),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.recruiter_notes)
    .bind(&req.relationship_status)
    .fetch_optional(&state.db)
    .await?;

    let profile =
        profile.ok_or_else(|| AppError::NotFound("Employer profile not found".to_string()))?;
    Ok(Json(profile))
}
