use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extract::{AdminUser, CurrentUser};
use crate::bookings::lifecycle::{run_cancellation, run_confirmation, Transition};
use crate::errors::AppError;
use crate::models::booking::{Booking, BookingStatus};
use crate::services::notifications;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookingCreate {
    pub date: NaiveDate,
    pub time_slot: String,
    pub company_name: Option<String>,
    pub website_url: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub date: String,
    pub taken_slots: Vec<String>,
}

/// POST /api/bookings
/// Creates a pending booking for the authenticated employer and fires the
/// best-effort receipt notifications.
pub async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<BookingCreate>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    if payload.time_slot.trim().is_empty() {
        return Err(AppError::Validation("A time slot is required".to_string()));
    }

    let booking: Booking = sqlx::query_as(
        r#"
        INSERT INTO bookings
            (employer_id, employer_name, employer_email, company_name, website_url,
             date, time_slot, phone, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(user.full_name.clone().unwrap_or_else(|| user.email.clone()))
    .bind(&user.email)
    .bind(&payload.company_name)
    .bind(&payload.website_url)
    .bind(payload.date)
    .bind(payload.time_slot.trim())
    .bind(&payload.phone)
    .bind(&payload.notes)
    .fetch_one(&state.db)
    .await?;

    notifications::notify_booking_received(&state.config, &booking).await;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings/my
/// Employer sees only their own bookings, soonest first.
pub async fn my_bookings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings =
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE employer_id = $1 ORDER BY date ASC")
            .bind(user.id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/availability/:date
/// Public: returns the time slots already taken on a date so the booking form
/// can disable them. Cancelled bookings free their slot.
pub async fn get_availability(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date: NaiveDate = date_str
        .parse()
        .map_err(|_| AppError::Validation("Invalid date format. Use YYYY-MM-DD.".to_string()))?;

    let taken_slots: Vec<String> = sqlx::query_scalar(
        "SELECT time_slot FROM bookings WHERE date = $1 AND status IN ('pending', 'confirmed')",
    )
    .bind(date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(AvailabilityResponse {
        date: date_str,
        taken_slots,
    }))
}

/// GET /api/bookings — admin only, soonest first.
pub async fn list_bookings(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY date ASC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/:id — admin only.
pub async fn get_booking(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking: Option<Booking> = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    let booking = booking.ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    Ok(Json(booking))
}

/// PATCH /api/bookings/:id/status — admin only.
///
/// The whole transition runs in one transaction holding a row lock on the
/// booking, so two concurrent requests for the same booking serialize and
/// side effects fire at most once. The mandatory conferencing call failing
/// rolls everything back; best-effort collaborator failures do not stop the
/// new status from landing.
pub async fn update_booking_status(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<BookingStatusUpdate>,
) -> Result<Json<Booking>, AppError> {
    let mut tx = state.db.begin().await?;

    let booking: Option<Booking> = sqlx::query_as("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let booking = booking.ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let plan = Transition::plan(booking.status, req.status)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = match plan {
        // Same status requested again: nothing to do, nothing re-fires.
        None => booking,
        Some(Transition::Confirm) => {
            let outcome = run_confirmation(&state, &mut tx, &booking).await?;
            sqlx::query_as::<_, Booking>(
                r#"
                UPDATE bookings
                SET status = $2,
                    meeting_url = $3,
                    calendar_event_id = $4,
                    employer_profile_id = COALESCE($5, employer_profile_id),
                    updated_at = now()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(BookingStatus::Confirmed)
            .bind(&outcome.meeting_url)
            .bind(&outcome.calendar_event_id)
            .bind(outcome.employer_profile_id)
            .fetch_one(&mut *tx)
            .await?
        }
        Some(Transition::Cancel) => {
            run_cancellation(&state, &booking).await;
            // The event id is cleared whether or not the delete call succeeded.
            sqlx::query_as::<_, Booking>(
                r#"
                UPDATE bookings
                SET status = $2,
                    calendar_event_id = NULL,
                    updated_at = now()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(BookingStatus::Cancelled)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    tx.commit().await?;
    Ok(Json(updated))
}

/// DELETE /api/bookings/:id — admin only, hard delete.
pub async fn delete_booking(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
