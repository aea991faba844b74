//! Booking lifecycle orchestration.
//!
//! A booking moves pending → confirmed, or pending/confirmed → cancelled;
//! cancelled is terminal. Confirmation fans out to the external
//! collaborators: the conferencing call is mandatory (its failure aborts the
//! transition and the booking stays untouched), everything else is
//! best-effort (failures are logged and the new status still lands).

use sqlx::types::Json;
use sqlx::PgConnection;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::employer_profile::EmployerProfile;
use crate::profiles::brief::{generate_pre_call_brief, PreCallBrief};
use crate::services::{calendar, notifications, zoom};
use crate::state::AppState;

/// A side-effecting move between booking states, planned from the
/// (current, requested) pair before any effect fires. Requesting the current
/// status again plans to nothing, so effects never run twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Confirm,
    Cancel,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot transition a {current} booking to {requested}")]
pub struct InvalidTransition {
    current: BookingStatus,
    requested: BookingStatus,
}

impl Transition {
    pub fn plan(
        current: BookingStatus,
        requested: BookingStatus,
    ) -> Result<Option<Transition>, InvalidTransition> {
        use BookingStatus::{Cancelled, Confirmed, Pending};

        match (current, requested) {
            (current, requested) if current == requested => Ok(None),
            (Pending, Confirmed) => Ok(Some(Transition::Confirm)),
            (Pending | Confirmed, Cancelled) => Ok(Some(Transition::Cancel)),
            (current, requested) => Err(InvalidTransition { current, requested }),
        }
    }
}

/// Everything the confirmation fan-out produced that must land on the
/// booking row.
pub struct ConfirmOutcome {
    pub meeting_url: String,
    pub calendar_event_id: Option<String>,
    pub employer_profile_id: Option<Uuid>,
}

/// Runs the confirmation fan-out. The conferencing call is mandatory; when it
/// fails the error propagates and the caller rolls the transaction back. All
/// later steps are best-effort.
pub async fn run_confirmation(
    state: &AppState,
    conn: &mut PgConnection,
    booking: &Booking,
) -> Result<ConfirmOutcome, AppError> {
    // 1. Conferencing — mandatory, aborts the whole transition on failure
    let meeting = zoom::create_meeting(
        &state.config,
        &booking.meeting_topic(),
        booking.date,
        &booking.time_slot,
    )
    .await
    .map_err(|e| AppError::Meeting(e.to_string()))?;
    info!("Zoom meeting created: {}", meeting.meeting_id);

    // 2. Calendar event — best-effort
    let calendar_event_id =
        calendar::create_calendar_event(&state.config, booking, &meeting.join_url).await;

    // 3. AI brief from the employer website — best-effort, empty on failure
    let brief = match &booking.website_url {
        Some(url) => generate_pre_call_brief(&state.llm, url).await,
        None => PreCallBrief::default(),
    };

    // 4. Employer profile upsert — best-effort. Runs under a savepoint so a
    //    SQL failure here cannot poison the enclosing transaction.
    sqlx::query("SAVEPOINT employer_profile_upsert")
        .execute(&mut *conn)
        .await?;
    let employer_profile_id = match upsert_employer_profile(conn, booking, &brief).await {
        Ok(profile_id) => {
            sqlx::query("RELEASE SAVEPOINT employer_profile_upsert")
                .execute(&mut *conn)
                .await?;
            Some(profile_id)
        }
        Err(e) => {
            error!("Failed to upsert employer profile: {e}");
            sqlx::query("ROLLBACK TO SAVEPOINT employer_profile_upsert")
                .execute(&mut *conn)
                .await?;
            None
        }
    };

    // 5. Confirmation notifications — best-effort
    notifications::notify_booking_confirmed(&state.config, booking, &meeting.join_url, &brief)
        .await;

    Ok(ConfirmOutcome {
        meeting_url: meeting.join_url,
        calendar_event_id,
        employer_profile_id,
    })
}

/// Runs the cancellation fan-out. Entirely best-effort; the caller clears
/// calendar_event_id regardless of whether the delete call succeeded.
pub async fn run_cancellation(state: &AppState, booking: &Booking) {
    if let Some(event_id) = &booking.calendar_event_id {
        if !calendar::delete_calendar_event(&state.config, event_id).await {
            error!(
                "Calendar event {event_id} for booking {} could not be deleted",
                booking.id
            );
        }
    }
    notifications::notify_booking_cancelled(&state.config, booking).await;
}

/// Upserts the employer intelligence profile for the booking's company within
/// the default tenant, merging in any non-empty AI fields. This query-then-
/// write pair is the only guard on one-profile-per-company; it runs inside
/// the caller's row-locked transaction.
async fn upsert_employer_profile(
    conn: &mut PgConnection,
    booking: &Booking,
    brief: &PreCallBrief,
) -> Result<Uuid, sqlx::Error> {
    let company_name = booking.company_name.clone().unwrap_or_default();

    let existing: Option<EmployerProfile> = sqlx::query_as(
        "SELECT * FROM employer_profiles WHERE company_name = $1 AND tenant_id IS NULL",
    )
    .bind(&company_name)
    .fetch_optional(&mut *conn)
    .await?;

    let profile_id = match existing {
        Some(profile) => {
            sqlx::query(
                r#"
                UPDATE employer_profiles
                SET website_url = COALESCE($2, website_url),
                    phone = COALESCE($3, phone),
                    updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(profile.id)
            .bind(&booking.website_url)
            .bind(&booking.phone)
            .execute(&mut *conn)
            .await?;
            info!("Updating existing employer profile for: {company_name}");
            profile.id
        }
        None => {
            let profile_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO employer_profiles
                    (company_name, website_url, primary_contact_email, phone, user_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(&company_name)
            .bind(&booking.website_url)
            .bind(&booking.employer_email)
            .bind(&booking.phone)
            .bind(booking.employer_id)
            .fetch_one(&mut *conn)
            .await?;
            info!("Created new employer profile for: {company_name}");
            profile_id
        }
    };

    if !brief.is_empty() {
        sqlx::query(
            r#"
            UPDATE employer_profiles
            SET ai_industry = COALESCE($2, ai_industry),
                ai_company_size = COALESCE($3, ai_company_size),
                ai_company_overview = COALESCE($4, ai_company_overview),
                ai_hiring_needs = $5,
                ai_talking_points = $6,
                ai_red_flags = COALESCE($7, ai_red_flags),
                ai_brief_raw = COALESCE($8, ai_brief_raw),
                ai_brief_updated_at = now(),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .bind(&brief.industry)
        .bind(&brief.estimated_size)
        .bind(&brief.company_overview)
        .bind(Json(&brief.hiring_needs))
        .bind(Json(&brief.talking_points))
        .bind(&brief.red_flags)
        .bind(&brief.raw)
        .execute(&mut *conn)
        .await?;
    }

    Ok(profile_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::{Cancelled, Confirmed, Pending};

    #[test]
    fn test_plan_confirm_from_pending() {
        assert_eq!(
            Transition::plan(Pending, Confirmed).unwrap(),
            Some(Transition::Confirm)
        );
    }

    #[test]
    fn test_plan_cancel_from_pending_and_confirmed() {
        assert_eq!(
            Transition::plan(Pending, Cancelled).unwrap(),
            Some(Transition::Cancel)
        );
        assert_eq!(
            Transition::plan(Confirmed, Cancelled).unwrap(),
            Some(Transition::Cancel)
        );
    }

    #[test]
    fn test_plan_same_status_is_noop() {
        // Re-entering the current status must not re-fire side effects.
        assert_eq!(Transition::plan(Pending, Pending).unwrap(), None);
        assert_eq!(Transition::plan(Confirmed, Confirmed).unwrap(), None);
        assert_eq!(Transition::plan(Cancelled, Cancelled).unwrap(), None);
    }

    #[test]
    fn test_plan_cancelled_is_terminal() {
        assert!(Transition::plan(Cancelled, Pending).is_err());
        assert!(Transition::plan(Cancelled, Confirmed).is_err());
    }

    #[test]
    fn test_plan_rejects_unconfirming() {
        assert!(Transition::plan(Confirmed, Pending).is_err());
    }

    #[test]
    fn test_invalid_transition_message_names_both_states() {
        let err = Transition::plan(Cancelled, Confirmed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot transition a cancelled booking to confirmed"
        );
    }
}
