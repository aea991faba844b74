use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::config::Config;
use crate::models::booking::Booking;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const CALENDAR_TIMEZONE: &str = "America/New_York";
const EVENT_DURATION_MINUTES: i64 = 30;

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    id: String,
}

fn client() -> Result<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")
}

/// Exchanges the stored refresh token for a short-lived access token.
async fn get_access_token(config: &Config) -> Result<String> {
    if config.google_refresh_token.is_empty() || config.google_calendar_client_id.is_empty() {
        return Err(anyhow!("Google Calendar credentials not configured"));
    }

    let payload: TokenPayload = client()?
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", config.google_refresh_token.as_str()),
            ("client_id", config.google_calendar_client_id.as_str()),
            ("client_secret", config.google_calendar_client_secret.as_str()),
        ])
        .send()
        .await?
        .error_for_status()
        .context("Google token refresh failed")?
        .json()
        .await?;

    Ok(payload.access_token)
}

/// Parse a date plus a display slot like "9:00 AM" into start and end
/// timestamps (30-minute duration).
fn parse_event_times(date: NaiveDate, time_slot: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let combined = format!("{date} {}", time_slot.trim());
    let start = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %I:%M %p")
        .with_context(|| format!("Invalid time slot '{time_slot}'"))?;
    Ok((start, start + Duration::minutes(EVENT_DURATION_MINUTES)))
}

/// Create a Google Calendar event for a confirmed booking.
/// Returns the calendar event ID, or None on failure — never raises.
pub async fn create_calendar_event(
    config: &Config,
    booking: &Booking,
    meeting_url: &str,
) -> Option<String> {
    match try_create_event(config, booking, meeting_url).await {
        Ok(event_id) => {
            info!("Google Calendar event created: {event_id}");
            Some(event_id)
        }
        Err(e) => {
            error!("Failed to create Google Calendar event: {e}");
            None
        }
    }
}

async fn try_create_event(config: &Config, booking: &Booking, meeting_url: &str) -> Result<String> {
    let token = get_access_token(config).await?;
    let (start, end) = parse_event_times(booking.date, &booking.time_slot)?;

    let event = json!({
        "summary": booking.meeting_topic(),
        "location": meeting_url,
        "description": format!(
            "Recruiter call with {} from {}.\n\nZoom: {meeting_url}",
            booking.employer_name,
            booking.company_name.as_deref().unwrap_or("N/A"),
        ),
        "start": {
            "dateTime": start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "timeZone": CALENDAR_TIMEZONE,
        },
        "end": {
            "dateTime": end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "timeZone": CALENDAR_TIMEZONE,
        },
        "attendees": [
            {"email": config.admin_email},
            {"email": booking.employer_email},
        ],
        "reminders": {
            "useDefault": false,
            "overrides": [
                {"method": "email", "minutes": 60},
                {"method": "popup", "minutes": 15},
            ],
        },
    });

    let created: EventPayload = client()?
        .post(format!(
            "{CALENDAR_API_BASE}/calendars/{}/events",
            config.google_calendar_id
        ))
        .query(&[("sendUpdates", "all")]) // emails attendees
        .bearer_auth(&token)
        .json(&event)
        .send()
        .await?
        .error_for_status()
        .context("Calendar event insert failed")?
        .json()
        .await?;

    Ok(created.id)
}

/// Delete a Google Calendar event by ID when a booking is cancelled.
/// Returns true on success, false on failure — never raises.
pub async fn delete_calendar_event(config: &Config, event_id: &str) -> bool {
    if event_id.is_empty() {
        return false;
    }
    match try_delete_event(config, event_id).await {
        Ok(()) => {
            info!("Google Calendar event deleted: {event_id}");
            true
        }
        Err(e) => {
            error!("Failed to delete Google Calendar event {event_id}: {e}");
            false
        }
    }
}

async fn try_delete_event(config: &Config, event_id: &str) -> Result<()> {
    let token = get_access_token(config).await?;
    client()?
        .delete(format!(
            "{CALENDAR_API_BASE}/calendars/{}/events/{event_id}",
            config.google_calendar_id
        ))
        .query(&[("sendUpdates", "all")]) // notifies attendees of cancellation
        .bearer_auth(&token)
        .send()
        .await?
        .error_for_status()
        .context("Calendar event delete failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_times_thirty_minute_window() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let (start, end) = parse_event_times(date, "10:00 AM").unwrap();
        assert_eq!(start.format("%Y-%m-%dT%H:%M:%S").to_string(), "2026-03-01T10:00:00");
        assert_eq!(end.format("%Y-%m-%dT%H:%M:%S").to_string(), "2026-03-01T10:30:00");
    }

    #[test]
    fn test_parse_event_times_afternoon() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let (start, _) = parse_event_times(date, "3:30 PM").unwrap();
        assert_eq!(start.format("%H:%M:%S").to_string(), "15:30:00");
    }

    #[test]
    fn test_parse_event_times_rejects_garbage() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(parse_event_times(date, "first thing").is_err());
    }
}
