use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;

const ZOOM_TOKEN_URL: &str = "https://zoom.us/oauth/token";
const ZOOM_API_BASE: &str = "https://api.zoom.us/v2";
const MEETING_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone)]
pub struct ZoomMeeting {
    pub join_url: String,
    pub meeting_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MeetingPayload {
    id: i64,
    join_url: String,
}

fn client() -> Result<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")
}

/// Exchange Client ID + Secret for a short-lived access token.
async fn get_access_token(config: &Config) -> Result<String> {
    if config.zoom_account_id.is_empty()
        || config.zoom_client_id.is_empty()
        || config.zoom_client_secret.is_empty()
    {
        return Err(anyhow!("Zoom credentials not configured"));
    }

    let payload: TokenPayload = client()?
        .post(ZOOM_TOKEN_URL)
        .basic_auth(&config.zoom_client_id, Some(&config.zoom_client_secret))
        .query(&[
            ("grant_type", "account_credentials"),
            ("account_id", config.zoom_account_id.as_str()),
        ])
        .send()
        .await?
        .error_for_status()
        .context("Zoom token exchange failed")?
        .json()
        .await?;

    Ok(payload.access_token)
}

/// Create a scheduled Zoom meeting and return the join_url and meeting_id.
pub async fn create_meeting(
    config: &Config,
    topic: &str,
    date: NaiveDate,
    time_slot: &str,
) -> Result<ZoomMeeting> {
    let token = get_access_token(config).await?;
    let start_time = format!("{date}T{}", convert_time(time_slot)?);

    let body = json!({
        "topic": topic,
        "type": 2, // scheduled meeting
        "start_time": start_time,
        "duration": MEETING_DURATION_MINUTES,
        "timezone": "America/New_York",
        "settings": {
            "waiting_room": false,
            "join_before_host": true,
            "mute_upon_entry": false,
            "auto_recording": "none",
        },
    });

    let meeting: MeetingPayload = client()?
        .post(format!("{ZOOM_API_BASE}/users/me/meetings"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await?
        .error_for_status()
        .context("Zoom meeting creation failed")?
        .json()
        .await?;

    Ok(ZoomMeeting {
        join_url: meeting.join_url,
        meeting_id: meeting.id.to_string(),
    })
}

/// Convert a display slot like "9:00 AM" to "09:00:00" for the Zoom API.
pub fn convert_time(time_slot: &str) -> Result<String> {
    let t = NaiveTime::parse_from_str(time_slot.trim(), "%I:%M %p")
        .with_context(|| format!("Invalid time slot '{time_slot}'"))?;
    Ok(t.format("%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_time_morning() {
        assert_eq!(convert_time("9:00 AM").unwrap(), "09:00:00");
    }

    #[test]
    fn test_convert_time_afternoon() {
        assert_eq!(convert_time("2:30 PM").unwrap(), "14:30:00");
    }

    #[test]
    fn test_convert_time_noon_and_midnight() {
        assert_eq!(convert_time("12:00 PM").unwrap(), "12:00:00");
        assert_eq!(convert_time("12:00 AM").unwrap(), "00:00:00");
    }

    #[test]
    fn test_convert_time_tolerates_padding() {
        assert_eq!(convert_time(" 10:15 AM ").unwrap(), "10:15:00");
    }

    #[test]
    fn test_convert_time_rejects_garbage() {
        assert!(convert_time("sometime tomorrow").is_err());
        assert!(convert_time("25:00 PM").is_err());
    }
}
