use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub employer_name: String,
    pub employer_email: String,
    pub company_name: Option<String>,
    pub website_url: Option<String>,
    pub date: NaiveDate,
    /// Display slot as booked by the employer, e.g. "9:00 AM".
    pub time_slot: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub meeting_url: Option<String>,
    pub calendar_event_id: Option<String>,
    pub employer_profile_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Meeting topic used for conferencing and calendar entries.
    pub fn meeting_topic(&self) -> String {
        format!(
            "RYZE Recruiting — {}",
            self.company_name.as_deref().unwrap_or(&self.employer_name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_round_trip() {
        for (status, json) in [
            (BookingStatus::Pending, "\"pending\""),
            (BookingStatus::Confirmed, "\"confirmed\""),
            (BookingStatus::Cancelled, "\"cancelled\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), json);
            assert_eq!(serde_json::from_str::<BookingStatus>(json).unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        assert!(serde_json::from_str::<BookingStatus>("\"archived\"").is_err());
    }

    #[test]
    fn test_status_display_is_lowercase() {
        assert_eq!(BookingStatus::Confirmed.to_string(), "confirmed");
    }
}
