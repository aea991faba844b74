use tracing::error;

use crate::config::Config;
use crate::models::booking::Booking;
use crate::profiles::brief::PreCallBrief;
use crate::services::{email, sms};

/// Fire when a new booking is submitted — confirms receipt to the employer,
/// alerts the admin. Every leg is best-effort: failures are logged and the
/// enclosing request succeeds regardless.
pub async fn notify_booking_received(config: &Config, booking: &Booking) {
    if let Err(e) = email::send_employer_confirmation(config, booking).await {
        error!("notify_booking_received — employer email failed: {e}");
    }
    if let Err(e) = email::send_admin_notification(config, booking).await {
        error!("notify_booking_received — admin email failed: {e}");
    }

    let body = format!(
        "Hi {}, RYZE Recruiting received your call request for {} at {}. We will confirm shortly.",
        booking.employer_name, booking.date, booking.time_slot
    );
    if let Err(e) = sms::send_sms(config, booking.phone.as_deref(), &body).await {
        error!("notify_booking_received — SMS failed: {e}");
    }
}

/// Fire when the admin confirms a booking — sends the Zoom link to the
/// employer and the AI brief to the admin.
pub async fn notify_booking_confirmed(
    config: &Config,
    booking: &Booking,
    meeting_url: &str,
    brief: &PreCallBrief,
) {
    if let Err(e) = email::send_meeting_confirmed(config, booking, meeting_url, brief).await {
        error!("notify_booking_confirmed — email failed: {e}");
    }

    let body = format!(
        "Your call with RYZE Recruiting is confirmed for {} at {} EST. \
         Your Zoom link has been sent to your email.",
        booking.date, booking.time_slot
    );
    if let Err(e) = sms::send_sms(config, booking.phone.as_deref(), &body).await {
        error!("notify_booking_confirmed — SMS failed: {e}");
    }
}

/// Fire when a booking is cancelled — notifies the employer by email and SMS.
pub async fn notify_booking_cancelled(config: &Config, booking: &Booking) {
    if let Err(e) = email::send_cancellation_email(config, booking).await {
        error!("notify_booking_cancelled — email failed: {e}");
    }

    let body = format!(
        "Your RYZE Recruiting call scheduled for {} at {} has been cancelled. \
         Visit ryzerecruiting.com to rebook. Reply STOP to opt out.",
        booking.date, booking.time_slot
    );
    if let Err(e) = sms::send_sms(config, booking.phone.as_deref(), &body).await {
        error!("notify_booking_cancelled — SMS failed: {e}");
    }
}
