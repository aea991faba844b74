use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::json;

use crate::config::Config;
use crate::models::booking::Booking;
use crate::profiles::brief::PreCallBrief;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

async fn send_email(config: &Config, to: &str, subject: &str, html: String) -> Result<()> {
    if config.resend_api_key.is_empty() {
        return Err(anyhow!("RESEND_API_KEY not configured"));
    }

    let body = json!({
        "from": format!("RYZE Recruiting <{}>", config.from_email),
        "to": to,
        "subject": subject,
        "html": html,
    });

    Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?
        .post(RESEND_API_URL)
        .bearer_auth(&config.resend_api_key)
        .json(&body)
        .send()
        .await?
        .error_for_status()
        .context("Resend rejected the email")?;

    Ok(())
}

fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or(full_name)
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        "<tr>\
         <td style=\"color:#5a7290;font-size:14px;padding:8px 0;width:40%;\">{label}</td>\
         <td style=\"color:#1a2e44;font-size:14px;font-weight:600;padding:8px 0;\">{value}</td>\
         </tr>"
    )
}

fn optional_row(label: &str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => detail_row(label, v),
        _ => String::new(),
    }
}

fn wrap_body(inner: &str) -> String {
    format!(
        "<div style=\"font-family:Arial,sans-serif;max-width:600px;margin:0 auto;padding:40px 20px;\">\
         <div style=\"text-align:center;margin-bottom:32px;\">\
         <h1 style=\"color:#004182;font-size:28px;margin:0;\">RYZE Recruiting</h1>\
         </div>\
         {inner}\
         <hr style=\"border:none;border-top:1px solid #e0e7ef;margin:32px 0;\" />\
         <p style=\"color:#8fa3b8;font-size:12px;text-align:center;\">\
         RYZE Recruiting &middot; ryzerecruiting.com</p>\
         </div>"
    )
}

fn details_table(rows: &str) -> String {
    format!(
        "<div style=\"background:#f0f5fb;border-radius:12px;padding:24px;margin:24px 0;\">\
         <table style=\"width:100%;border-collapse:collapse;\">{rows}</table></div>"
    )
}

/// Receipt sent to the employer when their call request lands.
pub async fn send_employer_confirmation(config: &Config, booking: &Booking) -> Result<()> {
    let rows = format!(
        "{}{}{}",
        detail_row("Date", &booking.date.to_string()),
        detail_row("Time", &booking.time_slot),
        optional_row("Company", booking.company_name.as_deref()),
    );
    let inner = format!(
        "<h2 style=\"color:#1a2e44;font-size:22px;\">Thanks, {}!</h2>\
         <p style=\"color:#3d5a73;font-size:16px;line-height:1.6;\">\
         We received your intro call request. Here are your details:</p>\
         {}\
         <p style=\"color:#3d5a73;font-size:15px;line-height:1.6;\">\
         We'll confirm your slot shortly. If anything comes up and you need to reschedule, \
         just reply to this email.</p>\
         <p style=\"color:#1a2e44;font-size:15px;font-weight:600;margin-top:32px;\">\
         Dane Ahern<br><span style=\"color:#5a7290;font-weight:400;\">RYZE Recruiting</span></p>",
        first_name(&booking.employer_name),
        details_table(&rows),
    );

    send_email(
        config,
        &booking.employer_email,
        "We received your call request — RYZE Recruiting",
        wrap_body(&inner),
    )
    .await
}

/// New-request alert sent to the admin inbox.
pub async fn send_admin_notification(config: &Config, booking: &Booking) -> Result<()> {
    if config.admin_email.is_empty() {
        return Err(anyhow!("ADMIN_EMAIL not configured"));
    }

    let rows = format!(
        "{}{}{}{}{}{}{}",
        detail_row("Name", &booking.employer_name),
        detail_row("Email", &booking.employer_email),
        detail_row("Date", &booking.date.to_string()),
        detail_row("Time", &booking.time_slot),
        optional_row("Company", booking.company_name.as_deref()),
        optional_row("Website", booking.website_url.as_deref()),
        optional_row("Phone", booking.phone.as_deref()),
    );
    let inner = format!(
        "<h2 style=\"color:#1a2e44;font-size:22px;\">New Call Booked</h2>\
         {}{}\
         <a href=\"{}/admin\" style=\"display:inline-block;background:#004182;color:#ffffff;\
         text-decoration:none;padding:12px 24px;border-radius:8px;font-size:15px;\
         font-weight:600;margin-top:8px;\">View in Admin Dashboard</a>",
        details_table(&rows),
        optional_paragraph("Notes", booking.notes.as_deref()),
        config.frontend_url,
    );

    send_email(
        config,
        &config.admin_email,
        &format!(
            "New call booked — {} on {} at {}",
            booking.employer_name, booking.date, booking.time_slot
        ),
        wrap_body(&inner),
    )
    .await
}

/// Confirmation pair: the Zoom link goes to the employer, the AI brief to the
/// admin. Each send is attempted even if the other fails.
pub async fn send_meeting_confirmed(
    config: &Config,
    booking: &Booking,
    meeting_url: &str,
    brief: &PreCallBrief,
) -> Result<()> {
    let rows = format!(
        "{}{}{}",
        detail_row("Date", &booking.date.to_string()),
        detail_row("Time", &format!("{} EST", booking.time_slot)),
        optional_row("Company", booking.company_name.as_deref()),
    );
    let employer_inner = format!(
        "<h2 style=\"color:#1a2e44;font-size:22px;\">You're booked, {}!</h2>\
         <p style=\"color:#3d5a73;font-size:16px;line-height:1.6;\">\
         Your call with RYZE Recruiting is confirmed.</p>\
         {}\
         <a href=\"{meeting_url}\" style=\"display:inline-block;background:#004182;color:#ffffff;\
         text-decoration:none;padding:12px 24px;border-radius:8px;font-size:15px;\
         font-weight:600;margin-top:8px;\">Join Zoom Meeting</a>\
         <p style=\"color:#3d5a73;font-size:15px;line-height:1.6;\">\
         Looking forward to speaking with you!</p>",
        first_name(&booking.employer_name),
        details_table(&rows),
    );

    let employer_result = send_email(
        config,
        &booking.employer_email,
        "Your call with RYZE Recruiting is confirmed!",
        wrap_body(&employer_inner),
    )
    .await;

    let admin_result = if config.admin_email.is_empty() {
        Ok(())
    } else {
        let admin_inner = format!(
            "<h2 style=\"color:#1a2e44;font-size:22px;\">Call Confirmed — {}</h2>\
             {}\
             <p style=\"color:#3d5a73;font-size:14px;\">Zoom: <a href=\"{meeting_url}\" \
             style=\"color:#004182;\">{meeting_url}</a></p>\
             {}{}",
            booking.company_name.as_deref().unwrap_or(&booking.employer_name),
            details_table(&rows),
            optional_paragraph("Notes", booking.notes.as_deref()),
            brief_section(brief),
        );
        send_email(
            config,
            &config.admin_email,
            &format!(
                "Confirmed — {} on {} at {}",
                booking.employer_name, booking.date, booking.time_slot
            ),
            wrap_body(&admin_inner),
        )
        .await
    };

    employer_result.and(admin_result)
}

/// Cancellation notice sent to the employer.
pub async fn send_cancellation_email(config: &Config, booking: &Booking) -> Result<()> {
    let inner = format!(
        "<h2 style=\"color:#1a2e44;font-size:22px;\">Your call has been cancelled</h2>\
         <p style=\"color:#3d5a73;font-size:16px;line-height:1.6;\">\
         Hi {}, your call scheduled for {} at {} has been cancelled. \
         Visit <a href=\"{}\" style=\"color:#004182;\">ryzerecruiting.com</a> to rebook \
         whenever you're ready.</p>",
        first_name(&booking.employer_name),
        booking.date,
        booking.time_slot,
        config.frontend_url,
    );

    send_email(
        config,
        &booking.employer_email,
        "Your RYZE Recruiting call has been cancelled",
        wrap_body(&inner),
    )
    .await
}

fn optional_paragraph(label: &str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => format!(
            "<p style=\"color:#3d5a73;font-size:14px;\"><strong>{label}:</strong> {v}</p>"
        ),
        _ => String::new(),
    }
}

/// Renders the AI pre-call brief for the admin confirmation email.
fn brief_section(brief: &PreCallBrief) -> String {
    if brief.is_empty() {
        return String::new();
    }

    let mut out = String::from(
        "<h3 style=\"color:#1a2e44;font-size:18px;margin-top:24px;\">AI Pre-Call Brief</h3>",
    );
    if let Some(overview) = &brief.company_overview {
        out.push_str(&optional_paragraph("Overview", Some(overview)));
    }
    if let Some(industry) = &brief.industry {
        out.push_str(&optional_paragraph("Industry", Some(industry)));
    }
    if let Some(size) = &brief.estimated_size {
        out.push_str(&optional_paragraph("Estimated size", Some(size)));
    }
    out.push_str(&bullet_list("Hiring needs", &brief.hiring_needs));
    out.push_str(&bullet_list("Talking points", &brief.talking_points));
    if let Some(red_flags) = &brief.red_flags {
        out.push_str(&optional_paragraph("Red flags", Some(red_flags)));
    }
    if let Some(raw) = &brief.raw {
        out.push_str(&optional_paragraph("Brief (unparsed)", Some(raw)));
    }
    out
}

fn bullet_list(label: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let lis: String = items
        .iter()
        .map(|item| format!("<li style=\"color:#3d5a73;font-size:14px;\">{item}</li>"))
        .collect();
    format!(
        "<p style=\"color:#3d5a73;font-size:14px;margin-bottom:4px;\"><strong>{label}:</strong></p>\
         <ul style=\"margin-top:4px;\">{lis}</ul>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        assert_eq!(first_name("Dane Ahern"), "Dane");
        assert_eq!(first_name("Cher"), "Cher");
        assert_eq!(first_name(""), "");
    }

    #[test]
    fn test_optional_row_skips_missing() {
        assert_eq!(optional_row("Company", None), "");
        assert_eq!(optional_row("Company", Some("")), "");
        assert!(optional_row("Company", Some("Acme")).contains("Acme"));
    }

    #[test]
    fn test_brief_section_empty_brief_renders_nothing() {
        assert_eq!(brief_section(&PreCallBrief::default()), "");
    }

    #[test]
    fn test_brief_section_includes_lists() {
        let brief = PreCallBrief {
            industry: Some("Accounting".to_string()),
            hiring_needs: vec!["Senior Accountant".to_string()],
            ..PreCallBrief::default()
        };
        let html = brief_section(&brief);
        assert!(html.contains("Accounting"));
        assert!(html.contains("Senior Accountant"));
        assert!(html.contains("AI Pre-Call Brief"));
    }
}
