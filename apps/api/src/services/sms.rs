use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::config::Config;

/// Send an SMS via Twilio. Skips silently if the phone number is missing or
/// Twilio is not configured.
pub async fn send_sms(config: &Config, to_phone: Option<&str>, body: &str) -> Result<()> {
    let Some(to_phone) = to_phone.map(str::trim).filter(|p| !p.is_empty()) else {
        info!("SMS skipped — no phone number provided.");
        return Ok(());
    };
    if config.twilio_account_sid.is_empty() || config.twilio_auth_token.is_empty() {
        info!("SMS skipped — Twilio credentials not configured.");
        return Ok(());
    }

    let url = format!(
        "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
        config.twilio_account_sid
    );

    Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?
        .post(url)
        .basic_auth(&config.twilio_account_sid, Some(&config.twilio_auth_token))
        .form(&[
            ("To", to_phone),
            ("From", config.twilio_from_number.as_str()),
            ("Body", body),
        ])
        .send()
        .await?
        .error_for_status()
        .context("Twilio rejected the message")?;

    info!("SMS sent to {to_phone}");
    Ok(())
}
