//! Twilio SMS Gateway
//!
//! Sends verification codes through the Twilio Messages API with bounded
//! retries and exponential backoff. Client errors are not retried.

use async_trait::async_trait;
use phonenumber::Mode;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use twilio::{Client, OutboundMessage};

use pv_core::services::otp::SmsGatewayTrait;
use pv_shared::phone::mask_phone_number;
use pv_shared::SmsConfig;

use super::{is_e164, MAX_MESSAGE_LENGTH};
use crate::InfrastructureError;

/// Twilio SMS gateway configuration
#[derive(Debug, Clone)]
pub struct TwilioSmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, must be a Twilio number in E.164 form
    pub from_number: String,
    pub max_retries: u32,
    /// Initial backoff, doubled after each failed attempt
    pub retry_delay_ms: u64,
}

impl TwilioSmsConfig {
    /// Build from the application SMS settings
    ///
    /// # Returns
    /// * `Err(InfrastructureError::Config)` - Missing credentials or a sender that is not E.164
    pub fn from_sms_config(config: &SmsConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.trim().is_empty() || config.auth_token.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "Twilio account_sid and auth_token are required".to_string(),
            ));
        }
        if !is_e164(&config.from_number) {
            return Err(InfrastructureError::Config(
                "Twilio from_number must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(Self {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            max_retries: 3,
            retry_delay_ms: 1000,
        })
    }
}

pub struct TwilioSmsGateway {
    client: Client,
    config: TwilioSmsConfig,
}

impl TwilioSmsGateway {
    pub fn new(config: TwilioSmsConfig) -> Result<Self, InfrastructureError> {
        let client = Client::new(&config.account_sid, &config.auth_token);

        info!(
            provider = "twilio",
            from = %mask_phone_number(&config.from_number),
            "Twilio SMS gateway initialized"
        );

        Ok(Self { client, config })
    }

    /// Validate an E.164 destination against the numbering plan metadata
    pub(crate) fn validate_phone_number(phone: &str) -> Result<String, InfrastructureError> {
        if !phone.starts_with('+') {
            return Err(InfrastructureError::Sms(
                "Phone number must be in E.164 format (e.g., +819012345678)".to_string(),
            ));
        }

        let parsed = phonenumber::parse(None, phone)
            .map_err(|e| InfrastructureError::Sms(format!("Invalid phone number format: {}", e)))?;
        if !phonenumber::is_valid(&parsed) {
            return Err(InfrastructureError::Sms(format!(
                "Phone number is not dialable: {}",
                mask_phone_number(phone)
            )));
        }

        Ok(parsed.format().mode(Mode::E164).to_string())
    }

    async fn send_with_retry(&self, to: &str, body: &str) -> Result<String, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                phone = %mask_phone_number(to),
                attempt = attempts,
                max_retries = self.config.max_retries,
                "Sending SMS via Twilio"
            );

            let message = OutboundMessage::new(&self.config.from_number, to, body);
            match self.client.send_message(message).await {
                Ok(response) => {
                    info!(
                        provider = "twilio",
                        phone = %mask_phone_number(to),
                        message_id = %response.sid,
                        "SMS sent"
                    );
                    return Ok(response.sid);
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    error!(
                        provider = "twilio",
                        attempt = attempts,
                        error = %error_msg,
                        "Failed to send SMS"
                    );

                    if attempts >= self.config.max_retries {
                        return Err(InfrastructureError::Sms(format!(
                            "Failed to send SMS after {} attempts: {}",
                            attempts, error_msg
                        )));
                    }
                    if is_client_error(&error_msg) {
                        return Err(InfrastructureError::Sms(format!(
                            "Invalid request: {}",
                            error_msg
                        )));
                    }

                    warn!(delay_ms = delay.as_millis() as u64, "Retrying SMS delivery");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    pub async fn send_sms(&self, to: &str, body: &str) -> Result<String, InfrastructureError> {
        let normalized = Self::validate_phone_number(to)?;
        if body.len() > MAX_MESSAGE_LENGTH {
            return Err(InfrastructureError::Sms(format!(
                "Message exceeds maximum length of {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        self.send_with_retry(&normalized, body).await
    }
}

/// 4xx responses other than throttling will fail the same way again
fn is_client_error(error_msg: &str) -> bool {
    if error_msg.contains("429") {
        return false;
    }
    error_msg.contains("400")
        || error_msg.contains("401")
        || error_msg.contains("403")
        || error_msg.contains("404")
        || error_msg.to_lowercase().contains("invalid")
}

#[async_trait]
impl SmsGatewayTrait for TwilioSmsGateway {
    async fn send(&self, to: &str, body: &str) -> Result<String, String> {
        self.send_sms(to, body).await.map_err(|e| e.to_string())
    }
}
