//! SMS Gateway Module
//!
//! Implementations of [`SmsGatewayTrait`] for delivering verification codes.
//!
//! - **Mock**: logs messages instead of sending them, for development
//! - **Twilio**: production delivery through the Twilio Messages API
//!
//! Phone numbers are always masked in logs.

use pv_core::services::otp::SmsGatewayTrait;
use pv_shared::SmsConfig;

use crate::InfrastructureError;

pub mod mock;

#[cfg(feature = "twilio-sms")]
pub mod twilio;

pub use mock::MockSmsGateway;

#[cfg(feature = "twilio-sms")]
pub use self::twilio::{TwilioSmsConfig, TwilioSmsGateway};

#[cfg(test)]
mod tests;

/// Twilio rejects bodies longer than this
pub const MAX_MESSAGE_LENGTH: usize = 1600;

/// Loose E.164 shape check: `+` followed by 8 to 15 digits
pub fn is_e164(phone: &str) -> bool {
    match phone.strip_prefix('+') {
        Some(digits) => {
            (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Create the SMS gateway selected by `config.provider`
///
/// # Returns
/// * `Ok(gateway)` - `"mock"` or `"twilio"`
/// * `Err(InfrastructureError::Config)` - Unknown provider or incomplete credentials
pub fn create_sms_gateway(
    config: &SmsConfig,
) -> Result<Box<dyn SmsGatewayTrait>, InfrastructureError> {
    match config.provider.trim().to_lowercase().as_str() {
        "mock" => {
            tracing::info!(provider = "mock", "Using mock SMS gateway");
            Ok(Box::new(MockSmsGateway::new()))
        }
        #[cfg(feature = "twilio-sms")]
        "twilio" => {
            let gateway = TwilioSmsGateway::new(TwilioSmsConfig::from_sms_config(config)?)?;
            Ok(Box::new(gateway))
        }
        other => Err(InfrastructureError::Config(format!(
            "Unknown SMS provider '{}'",
            other
        ))),
    }
}
