//! Unit tests for the Twilio SMS gateway

use pv_shared::SmsConfig;

use crate::sms::{TwilioSmsConfig, TwilioSmsGateway};
use crate::InfrastructureError;

fn sms_config() -> SmsConfig {
    SmsConfig {
        provider: "twilio".to_string(),
        account_sid: "ACtest_account_sid".to_string(),
        auth_token: "test_auth_token".to_string(),
        from_number: "+15551234567".to_string(),
    }
}

#[test]
fn test_config_from_sms_config() {
    let config = TwilioSmsConfig::from_sms_config(&sms_config()).unwrap();

    assert_eq!(config.account_sid, "ACtest_account_sid");
    assert_eq!(config.from_number, "+15551234567");
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_delay_ms, 1000);
}

#[test]
fn test_config_requires_e164_sender() {
    let config = SmsConfig {
        from_number: "15551234567".to_string(),
        ..sms_config()
    };

    let err = TwilioSmsConfig::from_sms_config(&config).unwrap_err();

    assert!(matches!(err, InfrastructureError::Config(_)));
    assert!(err.to_string().contains("E.164"));
}

#[test]
fn test_config_requires_credentials() {
    let config = SmsConfig {
        auth_token: "  ".to_string(),
        ..sms_config()
    };

    assert!(TwilioSmsConfig::from_sms_config(&config).is_err());
}

#[test]
fn test_validate_phone_number() {
    assert_eq!(
        TwilioSmsGateway::validate_phone_number("+819012345678").unwrap(),
        "+819012345678"
    );
    assert_eq!(
        TwilioSmsGateway::validate_phone_number("+14155552671").unwrap(),
        "+14155552671"
    );
    assert!(TwilioSmsGateway::validate_phone_number("09012345678").is_err());
    assert!(TwilioSmsGateway::validate_phone_number("+8112").is_err());
}

#[tokio::test]
async fn test_invalid_destination_fails_before_any_request() {
    let gateway =
        TwilioSmsGateway::new(TwilioSmsConfig::from_sms_config(&sms_config()).unwrap()).unwrap();

    let result = gateway.send_sms("not-a-number", "Your code is 123456").await;

    assert!(matches!(result, Err(InfrastructureError::Sms(_))));
}
