//! Tests for provider selection

use pv_core::services::otp::SmsGatewayTrait;
use pv_shared::SmsConfig;

use crate::sms::create_sms_gateway;
use crate::InfrastructureError;

#[tokio::test]
async fn test_default_config_creates_mock_gateway() {
    let gateway = create_sms_gateway(&SmsConfig::default()).unwrap();

    let message_id = gateway.send("+819012345678", "hello").await.unwrap();

    assert!(message_id.starts_with("mock_"));
}

#[test]
fn test_provider_name_is_case_insensitive() {
    let config = SmsConfig {
        provider: " Mock ".to_string(),
        ..Default::default()
    };

    assert!(create_sms_gateway(&config).is_ok());
}

#[test]
fn test_unknown_provider_is_a_config_error() {
    let config = SmsConfig {
        provider: "carrier-pigeon".to_string(),
        ..Default::default()
    };

    match create_sms_gateway(&config) {
        Err(InfrastructureError::Config(msg)) => assert!(msg.contains("carrier-pigeon")),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("expected a configuration error"),
    }
}

#[cfg(feature = "twilio-sms")]
#[test]
fn test_twilio_without_credentials_is_rejected() {
    let config = SmsConfig {
        provider: "twilio".to_string(),
        ..Default::default()
    };

    assert!(matches!(
        create_sms_gateway(&config),
        Err(InfrastructureError::Config(_))
    ));
}

#[cfg(feature = "twilio-sms")]
#[test]
fn test_twilio_with_credentials_is_created() {
    let config = SmsConfig {
        provider: "twilio".to_string(),
        account_sid: "ACtest_account_sid".to_string(),
        auth_token: "test_auth_token".to_string(),
        from_number: "+15551234567".to_string(),
    };

    assert!(create_sms_gateway(&config).is_ok());
}
