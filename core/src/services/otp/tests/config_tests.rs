//! Tests for configured send stage lists

use std::sync::Arc;

use pv_shared::{AppConfig, Environment, OtpConfig};

use crate::errors::DomainError;
use crate::repositories::InMemoryStore;
use crate::services::otp::{OtpService, OtpServiceConfig, SendStage};
use crate::services::tests::mocks::{RecordingGateway, ScriptedLookup};

fn stages(names: &[&str]) -> OtpConfig {
    OtpConfig {
        send_stages: names.iter().map(|name| name.to_string()).collect(),
        ..Default::default()
    }
}

fn is_validation(err: &DomainError) -> bool {
    matches!(err, DomainError::Validation { .. })
}

#[test]
fn test_default_config_runs_every_stage_in_order() {
    let config = OtpServiceConfig::from_config(&OtpConfig::default(), Environment::Development)
        .unwrap();

    assert_eq!(config.stages, SendStage::DEFAULT_ORDER.to_vec());
}

#[test]
fn test_configured_list_drops_optional_stages() {
    let otp = stages(&["normalize", "validate_format", " Cooldown ", "rate_limit", "decide"]);

    let config = OtpServiceConfig::from_config(&otp, Environment::Development).unwrap();

    assert_eq!(
        config.stages,
        vec![
            SendStage::Normalize,
            SendStage::ValidateFormat,
            SendStage::Cooldown,
            SendStage::RateLimit,
            SendStage::Decide,
        ]
    );
}

#[test]
fn test_unusable_stage_lists_are_rejected() {
    let rejected = [
        vec!["normalize", "validate_format", "cooldown", "lookup", "decide"],
        vec!["validate_format", "normalize", "cooldown", "decide"],
        vec!["normalize", "validate_format", "cooldown", "decide", "rate_limit"],
        vec!["normalize", "validate_format", "decide"],
        vec!["normalize", "cooldown", "decide"],
        vec!["normalize", "rate_limit", "validate_format", "cooldown", "decide"],
        vec!["normalize", "validate_format", "cooldown", "cooldown", "decide"],
        vec![],
    ];

    for names in rejected {
        let err = OtpServiceConfig::from_config(&stages(&names), Environment::Development)
            .unwrap_err();
        assert!(is_validation(&err), "{:?} should be rejected", names);
    }
}

#[test]
fn test_service_wiring_rejects_bad_stage_list() {
    let config = AppConfig {
        otp: stages(&["normalize", "decide"]),
        ..Default::default()
    };

    let result = OtpService::from_app_config(
        Arc::new(InMemoryStore::new()),
        Arc::new(RecordingGateway::new()),
        Arc::new(ScriptedLookup::mobile()),
        &config,
    );

    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_configured_stages_drive_send() {
    let config = AppConfig {
        otp: stages(&["normalize", "validate_format", "cooldown", "rate_limit", "decide"]),
        ..Default::default()
    };
    let lookup = Arc::new(ScriptedLookup::mobile());
    let service = OtpService::from_app_config(
        Arc::new(InMemoryStore::new()),
        Arc::new(RecordingGateway::new()),
        lookup.clone(),
        &config,
    )
    .unwrap();

    let outcome = service
        .send("090-1234-5678", &super::context())
        .await
        .unwrap();

    assert_eq!(outcome.phone, super::PHONE);
    assert_eq!(lookup.calls(), 0);
}
