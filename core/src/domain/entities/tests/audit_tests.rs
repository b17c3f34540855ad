//! Unit tests for audit entries

use crate::domain::entities::{
    hash_phone, AttemptType, AuditEntry, AuditStatus, RequestContext, RiskFlag,
};

#[test]
fn test_phone_is_masked_and_hashed() {
    let entry = AuditEntry::new(AttemptType::Send, AuditStatus::Success).with_phone("+819012345678");

    assert_eq!(entry.phone_masked.as_deref(), Some("+81****5678"));
    assert_eq!(entry.phone_hash.as_deref(), Some(hash_phone("+819012345678").as_str()));
    assert_eq!(entry.phone_hash.as_ref().map(|h| h.len()), Some(64));
}

#[test]
fn test_hash_is_deterministic_and_distinct() {
    assert_eq!(hash_phone("+819012345678"), hash_phone("+819012345678"));
    assert_ne!(hash_phone("+819012345678"), hash_phone("+819012345679"));
}

#[test]
fn test_context_and_risk_are_recorded() {
    let context = RequestContext::new()
        .with_ip("198.51.100.1")
        .with_fingerprint("fp")
        .with_session("s")
        .with_user_agent("ua");
    let entry = AuditEntry::new(AttemptType::Verify, AuditStatus::InvalidCode)
        .with_context(&context)
        .with_risk(55, [RiskFlag::DeviceMismatch].into_iter().collect())
        .with_detail("code mismatch");

    assert_eq!(entry.ip_address.as_deref(), Some("198.51.100.1"));
    assert_eq!(entry.user_agent.as_deref(), Some("ua"));
    assert_eq!(entry.risk_score, 55);
    assert!(entry.risk_flags.contains(&RiskFlag::DeviceMismatch));
    assert_eq!(entry.detail.as_deref(), Some("code mismatch"));
}

#[test]
fn test_status_round_trips_through_storage_tag() {
    for status in [
        AuditStatus::Success,
        AuditStatus::SmsFailureTolerated,
        AuditStatus::Cooldown,
        AuditStatus::Locked,
        AuditStatus::InfrastructureError,
    ] {
        assert_eq!(AuditStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(AuditStatus::parse("UNKNOWN"), None);
    assert!(AuditStatus::SmsFailureTolerated.is_success());
    assert!(!AuditStatus::Expired.is_success());
    assert_eq!(AttemptType::parse("verify"), Some(AttemptType::Verify));
}
