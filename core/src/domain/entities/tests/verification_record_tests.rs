//! Unit tests for the verification record entity

use chrono::{Duration, Utc};

use crate::domain::entities::{
    RecordStatus, RequestContext, RiskFlag, RiskFlags, VerificationRecord, MAX_ATTEMPTS,
};

fn pending() -> VerificationRecord {
    VerificationRecord::new("+819012345678", "123456", Duration::minutes(5))
}

#[test]
fn test_new_record_is_pending() {
    let record = pending();

    assert_eq!(record.attempts, 0);
    assert!(!record.verified);
    assert!(record.verified_at.is_none());
    assert_eq!(record.expires_at - record.created_at, Duration::minutes(5));
    assert_eq!(record.status_at(Utc::now(), MAX_ATTEMPTS), RecordStatus::Pending);
}

#[test]
fn test_context_and_risk_are_captured() {
    let context = RequestContext::new()
        .with_ip("203.0.113.7")
        .with_fingerprint("fp-1")
        .with_session("sess-1");
    let flags: RiskFlags = [RiskFlag::VoipNumber].into_iter().collect();

    let record = pending().with_context(&context).with_risk(40, flags.clone(), true);

    assert_eq!(record.request_ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(record.fingerprint_hash.as_deref(), Some("fp-1"));
    assert_eq!(record.session_id.as_deref(), Some("sess-1"));
    assert_eq!(record.risk_score, 40);
    assert_eq!(record.risk_flags, flags);
    assert!(record.required_captcha);
}

#[test]
fn test_expiry_takes_precedence_over_lock() {
    let mut record = pending();
    record.attempts = MAX_ATTEMPTS;

    assert_eq!(record.status_at(Utc::now(), MAX_ATTEMPTS), RecordStatus::Locked);
    let later = record.expires_at + Duration::seconds(1);
    assert_eq!(record.status_at(later, MAX_ATTEMPTS), RecordStatus::Expired);
}

#[test]
fn test_remaining_attempts_never_negative() {
    let mut record = pending();
    record.attempts = 1;
    assert_eq!(record.remaining_attempts(MAX_ATTEMPTS), 4);

    record.attempts = MAX_ATTEMPTS + 2;
    assert_eq!(record.remaining_attempts(MAX_ATTEMPTS), 0);
}

#[test]
fn test_verified_record_reports_verified_even_after_expiry() {
    let mut record = pending();
    record.verified = true;
    record.verified_at = Some(Utc::now());

    let later = record.expires_at + Duration::hours(1);
    assert_eq!(record.status_at(later, MAX_ATTEMPTS), RecordStatus::Verified);
}
