//! Unit tests for request context bounds

use crate::domain::entities::{RequestContext, MAX_CLIENT_ID_LEN, MAX_USER_AGENT_LEN};

#[test]
fn test_short_values_pass_through() {
    let context = RequestContext::new()
        .with_fingerprint("fp-device-1")
        .with_session("sess-1")
        .with_user_agent("PhoneVerifyApp/1.0")
        .bounded();

    assert_eq!(context.fingerprint_hash.as_deref(), Some("fp-device-1"));
    assert_eq!(context.user_agent.as_deref(), Some("PhoneVerifyApp/1.0"));
    assert!(!context.has_oversized_session());
}

#[test]
fn test_long_fingerprint_is_digested() {
    let raw = "f".repeat(MAX_CLIENT_ID_LEN + 1);

    let first = RequestContext::new().with_fingerprint(raw.clone()).bounded();
    let second = RequestContext::new().with_fingerprint(raw).bounded();

    let digest = first.fingerprint_hash.clone().unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(first.fingerprint_hash, second.fingerprint_hash);
}

#[test]
fn test_fingerprint_at_limit_is_kept() {
    let raw = "f".repeat(MAX_CLIENT_ID_LEN);

    let context = RequestContext::new().with_fingerprint(raw.clone()).bounded();

    assert_eq!(context.fingerprint_hash, Some(raw));
}

#[test]
fn test_long_user_agent_is_cut_on_char_boundary() {
    let raw = "端".repeat(MAX_USER_AGENT_LEN + 10);

    let context = RequestContext::new().with_user_agent(raw).bounded();

    assert_eq!(context.user_agent.unwrap().chars().count(), MAX_USER_AGENT_LEN);
}

#[test]
fn test_long_session_is_reported() {
    let context = RequestContext::new().with_session("s".repeat(MAX_CLIENT_ID_LEN + 1));

    assert!(context.has_oversized_session());
}
