//! Unit tests for user identities

use chrono::{Duration, Utc};

use crate::domain::entities::UserIdentity;

#[test]
fn test_cooldown_window() {
    let verified_at = Utc::now() - Duration::days(10);
    let identity = UserIdentity::first_verification("+819012345678", verified_at);
    let cooldown = Duration::days(365);

    assert!(identity.is_in_cooldown(Utc::now(), cooldown));
    assert_eq!(identity.next_eligible_at(cooldown), verified_at + cooldown);
    assert!(!identity.is_in_cooldown(verified_at + Duration::days(366), cooldown));
}

#[test]
fn test_record_verification_increments_count() {
    let mut identity = UserIdentity::first_verification("+819012345678", Utc::now());
    let later = Utc::now() + Duration::days(400);

    identity.record_verification(later);

    assert_eq!(identity.verification_count, 2);
    assert_eq!(identity.last_verified_at, later);
}
