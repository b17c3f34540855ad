//! Device and session consistency between send and verify.
//!
//! Mismatches are signals for audit and scoring only; they never block.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{RequestContext, RiskFlag, RiskFlags, VerificationRecord};

/// Identifiers captured on one side of the flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub fingerprint_hash: Option<String>,
    pub session_id: Option<String>,
}

impl DeviceSnapshot {
    pub fn from_record(record: &VerificationRecord) -> Self {
        Self {
            fingerprint_hash: record.fingerprint_hash.clone(),
            session_id: record.session_id.clone(),
        }
    }

    pub fn from_context(context: &RequestContext) -> Self {
        Self {
            fingerprint_hash: context.fingerprint_hash.clone(),
            session_id: context.session_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub flags: RiskFlags,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Compare what was captured at send time with what verify presents
pub fn check(captured: &DeviceSnapshot, current: &DeviceSnapshot) -> ConsistencyReport {
    let mut flags = RiskFlags::new();
    if mismatched(&captured.fingerprint_hash, &current.fingerprint_hash) {
        flags.insert(RiskFlag::DeviceMismatch);
    }
    if mismatched(&captured.session_id, &current.session_id) {
        flags.insert(RiskFlag::SessionMismatch);
    }
    ConsistencyReport { flags }
}

fn mismatched(captured: &Option<String>, current: &Option<String>) -> bool {
    match non_blank(captured) {
        None => false,
        Some(expected) => non_blank(current) != Some(expected),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(fingerprint: Option<&str>, session: Option<&str>) -> DeviceSnapshot {
        DeviceSnapshot {
            fingerprint_hash: fingerprint.map(str::to_string),
            session_id: session.map(str::to_string),
        }
    }

    #[test]
    fn test_matching_identifiers_are_consistent() {
        let report = check(
            &snapshot(Some("fp-1"), Some("sess-1")),
            &snapshot(Some("fp-1"), Some("sess-1")),
        );
        assert!(report.is_consistent());
    }

    #[test]
    fn test_different_fingerprint_flags_device_mismatch() {
        let report = check(
            &snapshot(Some("fp-1"), Some("sess-1")),
            &snapshot(Some("fp-2"), Some("sess-1")),
        );
        assert_eq!(report.flags.len(), 1);
        assert!(report.flags.contains(&RiskFlag::DeviceMismatch));
    }

    #[test]
    fn test_missing_current_values_are_mismatches() {
        let report = check(&snapshot(Some("fp-1"), Some("sess-1")), &snapshot(None, None));
        assert!(report.flags.contains(&RiskFlag::DeviceMismatch));
        assert!(report.flags.contains(&RiskFlag::SessionMismatch));
    }

    #[test]
    fn test_nothing_captured_gives_no_signal() {
        let report = check(&snapshot(None, Some("  ")), &snapshot(Some("fp-9"), None));
        assert!(report.is_consistent());
    }
}
