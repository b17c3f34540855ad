//! Pure admission decision over every abuse signal

use serde::{Deserialize, Serialize};

use crate::domain::entities::RiskFlags;
use crate::services::rate_limit::IdentifierStatus;

use super::weights::PolicyWeights;

/// Everything the policy looks at for one request
#[derive(Debug, Clone, Default)]
pub struct PolicyInput {
    pub rate_limits: Vec<IdentifierStatus>,
    pub intelligence_risk_score: u8,
    /// Flags derived from the phone lookup (VoIP, high risk)
    pub intelligence_flags: RiskFlags,
    pub enumeration_flags: RiskFlags,
    pub consistency_flags: RiskFlags,
}

/// Verdict of [`decide`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub risk_score: u8,
    pub risk_flags: RiskFlags,
    pub require_captcha: bool,
}

/// Combine signals into one verdict
///
/// The score is the maximum of the intelligence score and the weight of
/// every raised flag. A captcha is required at the captcha threshold or on
/// any hard flag; the request is refused when a per-identifier limit is
/// exceeded or the score reaches the block threshold.
pub fn decide(input: &PolicyInput, weights: &PolicyWeights) -> PolicyDecision {
    let mut risk_flags: RiskFlags = input
        .rate_limits
        .iter()
        .filter_map(IdentifierStatus::exceeded_flag)
        .collect();
    let limit_exceeded = !risk_flags.is_empty();
    risk_flags.extend(input.intelligence_flags.iter().copied());
    risk_flags.extend(input.enumeration_flags.iter().copied());
    risk_flags.extend(input.consistency_flags.iter().copied());

    let risk_score = risk_flags
        .iter()
        .map(|flag| weights.weight(*flag))
        .chain(std::iter::once(input.intelligence_risk_score))
        .max()
        .unwrap_or(0)
        .min(100);

    let require_captcha =
        risk_score >= weights.captcha_threshold || risk_flags.iter().any(|flag| flag.is_hard());
    let allowed = !limit_exceeded && risk_score < weights.block_threshold;

    PolicyDecision {
        allowed,
        risk_score,
        risk_flags,
        require_captcha,
    }
}
