//! Ordered admission stages of the send flow

use crate::domain::entities::RiskFlags;
use crate::errors::{DomainError, DomainResult};
use crate::services::phone::PhoneValidation;
use crate::services::policy::{PolicyDecision, PolicyInput};
use crate::services::rate_limit::RateLimitReport;

/// One admission step of `send`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendStage {
    /// Canonicalize the raw input to E.164
    Normalize,
    /// Reject anything that is not a target-country mobile number
    ValidateFormat,
    /// Reject phones verified within the re-verification cooldown
    Cooldown,
    /// Carrier lookup and phone risk score
    Intelligence,
    /// Sliding-window and enumeration counts
    RateLimit,
    /// Policy verdict and captcha enforcement
    Decide,
}

impl SendStage {
    pub const DEFAULT_ORDER: [SendStage; 6] = [
        SendStage::Normalize,
        SendStage::ValidateFormat,
        SendStage::Cooldown,
        SendStage::Intelligence,
        SendStage::RateLimit,
        SendStage::Decide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::ValidateFormat => "validate_format",
            Self::Cooldown => "cooldown",
            Self::Intelligence => "intelligence",
            Self::RateLimit => "rate_limit",
            Self::Decide => "decide",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::DEFAULT_ORDER
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
    }

    /// Parse a configured stage list and check that it is a usable order
    ///
    /// # Errors
    /// * `DomainError::Validation` - unknown name, or an order rejected by [`SendStage::check_order`]
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> DomainResult<Vec<Self>> {
        let stages = names
            .iter()
            .map(|name| {
                let name = name.as_ref().trim().to_lowercase();
                Self::parse(&name).ok_or_else(|| {
                    DomainError::validation(format!("Unknown send stage '{}'", name))
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;
        Self::check_order(&stages)?;
        Ok(stages)
    }

    /// `normalize` then `validate_format` first, `decide` last, `cooldown`
    /// somewhere between, each stage at most once
    pub fn check_order(stages: &[SendStage]) -> DomainResult<()> {
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].contains(stage) {
                return Err(DomainError::validation(format!(
                    "Send stage '{}' is listed twice",
                    stage.as_str()
                )));
            }
        }
        if !stages.starts_with(&[SendStage::Normalize, SendStage::ValidateFormat]) {
            return Err(DomainError::validation(
                "Send stages must start with 'normalize', 'validate_format'",
            ));
        }
        if stages.last() != Some(&SendStage::Decide) {
            return Err(DomainError::validation("Send stages must end with 'decide'"));
        }
        if !stages.contains(&SendStage::Cooldown) {
            return Err(DomainError::validation("Send stage 'cooldown' is required"));
        }
        Ok(())
    }
}

/// What the stages have learned about one send so far
#[derive(Debug, Clone)]
pub struct SendState {
    /// Raw input until `Normalize` runs, canonical afterwards
    pub phone: String,
    pub validation: Option<PhoneValidation>,
    pub intelligence_flags: RiskFlags,
    pub rate_limits: Option<RateLimitReport>,
    pub decision: Option<PolicyDecision>,
}

impl SendState {
    pub fn new(raw_phone: &str) -> Self {
        Self {
            phone: raw_phone.trim().to_string(),
            validation: None,
            intelligence_flags: RiskFlags::new(),
            rate_limits: None,
            decision: None,
        }
    }

    pub fn policy_input(&self) -> PolicyInput {
        PolicyInput {
            rate_limits: self
                .rate_limits
                .as_ref()
                .map(|report| report.statuses.clone())
                .unwrap_or_default(),
            intelligence_risk_score: self.validation.as_ref().map(|v| v.risk_score).unwrap_or(0),
            intelligence_flags: self.intelligence_flags.clone(),
            enumeration_flags: self
                .rate_limits
                .as_ref()
                .map(|report| report.enumeration_flags.clone())
                .unwrap_or_default(),
            consistency_flags: RiskFlags::new(),
        }
    }

    /// Score and flags known so far, for audit rows of rejected sends
    pub fn risk(&self) -> (u8, RiskFlags) {
        match &self.decision {
            Some(decision) => (decision.risk_score, decision.risk_flags.clone()),
            None => {
                let mut flags = self.intelligence_flags.clone();
                if let Some(report) = &self.rate_limits {
                    flags.extend(report.flags());
                }
                let score = self.validation.as_ref().map(|v| v.risk_score).unwrap_or(0);
                (score, flags)
            }
        }
    }

    pub fn rate_limit_degraded(&self) -> bool {
        self.rate_limits.as_ref().map(|r| r.degraded).unwrap_or(false)
    }
}
