//! Types for phone intelligence validation

use serde::{Deserialize, Serialize};

use crate::domain::entities::{LineType, PhoneIntelligenceRecord};

/// Risk score assigned by the offline heuristic to a pattern match
pub const HEURISTIC_MATCH_SCORE: u8 = 30;

/// Risk score assigned by the offline heuristic to anything else
pub const HEURISTIC_MISMATCH_SCORE: u8 = 100;

/// Scores above this make a number ineligible for SMS
pub const MAX_SENDABLE_RISK: u8 = 70;

/// Raw answer from the external lookup provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub valid: bool,
    pub carrier: Option<String>,
    pub line_type: LineType,
    /// Calling code without `+`
    pub country_code: Option<String>,
    /// Provider reported an error resolving the carrier
    pub carrier_error: bool,
}

/// Observable facts that add to a number's risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhoneSignal {
    Invalid,
    NonTargetCountry,
    Landline,
    Voip,
    UnknownLineType,
    MissingCarrier,
    CarrierError,
}

/// Additive weight of each signal; the sum is capped at 100
pub const PHONE_RISK_WEIGHTS: [(PhoneSignal, u8); 7] = [
    (PhoneSignal::Invalid, 100),
    (PhoneSignal::NonTargetCountry, 50),
    (PhoneSignal::Landline, 80),
    (PhoneSignal::Voip, 40),
    (PhoneSignal::UnknownLineType, 20),
    (PhoneSignal::MissingCarrier, 10),
    (PhoneSignal::CarrierError, 30),
];

pub fn signal_weight(signal: PhoneSignal) -> u8 {
    PHONE_RISK_WEIGHTS
        .iter()
        .find(|(s, _)| *s == signal)
        .map(|(_, weight)| *weight)
        .unwrap_or(0)
}

/// Sum signal weights, capped at 100
pub fn score_signals(signals: &[PhoneSignal]) -> u8 {
    let total: u32 = signals.iter().map(|s| signal_weight(*s) as u32).sum();
    total.min(100) as u8
}

/// Where a validation result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSource {
    Cache,
    Store,
    Lookup,
    Heuristic,
}

/// Outcome of validating a normalized phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneValidation {
    pub phone: String,
    pub is_valid: bool,
    pub carrier: Option<String>,
    pub line_type: LineType,
    pub country_code: Option<String>,
    pub risk_score: u8,
    pub can_receive_sms: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub source: ValidationSource,
}

/// Answer of [`PhoneIntelligenceService::can_send_sms`](super::PhoneIntelligenceService::can_send_sms)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsEligibility {
    pub can_send: bool,
    pub reason: Option<String>,
}

impl PhoneValidation {
    /// Build a validation from provider data and score it
    pub fn from_lookup(phone: &str, result: &LookupResult, target_country: &str) -> Self {
        let mut signals = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !result.valid {
            signals.push(PhoneSignal::Invalid);
            errors.push("Phone number is not valid".to_string());
        }
        let in_target = result.country_code.as_deref() == Some(target_country);
        if !in_target {
            signals.push(PhoneSignal::NonTargetCountry);
            errors.push("Phone number is outside the supported country".to_string());
        }
        match result.line_type {
            LineType::Landline => {
                signals.push(PhoneSignal::Landline);
                errors.push("Landline numbers cannot receive SMS".to_string());
            }
            LineType::Voip => {
                signals.push(PhoneSignal::Voip);
                warnings.push("VoIP number".to_string());
            }
            LineType::Unknown => {
                signals.push(PhoneSignal::UnknownLineType);
                warnings.push("Line type unknown".to_string());
            }
            LineType::Mobile => {}
        }
        if result.carrier.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            signals.push(PhoneSignal::MissingCarrier);
            warnings.push("Carrier name unavailable".to_string());
        }
        if result.carrier_error {
            signals.push(PhoneSignal::CarrierError);
            warnings.push("Carrier lookup reported an error".to_string());
        }

        let mut validation = Self {
            phone: phone.to_string(),
            is_valid: result.valid,
            carrier: result.carrier.clone(),
            line_type: result.line_type,
            country_code: result.country_code.clone(),
            risk_score: score_signals(&signals),
            can_receive_sms: false,
            errors,
            warnings,
            source: ValidationSource::Lookup,
        };
        validation.refresh_eligibility(target_country);
        validation
    }

    /// Offline fallback using only the mobile number pattern
    pub fn heuristic(phone: &str, pattern_matches: bool, target_country: &str, reason: &str) -> Self {
        let mut validation = Self {
            phone: phone.to_string(),
            is_valid: pattern_matches,
            carrier: None,
            line_type: LineType::Unknown,
            country_code: pattern_matches.then(|| target_country.to_string()),
            risk_score: if pattern_matches {
                HEURISTIC_MATCH_SCORE
            } else {
                HEURISTIC_MISMATCH_SCORE
            },
            can_receive_sms: false,
            errors: if pattern_matches {
                Vec::new()
            } else {
                vec!["Phone number does not match the mobile pattern".to_string()]
            },
            warnings: vec![format!("Carrier data unavailable ({})", reason)],
            source: ValidationSource::Heuristic,
        };
        validation.refresh_eligibility(target_country);
        validation
    }

    /// Rebuild from a persisted record, keeping its (possibly lowered) score
    pub fn from_record(record: &PhoneIntelligenceRecord, target_country: &str) -> Self {
        let lookup = LookupResult {
            valid: record.is_valid,
            carrier: record.carrier.clone(),
            line_type: record.line_type,
            country_code: record.country_code.clone(),
            carrier_error: false,
        };
        let mut validation = Self::from_lookup(&record.phone, &lookup, target_country);
        validation.risk_score = record.risk_score;
        validation.source = ValidationSource::Store;
        validation.refresh_eligibility(target_country);
        validation
    }

    /// Persistable form of this validation
    pub fn to_record(&self) -> PhoneIntelligenceRecord {
        PhoneIntelligenceRecord {
            phone: self.phone.clone(),
            is_valid: self.is_valid,
            carrier: self.carrier.clone(),
            line_type: self.line_type,
            country_code: self.country_code.clone(),
            risk_score: self.risk_score,
            last_verification: None,
            updated_at: chrono::Utc::now(),
        }
    }

    /// SMS rule: refuse invalid, foreign, landline or high-risk numbers
    pub fn sms_eligibility(&self, target_country: &str) -> SmsEligibility {
        let reason = if !self.is_valid {
            Some("invalid number")
        } else if self.country_code.as_deref() != Some(target_country) {
            Some("unsupported country")
        } else if self.line_type == LineType::Landline {
            Some("landline number")
        } else if self.risk_score > MAX_SENDABLE_RISK {
            Some("risk score too high")
        } else {
            None
        };
        SmsEligibility {
            can_send: reason.is_none(),
            reason: reason.map(str::to_string),
        }
    }

    /// Lower the risk score, floored at zero
    pub fn lower_risk(&mut self, amount: u8, target_country: &str) {
        self.risk_score = self.risk_score.saturating_sub(amount);
        self.refresh_eligibility(target_country);
    }

    fn refresh_eligibility(&mut self, target_country: &str) {
        self.can_receive_sms = self.sms_eligibility(target_country).can_send;
    }
}
