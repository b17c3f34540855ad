//! Flag weights and thresholds of the abuse policy

use std::collections::HashMap;

use pv_shared::PolicyConfig;

use crate::domain::entities::RiskFlag;

/// Default sub-score contributed by each flag
pub const DEFAULT_FLAG_WEIGHTS: [(RiskFlag, u8); 10] = [
    (RiskFlag::PhoneRateLimit, 80),
    (RiskFlag::IpRateLimit, 80),
    (RiskFlag::FingerprintRateLimit, 70),
    (RiskFlag::PhoneEnumeration, 50),
    (RiskFlag::SuspiciousIp, 50),
    (RiskFlag::SuspiciousPhone, 50),
    (RiskFlag::DeviceMismatch, 30),
    (RiskFlag::SessionMismatch, 20),
    (RiskFlag::VoipNumber, 40),
    (RiskFlag::HighRiskPhone, 70),
];

/// Weight table and thresholds used by [`decide`](super::decide)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyWeights {
    flag_weights: HashMap<RiskFlag, u8>,
    /// Scores at or above this require a captcha
    pub captcha_threshold: u8,
    /// Scores at or above this are refused
    pub block_threshold: u8,
}

impl Default for PolicyWeights {
    fn default() -> Self {
        Self {
            flag_weights: DEFAULT_FLAG_WEIGHTS.into_iter().collect(),
            captcha_threshold: 40,
            block_threshold: 70,
        }
    }
}

impl From<&PolicyConfig> for PolicyWeights {
    /// Defaults overlaid with configured weights; unknown tags are logged and skipped
    fn from(config: &PolicyConfig) -> Self {
        let mut weights = Self {
            captcha_threshold: config.captcha_threshold,
            block_threshold: config.block_threshold,
            ..Self::default()
        };
        for (tag, weight) in &config.flag_weights {
            match RiskFlag::parse(tag) {
                Some(flag) => weights.set_weight(flag, *weight),
                None => tracing::warn!(flag = %tag, "Ignoring weight for unknown risk flag"),
            }
        }
        weights
    }
}

impl PolicyWeights {
    pub fn weight(&self, flag: RiskFlag) -> u8 {
        self.flag_weights.get(&flag).copied().unwrap_or(0)
    }

    pub fn set_weight(&mut self, flag: RiskFlag, weight: u8) {
        self.flag_weights.insert(flag, weight.min(100));
    }
}
