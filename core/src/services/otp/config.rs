//! Configuration for the OTP lifecycle service

use chrono::Duration;

use pv_shared::{Environment, OtpConfig};

use crate::domain::entities::{DEFAULT_EXPIRATION_MINUTES, MAX_ATTEMPTS};
use crate::errors::DomainResult;

use super::pipeline::SendStage;

/// Configuration for the OTP lifecycle service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Lifetime of a sent code
    pub code_ttl: Duration,
    /// Failed verifies allowed before the record locks
    pub max_attempts: i32,
    /// Minimum time between two successful verifications of one phone
    pub reverification_cooldown: Duration,
    /// Accept gateway failures as a soft outcome (ignored in production)
    pub tolerate_sms_failure: bool,
    pub environment: Environment,
    /// Message body; `{code}` and `{minutes}` are substituted
    pub message_template: String,
    /// Admission stages run in order before a code is generated
    pub stages: Vec<SendStage>,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(DEFAULT_EXPIRATION_MINUTES),
            max_attempts: MAX_ATTEMPTS,
            reverification_cooldown: Duration::days(365),
            tolerate_sms_failure: false,
            environment: Environment::default(),
            message_template: OtpConfig::default().message_template,
            stages: SendStage::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl OtpServiceConfig {
    /// # Errors
    /// * `DomainError::Validation` if `send_stages` is not a usable stage order
    pub fn from_config(config: &OtpConfig, environment: Environment) -> DomainResult<Self> {
        Ok(Self {
            code_ttl: Duration::seconds(config.code_ttl_seconds),
            max_attempts: config.max_attempts,
            reverification_cooldown: Duration::days(config.reverification_cooldown_days),
            tolerate_sms_failure: config.tolerate_sms_failure,
            environment,
            message_template: config.message_template.clone(),
            stages: SendStage::parse_list(&config.send_stages)?,
        })
    }

    pub fn with_stages(mut self, stages: Vec<SendStage>) -> Self {
        self.stages = stages;
        self
    }

    /// Gateway failures are soft only outside production and when enabled
    pub fn tolerates_sms_failure(&self) -> bool {
        self.tolerate_sms_failure && !self.environment.is_production()
    }

    pub fn render_message(&self, code: &str) -> String {
        self.message_template
            .replace("{code}", code)
            .replace("{minutes}", &self.code_ttl.num_minutes().to_string())
    }
}
