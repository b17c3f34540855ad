//! OTP, phone intelligence, policy and SMS configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One-time passcode lifecycle settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Seconds a code stays valid after it is sent
    #[serde(default = "default_code_ttl_seconds")]
    pub code_ttl_seconds: i64,

    /// Failed guesses allowed before the record locks
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,

    /// Days after a successful verification before the phone may verify again
    #[serde(default = "default_cooldown_days")]
    pub reverification_cooldown_days: i64,

    /// Treat SMS gateway failures as soft successes (ignored in production)
    #[serde(default)]
    pub tolerate_sms_failure: bool,

    /// Message body; `{code}` and `{minutes}` are substituted
    #[serde(default = "default_message_template")]
    pub message_template: String,

    /// Admission stages of a send, in order
    ///
    /// Names: normalize, validate_format, cooldown, intelligence,
    /// rate_limit, decide. The list must start with normalize then
    /// validate_format, end with decide and include cooldown.
    #[serde(default = "default_send_stages")]
    pub send_stages: Vec<String>,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: default_code_ttl_seconds(),
            max_attempts: default_max_attempts(),
            reverification_cooldown_days: default_cooldown_days(),
            tolerate_sms_failure: false,
            message_template: default_message_template(),
            send_stages: default_send_stages(),
        }
    }
}

/// Phone intelligence lookup settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntelligenceConfig {
    /// Country calling code assumed for national-format input
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Mobile number pattern for the default country, applied to E.164 text
    #[serde(default = "default_mobile_pattern")]
    pub mobile_pattern: String,

    /// Lookup provider: "twilio" or "offline"
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    #[serde(default = "default_lookup_base_url")]
    pub base_url: String,

    /// Network timeout for a single lookup in milliseconds
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Self-imposed ceiling on lookups per rolling minute
    #[serde(default = "default_throttle_per_minute")]
    pub throttle_per_minute: u32,

    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for IntelligenceConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
            mobile_pattern: default_mobile_pattern(),
            provider: default_provider(),
            account_sid: String::new(),
            auth_token: String::new(),
            base_url: default_lookup_base_url(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            throttle_per_minute: default_throttle_per_minute(),
            cache_ttl_hours: default_cache_ttl_hours(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Abuse policy thresholds and flag weight overrides
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Risk score at or above which a captcha is required
    #[serde(default = "default_captcha_threshold")]
    pub captcha_threshold: u8,

    /// Risk score at or above which the request is refused
    #[serde(default = "default_block_threshold")]
    pub block_threshold: u8,

    /// Per-flag weight overrides keyed by flag tag, e.g. `PHONE_ENUMERATION`
    #[serde(default)]
    pub flag_weights: HashMap<String, u8>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            captcha_threshold: default_captcha_threshold(),
            block_threshold: default_block_threshold(),
            flag_weights: HashMap::new(),
        }
    }
}

/// SMS gateway settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Gateway provider: "twilio" or "mock"
    #[serde(default = "default_sms_provider")]
    pub provider: String,

    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    /// Sender number in E.164 format
    #[serde(default)]
    pub from_number: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: default_sms_provider(),
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
        }
    }
}

fn default_code_ttl_seconds() -> i64 {
    300 // 5 minutes
}

fn default_max_attempts() -> i32 {
    5
}

fn default_cooldown_days() -> i64 {
    365
}

fn default_message_template() -> String {
    String::from("Your verification code is {code}. It expires in {minutes} minutes.")
}

fn default_country_code() -> String {
    String::from("81")
}

fn default_send_stages() -> Vec<String> {
    [
        "normalize",
        "validate_format",
        "cooldown",
        "intelligence",
        "rate_limit",
        "decide",
    ]
    .iter()
    .map(|stage| stage.to_string())
    .collect()
}

fn default_mobile_pattern() -> String {
    String::from(r"^\+81[789]0\d{8}$")
}

fn default_provider() -> String {
    String::from("offline")
}

fn default_lookup_base_url() -> String {
    String::from("https://lookups.twilio.com/v2/PhoneNumbers")
}

fn default_lookup_timeout_ms() -> u64 {
    4000
}

fn default_throttle_per_minute() -> u32 {
    50
}

fn default_cache_ttl_hours() -> i64 {
    24
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_captcha_threshold() -> u8 {
    40
}

fn default_block_threshold() -> u8 {
    70
}

fn default_sms_provider() -> String {
    String::from("mock")
}
