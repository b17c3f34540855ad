//! Canonicalization of human-typed phone numbers to E.164

use once_cell::sync::Lazy;
use regex::Regex;

use pv_shared::phone::clean_phone_input;
use pv_shared::IntelligenceConfig;

use crate::errors::{DomainError, DomainResult};

/// Japanese mobile numbers: 070, 080 or 090 followed by eight digits
static JAPAN_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+81[789]0\d{8}$").expect("static mobile pattern is valid")
});

/// Calling code assumed when the input carries none
pub const DEFAULT_COUNTRY_CODE: &str = "81";

/// Converts raw input into canonical E.164 text for one target country
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    country_code: String,
    mobile_pattern: Regex,
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            mobile_pattern: JAPAN_MOBILE_REGEX.clone(),
        }
    }
}

impl PhoneNormalizer {
    /// Create a normalizer for a calling code and mobile pattern
    ///
    /// # Arguments
    /// * `country_code` - Calling code without `+`, e.g. "81"
    /// * `mobile_pattern` - Regex matched against the normalized E.164 text
    pub fn new(country_code: impl Into<String>, mobile_pattern: &str) -> DomainResult<Self> {
        let country_code = country_code.into().trim_start_matches('+').to_string();
        if country_code.is_empty() || !country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "Invalid default country code: {}",
                country_code
            )));
        }
        let mobile_pattern = Regex::new(mobile_pattern).map_err(|e| {
            DomainError::validation(format!("Invalid mobile pattern: {}", e))
        })?;
        Ok(Self {
            country_code,
            mobile_pattern,
        })
    }

    pub fn from_config(config: &IntelligenceConfig) -> DomainResult<Self> {
        Self::new(config.default_country_code.clone(), &config.mobile_pattern)
    }

    /// Calling code without `+`
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Normalize any input to `+<digits>`
    ///
    /// Total: every input produces a string, valid or not.
    /// - full-width digits become ASCII; spaces, dashes and parentheses are dropped
    /// - a leading `+` is kept
    /// - a leading `0` is replaced by the default calling code
    /// - a leading default calling code gains a `+`
    /// - anything else is prefixed with the default calling code
    /// - a trunk `0` right after the default calling code is dropped
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean_phone_input(raw);
        let cc = self.country_code.as_str();

        let e164 = if let Some(rest) = cleaned.strip_prefix('+') {
            format!("+{}", rest)
        } else if let Some(rest) = cleaned.strip_prefix('0') {
            format!("+{}{}", cc, rest)
        } else if cleaned.starts_with(cc) {
            format!("+{}", cleaned)
        } else {
            format!("+{}{}", cc, cleaned)
        };

        let trunk_prefix = format!("+{}0", cc);
        match e164.strip_prefix(trunk_prefix.as_str()) {
            Some(national) => format!("+{}{}", cc, national),
            None => e164,
        }
    }

    /// Whether a normalized number is a mobile number of the target country
    pub fn is_target_mobile(&self, e164: &str) -> bool {
        self.mobile_pattern.is_match(e164)
    }

    /// Whether a normalized number carries the target calling code
    pub fn is_target_country(&self, e164: &str) -> bool {
        e164.strip_prefix('+')
            .map(|digits| digits.starts_with(self.country_code.as_str()))
            .unwrap_or(false)
    }
}
