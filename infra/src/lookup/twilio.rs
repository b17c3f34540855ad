//! Twilio Lookup v2 client
//!
//! Requests `line_type_intelligence` for a number and maps the response onto
//! [`LookupResult`]. Callers apply their own timeout as well; the client
//! timeout only bounds a single HTTP exchange.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use pv_core::domain::entities::LineType;
use pv_core::services::phone::{LookupResult, PhoneLookupTrait};
use pv_shared::phone::mask_phone_number;
use pv_shared::IntelligenceConfig;

use crate::InfrastructureError;

#[derive(Debug, Clone)]
pub struct TwilioLookupConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// e.g. `https://lookups.twilio.com/v2/PhoneNumbers`
    pub base_url: String,
    pub timeout: Duration,
}

impl TwilioLookupConfig {
    pub fn from_intelligence_config(config: &IntelligenceConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.trim().is_empty() || config.auth_token.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "Twilio lookup requires account_sid and auth_token".to_string(),
            ));
        }

        Ok(Self {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.lookup_timeout_ms),
        })
    }
}

/// Subset of the Lookup v2 response this service reads
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub valid: bool,
    pub calling_country_code: Option<String>,
    pub line_type_intelligence: Option<LineTypeIntelligence>,
}

#[derive(Debug, Deserialize)]
pub struct LineTypeIntelligence {
    pub carrier_name: Option<String>,
    #[serde(rename = "type")]
    pub line_type: Option<String>,
    pub error_code: Option<i64>,
}

impl From<LookupResponse> for LookupResult {
    fn from(response: LookupResponse) -> Self {
        let intelligence = response.line_type_intelligence;
        let carrier = intelligence
            .as_ref()
            .and_then(|i| i.carrier_name.clone())
            .filter(|name| !name.trim().is_empty());
        let line_type = intelligence
            .as_ref()
            .and_then(|i| i.line_type.as_deref())
            .map(LineType::parse)
            .unwrap_or(LineType::Unknown);
        let carrier_error = intelligence
            .as_ref()
            .map(|i| i.error_code.is_some())
            .unwrap_or(false);

        LookupResult {
            valid: response.valid,
            carrier,
            line_type,
            country_code: response.calling_country_code,
            carrier_error,
        }
    }
}

pub struct TwilioLookupClient {
    http: reqwest::Client,
    config: TwilioLookupConfig,
}

impl TwilioLookupClient {
    pub fn new(config: TwilioLookupConfig) -> Result<Self, InfrastructureError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        tracing::info!(provider = "twilio", "Twilio lookup client initialized");
        Ok(Self { http, config })
    }

    pub async fn fetch(&self, phone: &str) -> Result<LookupResult, InfrastructureError> {
        let url = format!("{}/{}", self.config.base_url, phone);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .query(&[("Fields", "line_type_intelligence")])
            .send()
            .await?
            .error_for_status()?;

        let body: LookupResponse = response.json().await?;
        let result = LookupResult::from(body);

        tracing::debug!(
            phone = %mask_phone_number(phone),
            line_type = result.line_type.as_str(),
            valid = result.valid,
            "Phone lookup completed"
        );

        Ok(result)
    }
}

#[async_trait]
impl PhoneLookupTrait for TwilioLookupClient {
    async fn lookup(&self, phone: &str) -> Result<LookupResult, String> {
        self.fetch(phone).await.map_err(|e| e.to_string())
    }
}
