//! API response bodies shared across handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Generic error body returned for non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code for client-side handling
    pub error: String,

    /// Localized, human-readable message
    pub message: String,

    /// Extra public fields, serialized beside `error` (e.g. `remainingAttempts`)
    #[serde(flatten, default)]
    pub details: HashMap<String, serde_json::Value>,

    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach one public detail field
    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Health status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            service: service.into(),
            version: version.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_details() {
        let body = ErrorResponse::new("invalid_code", "Invalid code")
            .with_detail("remainingAttempts", serde_json::json!(4));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "invalid_code");
        assert_eq!(json["remainingAttempts"], 4);
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_response_without_details() {
        let json = serde_json::to_value(ErrorResponse::new("x", "y")).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
    }
}
