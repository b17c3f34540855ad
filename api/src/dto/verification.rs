use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/v1/verification/send`
///
/// Only sizes are checked here. Phone syntax is judged by the verification
/// service so that every rejection is audited.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeRequest {
    #[validate(length(min = 1, max = 32))]
    pub phone_number: String,

    #[validate(length(max = 512))]
    pub device_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResponse {
    pub success: bool,
    pub message: String,
    pub risk_score: u8,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Body of `POST /api/v1/verification/verify`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, max = 32))]
    pub phone_number: String,

    #[validate(length(min = 1, max = 16))]
    pub otp: String,

    /// Falls back to the `X-Device-Fingerprint` header when absent
    #[validate(length(max = 256))]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    pub phone_number: String,
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeResponse {
    pub success: bool,
    pub message: String,
    pub user: VerifiedUser,
}
