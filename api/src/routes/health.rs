use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

use pv_shared::{ErrorResponse, HealthResponse};

use crate::i18n::{message, request_language, MessageKey};

pub const SERVICE_NAME: &str = "phone-verify-api";

/// `GET /health`
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy(SERVICE_NAME, env!("CARGO_PKG_VERSION")))
}

/// `GET /api/v1/`
pub async fn api_index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "PhoneVerify API v1",
        "endpoints": {
            "health": "/health",
            "verification": {
                "send": {
                    "path": "/api/v1/verification/send",
                    "method": "POST",
                    "description": "Send a one-time code via SMS",
                    "headers": ["X-Session-ID", "X-Device-Fingerprint", "X-Captcha-Token"],
                    "request_body": {
                        "phoneNumber": "string",
                        "deviceInfo": "string (optional)"
                    },
                    "responses": {
                        "200": "Code sent",
                        "400": "Invalid phone, captcha required or cooldown",
                        "429": "Rate limit exceeded",
                        "500": "Service failure"
                    }
                },
                "verify": {
                    "path": "/api/v1/verification/verify",
                    "method": "POST",
                    "description": "Verify a one-time code",
                    "request_body": {
                        "phoneNumber": "string",
                        "otp": "string (6 digits)",
                        "fingerprint": "string (optional)"
                    },
                    "responses": {
                        "200": "Phone verified",
                        "400": "Invalid code",
                        "410": "Code no longer valid",
                        "500": "Service failure"
                    }
                }
            }
        }
    }))
}

/// Default 404 handler
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    let lang = request_language(&req);
    HttpResponse::NotFound().json(ErrorResponse::new(
        "not_found",
        message(MessageKey::NotFound, lang),
    ))
}
