//! Domain error to HTTP response mapping
//!
//! The only place where statuses and public error codes are chosen.

use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse};
use serde_json::json;
use validator::ValidationErrors;

use pv_core::errors::{DomainError, VerificationError};
use pv_shared::{ErrorResponse, Language};

use crate::i18n::{message, request_language, MessageKey};

/// Status, public error code and message for a domain error
fn classify(error: &DomainError) -> (StatusCode, &'static str, MessageKey) {
    match error {
        DomainError::Validation { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_request", MessageKey::InvalidRequest)
        }
        DomainError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            MessageKey::Internal,
        ),
        DomainError::Verification(err) => match err {
            VerificationError::InvalidPhoneFormat { .. } => (
                StatusCode::BAD_REQUEST,
                "invalid_phone_format",
                MessageKey::InvalidPhone,
            ),
            VerificationError::InvalidCodeFormat => (
                StatusCode::BAD_REQUEST,
                "invalid_code_format",
                MessageKey::InvalidCodeFormat,
            ),
            VerificationError::CaptchaRequired { .. } => (
                StatusCode::BAD_REQUEST,
                "captcha_required",
                MessageKey::CaptchaRequired,
            ),
            VerificationError::Cooldown { .. } => {
                (StatusCode::BAD_REQUEST, "cooldown", MessageKey::Cooldown)
            }
            VerificationError::InvalidCode { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_code", MessageKey::InvalidCode)
            }
            VerificationError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limit_exceeded",
                MessageKey::RateLimited,
            ),
            VerificationError::NotFound
            | VerificationError::Expired
            | VerificationError::Locked => {
                (StatusCode::GONE, "code_unavailable", MessageKey::CodeUnavailable)
            }
            VerificationError::SmsServiceFailure => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                MessageKey::Internal,
            ),
        },
    }
}

/// Build the localized response for a failed send or verify
///
/// `NotFound`, `Expired` and `Locked` collapse into one 410 body. The precise
/// kind is already in the audit log.
pub fn domain_error_response(error: &DomainError, lang: Language) -> HttpResponse {
    let (status, code, key) = classify(error);

    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), "Request failed");
    } else {
        tracing::warn!(error = %error, status = status.as_u16(), "Request rejected");
    }

    let mut body = ErrorResponse::new(code, message(key, lang));
    match error.as_verification() {
        Some(VerificationError::InvalidCode { remaining_attempts }) => {
            body = body.with_detail("remainingAttempts", json!(remaining_attempts));
        }
        Some(VerificationError::RateLimited {
            risk_score,
            risk_flags,
            require_captcha,
        }) => {
            body = body
                .with_detail("riskScore", json!(risk_score))
                .with_detail("riskFlags", json!(risk_flags))
                .with_detail("requireCaptcha", json!(require_captcha));
        }
        Some(VerificationError::CaptchaRequired { .. }) => {
            body = body.with_detail("requireCaptcha", json!(true));
        }
        _ => {}
    }

    HttpResponse::build(status).json(body)
}

/// 400 response for a body that failed field validation
pub fn validation_error_response(errors: &ValidationErrors, lang: Language) -> HttpResponse {
    let fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    tracing::warn!(fields = ?fields, "Request body failed validation");

    HttpResponse::BadRequest().json(
        ErrorResponse::new("validation_error", message(MessageKey::InvalidRequest, lang))
            .with_detail("fields", json!(fields)),
    )
}

/// Localized 400 for malformed or oversized JSON bodies
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let lang = request_language(req);
    tracing::warn!(error = %err, path = req.path(), "Malformed JSON body");

    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        "validation_error",
        message(MessageKey::InvalidRequest, lang),
    ));
    actix_web::error::InternalError::from_response(err, response).into()
}
