//! Phone verification route handlers
//!
//! - `send` - admit a request and deliver a one-time code
//! - `verify` - check a submitted code

pub mod send;
pub mod verify;

pub use send::send_code;
pub use verify::verify_code;

use std::net::IpAddr;

use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

use pv_core::domain::entities::{AttemptType, AuditEntry, AuditStatus, RequestContext};
use pv_core::repositories::PersistentStore;
use pv_core::services::otp::SmsGatewayTrait;
use pv_core::services::phone::PhoneLookupTrait;
use pv_shared::phone::mask_phone_number;
use pv_shared::{ErrorResponse, Language};

use crate::app::AppState;
use crate::i18n::{message, MessageKey};

pub const SESSION_HEADER: &str = "X-Session-ID";
pub const FINGERPRINT_HEADER: &str = "X-Device-Fingerprint";
pub const CAPTCHA_HEADER: &str = "X-Captcha-Token";

/// Trimmed, non-empty header value
fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Canonical text of a header value that is an IP address
fn parse_ip(value: &str) -> Option<String> {
    value.trim().parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

/// Extract client IP address from request
///
/// Proxy headers are only consulted when `trust_proxy_headers` is set, and
/// only values that parse as an IP address are taken from them.
pub fn extract_client_ip(req: &HttpRequest, trust_proxy_headers: bool) -> Option<String> {
    if trust_proxy_headers {
        // First hop of the comma-separated list is the original client
        if let Some(forwarded_for) = header_value(req, "X-Forwarded-For") {
            if let Some(ip) = forwarded_for.split(',').next().and_then(parse_ip) {
                return Some(ip);
            }
        }

        if let Some(real_ip) = header_value(req, "X-Real-IP").as_deref().and_then(parse_ip) {
            return Some(real_ip);
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

/// Extract user agent from request headers
pub fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    header_value(req, "User-Agent")
}

/// Identifiers of the caller shared by send and verify, fitted to the store
pub fn request_context(req: &HttpRequest, trust_proxy_headers: bool) -> RequestContext {
    RequestContext {
        ip: extract_client_ip(req, trust_proxy_headers),
        fingerprint_hash: header_value(req, FINGERPRINT_HEADER),
        session_id: header_value(req, SESSION_HEADER),
        captcha_token: header_value(req, CAPTCHA_HEADER),
        user_agent: extract_user_agent(req),
        device_info: None,
    }
    .bounded()
}

/// Audit a request refused before it reached the OTP service
pub async fn audit_rejected<P, S, L>(
    state: &AppState<P, S, L>,
    attempt: AttemptType,
    raw_phone: &str,
    context: &RequestContext,
    detail: String,
) where
    P: PersistentStore + 'static,
    S: SmsGatewayTrait + 'static,
    L: PhoneLookupTrait + 'static,
{
    let mut context = context.clone();
    if context.has_oversized_session() {
        context.session_id = None;
    }

    let mut entry = AuditEntry::new(attempt, AuditStatus::ValidationError)
        .with_context(&context)
        .with_detail(detail);
    if !raw_phone.trim().is_empty() {
        entry = entry.with_phone(&state.otp_service.normalize(raw_phone));
    }

    tracing::warn!(
        phone = %mask_phone_number(raw_phone),
        attempt = ?attempt,
        event = "request_rejected",
        "Request rejected before verification"
    );
    state.otp_service.audit().record(entry).await;
}

/// 400 for a session id the store cannot hold
pub fn oversized_session_response(lang: Language) -> HttpResponse {
    HttpResponse::BadRequest().json(
        ErrorResponse::new("validation_error", message(MessageKey::InvalidRequest, lang))
            .with_detail("fields", json!([SESSION_HEADER])),
    )
}
