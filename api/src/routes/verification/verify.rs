use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use pv_core::domain::entities::{AttemptType, MAX_CLIENT_ID_LEN};
use pv_core::repositories::PersistentStore;
use pv_core::services::otp::SmsGatewayTrait;
use pv_core::services::phone::PhoneLookupTrait;
use pv_shared::phone::mask_phone_number;

use crate::app::AppState;
use crate::dto::{VerifiedUser, VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::i18n::{message, request_language, MessageKey};

use super::{audit_rejected, oversized_session_response, request_context, SESSION_HEADER};

/// Handler for POST /api/v1/verification/verify
///
/// A `fingerprint` in the body takes precedence over the
/// `X-Device-Fingerprint` header.
///
/// ## Errors
/// - 400 Bad Request: wrong code (with `remainingAttempts`), malformed code,
///   oversized field or `X-Session-ID`
/// - 410 Gone: no usable code for this number
/// - 500 Internal Server Error: store failure
pub async fn verify_code<P, S, L>(
    req: HttpRequest,
    state: web::Data<AppState<P, S, L>>,
    body: web::Json<VerifyCodeRequest>,
) -> HttpResponse
where
    P: PersistentStore + 'static,
    S: SmsGatewayTrait + 'static,
    L: PhoneLookupTrait + 'static,
{
    let lang = request_language(&req);
    let request = body.into_inner();

    let mut context = request_context(&req, state.config.server.trust_proxy_headers);

    if let Err(errors) = request.validate() {
        audit_rejected(
            state.get_ref(),
            AttemptType::Verify,
            &request.phone_number,
            &context,
            errors.to_string(),
        )
        .await;
        return validation_error_response(&errors, lang);
    }
    if context.has_oversized_session() {
        audit_rejected(
            state.get_ref(),
            AttemptType::Verify,
            &request.phone_number,
            &context,
            format!("{} exceeds {} characters", SESSION_HEADER, MAX_CLIENT_ID_LEN),
        )
        .await;
        return oversized_session_response(lang);
    }

    if let Some(fingerprint) = request.fingerprint.filter(|f| !f.trim().is_empty()) {
        context.fingerprint_hash = Some(fingerprint);
        context = context.bounded();
    }

    tracing::info!(
        phone = %mask_phone_number(&request.phone_number),
        ip = context.ip.as_deref().unwrap_or("unknown"),
        "Processing verify request"
    );

    match state
        .otp_service
        .verify(&request.phone_number, &request.otp, &context)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(VerifyCodeResponse {
            success: true,
            message: message(MessageKey::Verified, lang).to_string(),
            user: VerifiedUser {
                phone_number: outcome.phone,
                verified_at: outcome.verified_at,
            },
        }),
        Err(error) => domain_error_response(&error, lang),
    }
}
