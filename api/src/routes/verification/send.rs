use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use pv_core::domain::entities::{AttemptType, MAX_CLIENT_ID_LEN};
use pv_core::repositories::PersistentStore;
use pv_core::services::otp::SmsGatewayTrait;
use pv_core::services::phone::PhoneLookupTrait;
use pv_shared::phone::mask_phone_number;

use crate::app::AppState;
use crate::dto::{SendCodeRequest, SendCodeResponse};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::i18n::{message, request_language, MessageKey};

use super::{audit_rejected, oversized_session_response, request_context, SESSION_HEADER};

/// Handler for POST /api/v1/verification/send
///
/// # Request
///
/// Headers `X-Session-ID`, `X-Device-Fingerprint` and optionally
/// `X-Captcha-Token`.
///
/// ```json
/// { "phoneNumber": "090-1234-5678", "deviceInfo": "iPhone15,2" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "success": true, "message": "...", "riskScore": 30, "sessionId": "...", "expiresAt": "..." }
/// ```
///
/// ## Errors
/// - 400 Bad Request: invalid phone, captcha required, cooldown, oversized
///   field or `X-Session-ID` (audited like every other refusal)
/// - 429 Too Many Requests: `{error, riskScore, riskFlags, requireCaptcha}`
/// - 500 Internal Server Error: store or SMS failure
pub async fn send_code<P, S, L>(
    req: HttpRequest,
    state: web::Data<AppState<P, S, L>>,
    body: web::Json<SendCodeRequest>,
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
            AttemptType::Send,
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
            AttemptType::Send,
            &request.phone_number,
            &context,
            format!("{} exceeds {} characters", SESSION_HEADER, MAX_CLIENT_ID_LEN),
        )
        .await;
        return oversized_session_response(lang);
    }

    context.device_info = request.device_info;

    tracing::info!(
        phone = %mask_phone_number(&request.phone_number),
        ip = context.ip.as_deref().unwrap_or("unknown"),
        has_captcha = context.has_captcha(),
        "Processing send request"
    );

    match state
        .otp_service
        .send(&request.phone_number, &context)
        .await
    {
        Ok(outcome) => {
            tracing::info!(
                phone = %mask_phone_number(&outcome.phone),
                risk_score = outcome.risk_score,
                sms_delivered = outcome.sms_delivered,
                "Verification code issued"
            );

            HttpResponse::Ok().json(SendCodeResponse {
                success: true,
                message: message(MessageKey::CodeSent, lang).to_string(),
                risk_score: outcome.risk_score,
                session_id: outcome.session_id,
                expires_at: outcome.expires_at,
            })
        }
        Err(error) => domain_error_response(&error, lang),
    }
}
