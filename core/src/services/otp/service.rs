//! OTP lifecycle: admission, code delivery and verification

use chrono::Utc;
use std::sync::Arc;

use pv_shared::phone::mask_phone_number;
use pv_shared::AppConfig;

use crate::domain::entities::{
    AttemptType, AuditEntry, AuditStatus, LineType, RequestContext, RiskFlag, RiskFlags,
    VerificationRecord,
};
use crate::errors::{DomainResult, VerificationError};
use crate::repositories::{PersistentStore, UserIdentityRepository, VerificationRecordRepository};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::consistency::{self, DeviceSnapshot};
use crate::services::phone::{
    IntelligenceServiceConfig, PhoneIntelligenceService, PhoneLookupTrait, PhoneNormalizer,
};
use crate::services::policy::{decide, PolicyWeights};
use crate::services::rate_limit::{RateLimitRequest, RateLimiter, RateLimiterConfig};

use super::code::{codes_match, generate_code, is_well_formed_code};
use super::config::OtpServiceConfig;
use super::pipeline::{SendStage, SendState};
use super::traits::SmsGatewayTrait;
use super::types::{SendOutcome, VerifyOutcome};

/// Owns the send/verify state machine for phone verification
///
/// Per phone: `NONE -> PENDING -> {VERIFIED | EXPIRED | LOCKED}`. Every
/// attempt, admitted or not, leaves one audit entry.
pub struct OtpService<P, S, L>
where
    P: PersistentStore + 'static,
    S: SmsGatewayTrait,
    L: PhoneLookupTrait,
{
    store: Arc<P>,
    gateway: Arc<S>,
    intelligence: PhoneIntelligenceService<P, L>,
    rate_limiter: RateLimiter<P>,
    audit: AuditService<P>,
    weights: PolicyWeights,
    config: OtpServiceConfig,
}

impl<P, S, L> OtpService<P, S, L>
where
    P: PersistentStore + 'static,
    S: SmsGatewayTrait,
    L: PhoneLookupTrait,
{
    pub fn new(
        store: Arc<P>,
        gateway: Arc<S>,
        intelligence: PhoneIntelligenceService<P, L>,
        rate_limiter: RateLimiter<P>,
        weights: PolicyWeights,
        config: OtpServiceConfig,
    ) -> Self {
        Self {
            audit: AuditService::new(Arc::clone(&store), AuditServiceConfig::default()),
            store,
            gateway,
            intelligence,
            rate_limiter,
            weights,
            config,
        }
    }

    /// Wire every collaborator from application configuration
    ///
    /// # Errors
    /// * `DomainError::Validation` if the mobile pattern or the send stage list is invalid
    pub fn from_app_config(
        store: Arc<P>,
        gateway: Arc<S>,
        lookup: Arc<L>,
        config: &AppConfig,
    ) -> DomainResult<Self> {
        let normalizer = PhoneNormalizer::from_config(&config.intelligence)?;
        let intelligence = PhoneIntelligenceService::new(
            Arc::clone(&store),
            lookup,
            normalizer,
            IntelligenceServiceConfig::from(&config.intelligence),
        );
        let rate_limiter =
            RateLimiter::new(Arc::clone(&store), RateLimiterConfig::from(&config.rate_limit));
        Ok(Self::new(
            store,
            gateway,
            intelligence,
            rate_limiter,
            PolicyWeights::from(&config.policy),
            OtpServiceConfig::from_config(&config.otp, config.environment)?,
        ))
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    pub fn intelligence(&self) -> &PhoneIntelligenceService<P, L> {
        &self.intelligence
    }

    pub fn rate_limiter(&self) -> &RateLimiter<P> {
        &self.rate_limiter
    }

    pub fn audit(&self) -> &AuditService<P> {
        &self.audit
    }

    /// Canonical E.164 form of user input
    pub fn normalize(&self, raw_phone: &str) -> String {
        self.intelligence.normalizer().normalize(raw_phone)
    }

    /// Admit a send request, then generate, persist and deliver a code
    ///
    /// # Errors
    /// * `VerificationError::InvalidPhoneFormat` - not a target-country mobile number
    /// * `VerificationError::Cooldown` - phone verified within the cooldown
    /// * `VerificationError::RateLimited` - refused by the policy
    /// * `VerificationError::CaptchaRequired` - captcha needed but not supplied
    /// * `VerificationError::SmsServiceFailure` - gateway failed and failures are not tolerated
    /// * `DomainError::Internal` - the OTP store failed
    pub async fn send(&self, raw_phone: &str, context: &RequestContext) -> DomainResult<SendOutcome> {
        let mut state = SendState::new(raw_phone);
        let result = self.run_send(&mut state, context).await;

        let (risk_score, risk_flags) = match &result {
            Ok(outcome) => (outcome.risk_score, outcome.risk_flags.clone()),
            Err(_) => state.risk(),
        };
        let (status, detail) = match &result {
            Ok(outcome) if outcome.sms_delivered => (AuditStatus::Success, None),
            Ok(_) => (
                AuditStatus::SmsFailureTolerated,
                Some("SMS delivery failed, tolerated outside production".to_string()),
            ),
            Err(e) => (e.audit_status(), Some(e.to_string())),
        };
        let mut entry = AuditEntry::new(AttemptType::Send, status)
            .with_phone(&state.phone)
            .with_context(context)
            .with_risk(risk_score, risk_flags);
        if let Some(detail) = detail {
            entry = entry.with_detail(detail);
        }
        self.audit.record(entry).await;

        result
    }

    /// Check a code against the phone's pending record
    ///
    /// A malformed code is rejected without consuming an attempt. The attempt
    /// is reserved atomically before the comparison, so concurrent guesses
    /// can never exceed the attempt limit.
    ///
    /// # Errors
    /// * `VerificationError::InvalidCodeFormat` - not exactly six digits
    /// * `VerificationError::NotFound` / `Expired` / `Locked` - no usable pending record
    /// * `VerificationError::InvalidCode` - wrong code, with attempts remaining
    /// * `DomainError::Internal` - the OTP store failed
    pub async fn verify(
        &self,
        raw_phone: &str,
        code: &str,
        context: &RequestContext,
    ) -> DomainResult<VerifyOutcome> {
        let phone = self.normalize(raw_phone);
        let mut risk_score = 0;
        let mut risk_flags = RiskFlags::new();
        let result = self
            .run_verify(&phone, code.trim(), context, &mut risk_score, &mut risk_flags)
            .await;

        let (status, detail) = match &result {
            Ok(_) => (AuditStatus::Success, None),
            Err(e) => (e.audit_status(), Some(e.to_string())),
        };
        let mut entry = AuditEntry::new(AttemptType::Verify, status)
            .with_phone(&phone)
            .with_context(context)
            .with_risk(risk_score, risk_flags);
        if let Some(detail) = detail {
            entry = entry.with_detail(detail);
        }
        self.audit.record(entry).await;

        result
    }

    async fn run_send(&self, state: &mut SendState, context: &RequestContext) -> DomainResult<SendOutcome> {
        for stage in &self.config.stages {
            if let Err(e) = self.run_stage(*stage, state, context).await {
                self.release_reservation(state).await;
                return Err(e);
            }
        }

        let (risk_score, risk_flags) = state.risk();
        let require_captcha = state
            .decision
            .as_ref()
            .map(|d| d.require_captcha)
            .unwrap_or(false);

        let code = generate_code();
        let record = VerificationRecord::new(state.phone.as_str(), code.as_str(), self.config.code_ttl)
            .with_context(context)
            .with_risk(risk_score, risk_flags.clone(), require_captcha);

        if let Err(e) = self.store.replace_pending(&record).await {
            tracing::error!(
                phone = %mask_phone_number(&state.phone),
                error = %e,
                event = "otp_storage_failed",
                "Failed to store verification record"
            );
            self.release_reservation(state).await;
            return Err(e);
        }

        tracing::info!(
            phone = %mask_phone_number(&state.phone),
            record_id = %record.id,
            risk_score,
            event = "otp_generated",
            "Generated new verification code"
        );

        let body = self.config.render_message(&code);
        let (message_id, sms_delivered) = match self.gateway.send(&state.phone, &body).await {
            Ok(message_id) => (Some(message_id), true),
            Err(e) if self.config.tolerates_sms_failure() => {
                tracing::warn!(
                    phone = %mask_phone_number(&state.phone),
                    error = %e,
                    environment = %self.config.environment,
                    event = "sms_failure_tolerated",
                    "SMS delivery failed, continuing outside production"
                );
                (None, false)
            }
            Err(e) => {
                tracing::error!(
                    phone = %mask_phone_number(&state.phone),
                    error = %e,
                    event = "sms_send_failed",
                    "Failed to send verification SMS"
                );
                return Err(VerificationError::SmsServiceFailure.into());
            }
        };

        Ok(SendOutcome {
            phone: state.phone.clone(),
            record_id: record.id,
            session_id: context
                .session_id
                .clone()
                .unwrap_or_else(|| record.id.to_string()),
            risk_score,
            risk_flags,
            require_captcha,
            expires_at: record.expires_at,
            message_id,
            sms_delivered,
            rate_limit_degraded: state.rate_limit_degraded(),
        })
    }

    /// Give back counter rows reserved by a send that was refused later
    async fn release_reservation(&self, state: &SendState) {
        if let Some(report) = &state.rate_limits {
            self.rate_limiter.release(report).await;
        }
    }

    async fn run_stage(
        &self,
        stage: SendStage,
        state: &mut SendState,
        context: &RequestContext,
    ) -> DomainResult<()> {
        match stage {
            SendStage::Normalize => {
                state.phone = self.normalize(&state.phone);
            }
            SendStage::ValidateFormat => {
                if !self.intelligence.normalizer().is_target_mobile(&state.phone) {
                    tracing::warn!(
                        phone = %mask_phone_number(&state.phone),
                        event = "invalid_phone_format",
                        "Rejected phone outside the supported mobile range"
                    );
                    return Err(VerificationError::InvalidPhoneFormat {
                        phone: mask_phone_number(&state.phone),
                    }
                    .into());
                }
            }
            SendStage::Cooldown => {
                if let Some(identity) = self.store.find_identity(&state.phone).await? {
                    let now = Utc::now();
                    if identity.is_in_cooldown(now, self.config.reverification_cooldown) {
                        return Err(VerificationError::Cooldown {
                            next_eligible_at: identity
                                .next_eligible_at(self.config.reverification_cooldown),
                        }
                        .into());
                    }
                }
            }
            SendStage::Intelligence => {
                let validation = self.intelligence.validate(&state.phone).await;
                let eligibility = validation.sms_eligibility(self.intelligence.normalizer().country_code());
                if validation.line_type == LineType::Voip {
                    state.intelligence_flags.insert(RiskFlag::VoipNumber);
                }
                if !eligibility.can_send {
                    tracing::warn!(
                        phone = %mask_phone_number(&state.phone),
                        reason = eligibility.reason.as_deref().unwrap_or("-"),
                        risk_score = validation.risk_score,
                        event = "sms_ineligible_phone",
                        "Phone intelligence marks number as high risk"
                    );
                    state.intelligence_flags.insert(RiskFlag::HighRiskPhone);
                }
                state.validation = Some(validation);
            }
            SendStage::RateLimit => {
                let request = RateLimitRequest::new(
                    &state.phone,
                    context.ip.as_deref(),
                    context.fingerprint_hash.as_deref(),
                );
                state.rate_limits = Some(self.rate_limiter.reserve(&request).await);
            }
            SendStage::Decide => {
                let decision = decide(&state.policy_input(), &self.weights);
                state.decision = Some(decision.clone());
                if !decision.allowed {
                    return Err(VerificationError::RateLimited {
                        risk_score: decision.risk_score,
                        risk_flags: decision.risk_flags,
                        require_captcha: decision.require_captcha,
                    }
                    .into());
                }
                if decision.require_captcha && !context.has_captcha() {
                    return Err(VerificationError::CaptchaRequired {
                        risk_score: decision.risk_score,
                        risk_flags: decision.risk_flags,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    async fn run_verify(
        &self,
        phone: &str,
        code: &str,
        context: &RequestContext,
        risk_score: &mut u8,
        risk_flags: &mut RiskFlags,
    ) -> DomainResult<VerifyOutcome> {
        if !is_well_formed_code(code) {
            return Err(VerificationError::InvalidCodeFormat.into());
        }

        let record = self
            .store
            .find_latest_pending(phone)
            .await?
            .ok_or(VerificationError::NotFound)?;
        *risk_score = record.risk_score;
        risk_flags.extend(record.risk_flags.iter().copied());

        let now = Utc::now();
        if record.is_expired_at(now) {
            return Err(VerificationError::Expired.into());
        }
        if record.is_locked(self.config.max_attempts) {
            return Err(VerificationError::Locked.into());
        }

        let consistency = consistency::check(
            &DeviceSnapshot::from_record(&record),
            &DeviceSnapshot::from_context(context),
        );
        if !consistency.is_consistent() {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                flags = ?consistency.flags,
                event = "verify_device_mismatch",
                "Verify request does not match the device that requested the code"
            );
            risk_flags.extend(consistency.flags.iter().copied());
        }

        let attempts = self
            .store
            .consume_attempt(record.id, self.config.max_attempts)
            .await?
            .ok_or(VerificationError::Locked)?;

        if !codes_match(&record.code, code) {
            let remaining_attempts = (self.config.max_attempts - attempts).max(0);
            tracing::warn!(
                phone = %mask_phone_number(phone),
                remaining_attempts,
                event = "otp_verification_failed",
                "Verification code mismatch"
            );
            return Err(VerificationError::InvalidCode { remaining_attempts }.into());
        }

        let verified_at = Utc::now();
        if !self.store.mark_verified(record.id, verified_at).await? {
            return Err(VerificationError::NotFound.into());
        }

        tracing::info!(
            phone = %mask_phone_number(phone),
            record_id = %record.id,
            event = "otp_verified_success",
            "Verification code successfully verified"
        );

        let verification_count = match self.store.record_verification(phone, verified_at).await {
            Ok(identity) => Some(identity.verification_count),
            Err(e) => {
                tracing::error!(
                    phone = %mask_phone_number(phone),
                    error = %e,
                    event = "identity_update_failed",
                    "Failed to record verified identity"
                );
                None
            }
        };

        if let Err(e) = self.intelligence.record_successful_verification(phone).await {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                error = %e,
                event = "risk_decrement_failed",
                "Failed to lower phone risk score after verification"
            );
        }

        Ok(VerifyOutcome {
            phone: phone.to_string(),
            verified_at,
            risk_flags: risk_flags.clone(),
            verification_count,
        })
    }
}
