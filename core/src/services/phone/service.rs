//! Phone intelligence validation service

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pv_shared::phone::mask_phone_number;
use pv_shared::IntelligenceConfig;

use crate::errors::DomainResult;
use crate::repositories::PhoneIntelligenceRepository;

use super::cache::{IntelligenceCache, LookupThrottle};
use super::normalizer::PhoneNormalizer;
use super::traits::PhoneLookupTrait;
use super::types::{PhoneValidation, SmsEligibility, ValidationSource};

/// Points removed from a phone's risk score after a successful verification
pub const VERIFIED_RISK_DECREMENT: u8 = 10;

/// Configuration for the intelligence service
#[derive(Debug, Clone)]
pub struct IntelligenceServiceConfig {
    /// Network timeout for one lookup
    pub lookup_timeout: Duration,
    /// Lifetime of cached and persisted lookup data
    pub cache_ttl: chrono::Duration,
    pub cache_capacity: usize,
    pub throttle_per_minute: u32,
}

impl Default for IntelligenceServiceConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(4),
            cache_ttl: chrono::Duration::hours(24),
            cache_capacity: 1000,
            throttle_per_minute: 50,
        }
    }
}

impl From<&IntelligenceConfig> for IntelligenceServiceConfig {
    fn from(config: &IntelligenceConfig) -> Self {
        Self {
            lookup_timeout: Duration::from_millis(config.lookup_timeout_ms),
            cache_ttl: chrono::Duration::hours(config.cache_ttl_hours),
            cache_capacity: config.cache_capacity,
            throttle_per_minute: config.throttle_per_minute,
        }
    }
}

/// Validates phone numbers against cached, persisted and live carrier data
///
/// Lookup order: in-process cache, persisted record, external provider.
/// When the provider is throttled, slow or failing, an offline pattern
/// heuristic answers instead and the result is not cached.
pub struct PhoneIntelligenceService<R, L>
where
    R: PhoneIntelligenceRepository,
    L: PhoneLookupTrait,
{
    repository: Arc<R>,
    lookup: Arc<L>,
    normalizer: PhoneNormalizer,
    cache: IntelligenceCache,
    throttle: LookupThrottle,
    config: IntelligenceServiceConfig,
}

impl<R, L> PhoneIntelligenceService<R, L>
where
    R: PhoneIntelligenceRepository,
    L: PhoneLookupTrait,
{
    pub fn new(
        repository: Arc<R>,
        lookup: Arc<L>,
        normalizer: PhoneNormalizer,
        config: IntelligenceServiceConfig,
    ) -> Self {
        Self {
            repository,
            lookup,
            cache: IntelligenceCache::new(config.cache_capacity, config.cache_ttl),
            throttle: LookupThrottle::per_minute(config.throttle_per_minute),
            normalizer,
            config,
        }
    }

    pub fn normalizer(&self) -> &PhoneNormalizer {
        &self.normalizer
    }

    /// Number of entries held in the in-process cache
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Validate a normalized E.164 number
    ///
    /// Never fails: storage and provider problems degrade to the heuristic.
    ///
    /// # Arguments
    /// * `phone` - Canonical E.164 number
    pub async fn validate(&self, phone: &str) -> PhoneValidation {
        let now = Utc::now();
        let target = self.normalizer.country_code();

        if let Some(mut cached) = self.cache.get(phone, now) {
            cached.source = ValidationSource::Cache;
            return cached;
        }

        match self.repository.find_intelligence(phone).await {
            Ok(Some(record)) if record.is_fresh(now, self.config.cache_ttl) => {
                let validation = PhoneValidation::from_record(&record, target);
                self.cache.insert(validation.clone(), now);
                return validation;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    phone = %mask_phone_number(phone),
                    error = %e,
                    event = "intelligence_store_read_failed",
                    "Failed to read persisted phone intelligence"
                );
            }
        }

        if !self.throttle.try_acquire(Instant::now()) {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                event = "intelligence_lookup_throttled",
                "Lookup throttle reached, using heuristic validation"
            );
            return self.heuristic(phone, "lookup throttled");
        }

        match tokio::time::timeout(self.config.lookup_timeout, self.lookup.lookup(phone)).await {
            Ok(Ok(result)) => {
                let validation = PhoneValidation::from_lookup(phone, &result, target);
                self.cache.insert(validation.clone(), now);
                if let Err(e) = self.repository.upsert_intelligence(&validation.to_record()).await {
                    tracing::warn!(
                        phone = %mask_phone_number(phone),
                        error = %e,
                        event = "intelligence_store_write_failed",
                        "Failed to persist phone intelligence"
                    );
                }
                tracing::debug!(
                    phone = %mask_phone_number(phone),
                    risk_score = validation.risk_score,
                    line_type = validation.line_type.as_str(),
                    "Phone intelligence lookup completed"
                );
                validation
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    phone = %mask_phone_number(phone),
                    error = %e,
                    event = "intelligence_lookup_failed",
                    "Phone lookup failed, using heuristic validation"
                );
                self.heuristic(phone, "lookup failed")
            }
            Err(_) => {
                tracing::warn!(
                    phone = %mask_phone_number(phone),
                    timeout_ms = self.config.lookup_timeout.as_millis() as u64,
                    event = "intelligence_lookup_timeout",
                    "Phone lookup timed out, using heuristic validation"
                );
                self.heuristic(phone, "lookup timed out")
            }
        }
    }

    /// Decide whether an SMS should be sent to this number
    pub async fn can_send_sms(&self, phone: &str) -> SmsEligibility {
        self.validate(phone)
            .await
            .sms_eligibility(self.normalizer.country_code())
    }

    /// Reward a successful verification by lowering the phone's risk score
    ///
    /// # Returns
    /// * `Ok(Some(score))` - New persisted score
    /// * `Ok(None)` - Nothing was persisted for this phone
    pub async fn record_successful_verification(&self, phone: &str) -> DomainResult<Option<u8>> {
        let target = self.normalizer.country_code().to_string();
        self.cache
            .update(phone, |validation| validation.lower_risk(VERIFIED_RISK_DECREMENT, &target));
        self.repository
            .decrement_risk_score(phone, VERIFIED_RISK_DECREMENT)
            .await
    }

    fn heuristic(&self, phone: &str, reason: &str) -> PhoneValidation {
        PhoneValidation::heuristic(
            phone,
            self.normalizer.is_target_mobile(phone),
            self.normalizer.country_code(),
            reason,
        )
    }
}
