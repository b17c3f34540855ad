mod config_tests;

use std::sync::Arc;

use crate::domain::entities::RequestContext;
use crate::repositories::InMemoryStore;
use crate::services::otp::{OtpService, OtpServiceConfig};
use crate::services::phone::{IntelligenceServiceConfig, PhoneIntelligenceService, PhoneNormalizer};
use crate::services::policy::PolicyWeights;
use crate::services::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::services::tests::mocks::{RecordingGateway, ScriptedLookup};

pub(super) const PHONE: &str = "+819012345678";

pub(super) type TestService = OtpService<InMemoryStore, RecordingGateway, ScriptedLookup>;

pub(super) struct Harness {
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<RecordingGateway>,
    pub lookup: Arc<ScriptedLookup>,
    pub service: TestService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(OtpServiceConfig::default(), RateLimiterConfig::default())
    }

    pub fn with(config: OtpServiceConfig, limits: RateLimiterConfig) -> Self {
        Self::with_lookup(ScriptedLookup::mobile(), config, limits)
    }

    pub fn with_lookup(
        lookup: ScriptedLookup,
        config: OtpServiceConfig,
        limits: RateLimiterConfig,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let lookup = Arc::new(lookup);
        let intelligence = PhoneIntelligenceService::new(
            store.clone(),
            lookup.clone(),
            PhoneNormalizer::default(),
            IntelligenceServiceConfig::default(),
        );
        let service = OtpService::new(
            store.clone(),
            gateway.clone(),
            intelligence,
            RateLimiter::new(store.clone(), limits),
            PolicyWeights::default(),
            config,
        );
        Self {
            store,
            gateway,
            lookup,
            service,
        }
    }

    /// Send to `phone` and return the delivered code
    pub async fn send_code(&self, phone: &str, context: &RequestContext) -> String {
        self.service.send(phone, context).await.unwrap();
        self.gateway.last_code_for(&self.service.normalize(phone)).unwrap()
    }
}

pub(super) fn context() -> RequestContext {
    RequestContext::new()
        .with_ip("203.0.113.7")
        .with_fingerprint("fp-device-1")
        .with_session("sess-1")
}

/// A six-digit code different from `code`
pub(super) fn wrong_code(code: &str) -> String {
    if code == "111111" {
        "222222".to_string()
    } else {
        "111111".to_string()
    }
}
