//! The configured providers driving the verification service end to end

use std::sync::Arc;

use pv_core::domain::entities::RequestContext;
use pv_core::repositories::InMemoryStore;
use pv_core::services::otp::OtpService;
use pv_infra::{create_phone_lookup, create_sms_gateway, MockSmsGateway, OfflineLookup};
use pv_shared::AppConfig;

const PHONE: &str = "+819012345678";

fn code_in(body: &str) -> String {
    body.split(|c: char| !c.is_ascii_digit())
        .find(|chunk| chunk.len() == 6)
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_mock_gateway_and_offline_lookup_complete_a_verification() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockSmsGateway::silent());
    let service = OtpService::from_app_config(
        store.clone(),
        gateway.clone(),
        Arc::new(OfflineLookup::new()),
        &AppConfig::default(),
    )
    .unwrap();
    let context = RequestContext::new().with_ip("203.0.113.9");

    let sent = service.send("090-1234-5678", &context).await.unwrap();
    assert!(sent.sms_delivered);
    assert!(!sent.require_captcha);
    assert!(sent.risk_score < 40);

    let message = gateway.last_message_to(PHONE).unwrap();
    assert_eq!(sent.message_id.as_deref(), Some(message.message_id.as_str()));

    let verified = service
        .verify(PHONE, &code_in(&message.body), &context)
        .await
        .unwrap();
    assert_eq!(verified.phone, PHONE);
    assert_eq!(verified.verification_count, Some(1));
}

#[tokio::test]
async fn test_factory_built_providers_plug_into_the_service() {
    let config = AppConfig::default();
    let gateway = Arc::new(create_sms_gateway(&config.sms).unwrap());
    let lookup = Arc::new(create_phone_lookup(&config.intelligence).unwrap());

    let service =
        OtpService::from_app_config(Arc::new(InMemoryStore::new()), gateway, lookup, &config)
            .unwrap();

    let outcome = service
        .send(PHONE, &RequestContext::new().with_session("sess-42"))
        .await
        .unwrap();

    assert_eq!(outcome.session_id, "sess-42");
    assert!(outcome.message_id.unwrap().starts_with("mock_"));
}
