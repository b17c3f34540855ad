//! Mock SMS gateway for development and tests.
//!
//! Messages are logged rather than delivered. The full body, including the
//! code, is only printed when console output is enabled.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use pv_core::services::otp::SmsGatewayTrait;
use pv_shared::phone::mask_phone_number;

use super::{is_e164, MAX_MESSAGE_LENGTH};
use crate::InfrastructureError;

/// A message accepted by the mock gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockMessage {
    pub message_id: String,
    pub to: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct MockSmsGateway {
    message_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
    console_output: bool,
    outbox: Arc<Mutex<Vec<MockMessage>>>,
}

impl MockSmsGateway {
    /// Gateway that prints each message to the console
    pub fn new() -> Self {
        Self {
            console_output: true,
            ..Default::default()
        }
    }

    /// Gateway that only records messages
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    /// Messages accepted so far, oldest first
    pub fn outbox(&self) -> Vec<MockMessage> {
        self.outbox
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn last_message_to(&self, phone: &str) -> Option<MockMessage> {
        self.outbox().into_iter().rev().find(|m| m.to == phone)
    }

    pub async fn send_sms(&self, to: &str, body: &str) -> Result<String, InfrastructureError> {
        if !is_e164(to) {
            return Err(InfrastructureError::Sms(format!(
                "Invalid phone number format: {}",
                mask_phone_number(to)
            )));
        }
        if body.len() > MAX_MESSAGE_LENGTH {
            return Err(InfrastructureError::Sms(format!(
                "Message exceeds maximum length of {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                provider = "mock",
                phone = %mask_phone_number(to),
                "Mock SMS gateway simulating failure"
            );
            return Err(InfrastructureError::Sms(
                "Simulated SMS sending failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.console_output {
            println!("[mock sms #{}] to {}: {}", count, to, body);
        }

        info!(
            provider = "mock",
            phone = %mask_phone_number(to),
            message_id = %message_id,
            message_length = body.len(),
            "SMS sent (mock)"
        );

        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(MockMessage {
                message_id: message_id.clone(),
                to: to.to_string(),
                body: body.to_string(),
            });
        }

        Ok(message_id)
    }
}

#[async_trait]
impl SmsGatewayTrait for MockSmsGateway {
    async fn send(&self, to: &str, body: &str) -> Result<String, String> {
        self.send_sms(to, body).await.map_err(|e| e.to_string())
    }
}
