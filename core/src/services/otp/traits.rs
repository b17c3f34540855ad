//! Trait for the outbound SMS gateway

use async_trait::async_trait;
use std::sync::Arc;

/// SMS gateway integration
#[async_trait]
pub trait SmsGatewayTrait: Send + Sync {
    /// Send `body` to an E.164 number, returning the provider message id
    async fn send(&self, to: &str, body: &str) -> Result<String, String>;
}

#[async_trait]
impl<T: SmsGatewayTrait + ?Sized> SmsGatewayTrait for Box<T> {
    async fn send(&self, to: &str, body: &str) -> Result<String, String> {
        (**self).send(to, body).await
    }
}

#[async_trait]
impl<T: SmsGatewayTrait + ?Sized> SmsGatewayTrait for Arc<T> {
    async fn send(&self, to: &str, body: &str) -> Result<String, String> {
        (**self).send(to, body).await
    }
}
