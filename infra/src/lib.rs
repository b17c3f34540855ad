//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborators the verification core
//! depends on.
//!
//! ## Architecture
//!
//! - **Database**: MySQL [`PersistentStore`](pv_core::repositories::PersistentStore) using SQLx
//! - **SMS**: Twilio gateway and a logging mock for development
//! - **Lookup**: Twilio Lookup v2 client and an offline metadata lookup
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `twilio-sms`: Enable Twilio SMS delivery (default)

use pv_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Phone intelligence lookup providers
pub mod lookup;

/// SMS delivery providers
pub mod sms;

#[cfg(feature = "mysql")]
pub use database::{DatabasePool, MySqlStore};
pub use lookup::{create_phone_lookup, OfflineLookup, TwilioLookupClient};
pub use sms::{create_sms_gateway, MockSmsGateway};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// Phone lookup provider error
    #[error("Lookup error: {0}")]
    Lookup(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::internal(err.to_string())
    }
}
