//! Shared configuration and common types for the PhoneVerify server
//!
//! This crate provides functionality used across all server crates:
//! - Layered application configuration
//! - Response and language types
//! - Phone number text utilities

pub mod config;
pub mod types;
pub mod utils;

pub use config::{
    AppConfig, CorsConfig, DatabaseConfig, Environment, IntelligenceConfig, LogFormat,
    LoggingConfig, OtpConfig, PolicyConfig, RateLimitConfig, ServerConfig, SmsConfig,
};
pub use types::{ErrorResponse, HealthResponse, HealthStatus, Language};
pub use utils::phone;
