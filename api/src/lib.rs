//! HTTP surface of PhoneVerify
//!
//! Exposes the send and verify endpoints over actix-web and maps domain
//! outcomes to localized JSON responses.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
