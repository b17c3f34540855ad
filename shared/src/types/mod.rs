//! Type definitions shared by the API and service layers
//!
//! - `language` - Response language negotiation
//! - `response` - Error and health response bodies

pub mod language;
pub mod response;

pub use language::Language;
pub use response::{ErrorResponse, HealthResponse, HealthStatus};
