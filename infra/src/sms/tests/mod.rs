//! Unit tests for SMS module

mod create_gateway_tests;
#[cfg(feature = "twilio-sms")]
mod twilio_tests;
