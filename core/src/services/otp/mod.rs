//! OTP lifecycle manager: send and verify with abuse resistance.

mod code;
mod config;
mod pipeline;
mod service;
mod traits;
mod types;

pub use code::{codes_match, generate_code, is_well_formed_code};
pub use config::OtpServiceConfig;
pub use pipeline::{SendStage, SendState};
pub use service::OtpService;
pub use traits::SmsGatewayTrait;
pub use types::{SendOutcome, VerifyOutcome};

#[cfg(test)]
mod tests;
