//! Phone intelligence lookup providers
//!
//! - **Twilio**: Lookup v2 with line type intelligence over HTTPS
//! - **Offline**: numbering-plan metadata only, no network access

use pv_core::services::phone::PhoneLookupTrait;
use pv_shared::IntelligenceConfig;

use crate::InfrastructureError;

pub mod offline;
pub mod twilio;

pub use offline::OfflineLookup;
pub use self::twilio::{TwilioLookupClient, TwilioLookupConfig};

#[cfg(test)]
mod tests;

/// Create the lookup provider selected by `config.provider`
///
/// # Returns
/// * `Ok(lookup)` - `"offline"` or `"twilio"`
/// * `Err(InfrastructureError::Config)` - Unknown provider or missing credentials
pub fn create_phone_lookup(
    config: &IntelligenceConfig,
) -> Result<Box<dyn PhoneLookupTrait>, InfrastructureError> {
    match config.provider.trim().to_lowercase().as_str() {
        "offline" => {
            tracing::info!(provider = "offline", "Using offline phone lookup");
            Ok(Box::new(OfflineLookup::new()))
        }
        "twilio" => {
            let client = TwilioLookupClient::new(TwilioLookupConfig::from_intelligence_config(config)?)?;
            Ok(Box::new(client))
        }
        other => Err(InfrastructureError::Config(format!(
            "Unknown phone lookup provider '{}'",
            other
        ))),
    }
}
