//! Configuration module with business-specific sub-modules
//!
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Sliding-window limits for send requests
//! - `server` - HTTP server and CORS configuration
//! - `verification` - OTP lifecycle, phone intelligence, policy and SMS

pub mod database;
pub mod environment;
pub mod rate_limit;
pub mod server;
pub mod verification;

use ::config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use server::{CorsConfig, ServerConfig};
pub use verification::{IntelligenceConfig, OtpConfig, PolicyConfig, SmsConfig};

/// Prefix for environment variable overrides, e.g. `PV__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "PV";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub rate_limit: RateLimitConfig,
    pub otp: OtpConfig,
    pub intelligence: IntelligenceConfig,
    pub policy: PolicyConfig,
    pub sms: SmsConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            rate_limit: RateLimitConfig::default(),
            otp: OtpConfig::default(),
            intelligence: IntelligenceConfig::default(),
            policy: PolicyConfig::default(),
            sms: SmsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration for the current environment
    ///
    /// Sources are layered, later ones winning:
    /// 1. built-in defaults
    /// 2. `config/default.toml` (optional)
    /// 3. `config/{environment}.toml` (optional)
    /// 4. `PV__*` environment variables
    ///
    /// # Returns
    /// * `Ok(AppConfig)` with `environment` pinned to the detected environment
    /// * `Err(ConfigError)` if a present source cannot be parsed
    pub fn load() -> Result<Self, ConfigError> {
        let env = Environment::from_env();
        let mut loaded: AppConfig = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(env.config_file()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("otp.send_stages"),
            )
            .build()?
            .try_deserialize()?;

        loaded.environment = env;
        Ok(loaded)
    }

    /// Configuration preset for local development
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            rate_limit: RateLimitConfig::development(),
            otp: OtpConfig {
                tolerate_sms_failure: true,
                ..Default::default()
            },
            logging: LoggingConfig::for_environment(Environment::Development),
            ..Default::default()
        }
    }
}
