//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// Sliding-window limits applied to send requests
///
/// Each identifier kind (phone, IP, device fingerprint) has an independent
/// window of `window_seconds`. The two enumeration thresholds bound how many
/// distinct phones one IP may touch, and how many distinct IPs may target one
/// phone, inside the same window.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Sliding window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Max sends per phone number per window
    #[serde(default = "default_phone_limit")]
    pub phone_limit: u32,

    /// Max sends per client IP per window
    #[serde(default = "default_ip_limit")]
    pub ip_limit: u32,

    /// Max sends per device fingerprint per window
    #[serde(default = "default_fingerprint_limit")]
    pub fingerprint_limit: u32,

    /// Distinct phones one IP may target before enumeration is flagged
    #[serde(default = "default_max_phones_per_ip")]
    pub max_phones_per_ip: u32,

    /// Distinct IPs one phone may be targeted from before enumeration is flagged
    #[serde(default = "default_max_ips_per_phone")]
    pub max_ips_per_phone: u32,

    /// Counter rows older than this are pruned by the cleanup task
    #[serde(default = "default_counter_retention_hours")]
    pub counter_retention_hours: i64,

    /// Interval between cleanup runs in seconds
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_seconds: default_window_seconds(),
            phone_limit: default_phone_limit(),
            ip_limit: default_ip_limit(),
            fingerprint_limit: default_fingerprint_limit(),
            max_phones_per_ip: default_max_phones_per_ip(),
            max_ips_per_phone: default_max_ips_per_phone(),
            counter_retention_hours: default_counter_retention_hours(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
        }
    }
}

impl RateLimitConfig {
    /// Lenient limits for local development
    pub fn development() -> Self {
        Self {
            phone_limit: 10,
            ip_limit: 100,
            fingerprint_limit: 100,
            ..Default::default()
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_window_seconds() -> u64 {
    3600 // 1 hour
}

fn default_phone_limit() -> u32 {
    3
}

fn default_ip_limit() -> u32 {
    20
}

fn default_fingerprint_limit() -> u32 {
    15
}

fn default_max_phones_per_ip() -> u32 {
    10
}

fn default_max_ips_per_phone() -> u32 {
    5
}

fn default_counter_retention_hours() -> i64 {
    24
}

fn default_cleanup_interval_seconds() -> u64 {
    3600
}
