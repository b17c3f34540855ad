//! Per-request client metadata passed into send and verify.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Widest fingerprint or session id the store keeps
pub const MAX_CLIENT_ID_LEN: usize = 128;

/// Widest user agent the store keeps
pub const MAX_USER_AGENT_LEN: usize = 512;

/// Client metadata captured from the HTTP request
///
/// Every field is optional; the rate limiter and consistency checker
/// simply skip dimensions that are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Resolved client IP address
    pub ip: Option<String>,

    /// Client-supplied device fingerprint hash
    pub fingerprint_hash: Option<String>,

    /// Client session identifier (`X-Session-ID`)
    pub session_id: Option<String>,

    /// Captcha token presented with the request
    pub captcha_token: Option<String>,

    pub user_agent: Option<String>,

    /// Free-form device description from the send body
    pub device_info: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_fingerprint(mut self, fingerprint_hash: impl Into<String>) -> Self {
        self.fingerprint_hash = Some(fingerprint_hash.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_captcha(mut self, token: impl Into<String>) -> Self {
        self.captcha_token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_device_info(mut self, device_info: impl Into<String>) -> Self {
        self.device_info = Some(device_info.into());
        self
    }

    /// Fit client-supplied values to the stored column widths
    ///
    /// A fingerprint longer than [`MAX_CLIENT_ID_LEN`] is replaced by its
    /// hex SHA-256 digest, so equal inputs still compare equal. The user
    /// agent is cut to [`MAX_USER_AGENT_LEN`] characters. Session ids are
    /// echoed back to the client and are left for the caller to reject.
    pub fn bounded(mut self) -> Self {
        if let Some(fingerprint) = self.fingerprint_hash.as_mut() {
            if fingerprint.chars().count() > MAX_CLIENT_ID_LEN {
                *fingerprint = hex::encode(Sha256::digest(fingerprint.as_bytes()));
            }
        }
        if let Some(user_agent) = self.user_agent.as_mut() {
            let cut = user_agent.char_indices().nth(MAX_USER_AGENT_LEN).map(|(i, _)| i);
            if let Some(cut) = cut {
                user_agent.truncate(cut);
            }
        }
        self
    }

    /// Session id too long to store
    pub fn has_oversized_session(&self) -> bool {
        self.session_id
            .as_deref()
            .map(|session| session.chars().count() > MAX_CLIENT_ID_LEN)
            .unwrap_or(false)
    }

    /// True when a non-blank captcha token accompanies the request
    pub fn has_captcha(&self) -> bool {
        self.captcha_token
            .as_deref()
            .map(|token| !token.trim().is_empty())
            .unwrap_or(false)
    }
}
