//! Configuration management for comment-lottery

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credentials and cached signing material
    pub auth: AuthConfig,
    /// HTTP settings
    pub http: HttpConfig,
    /// Draw defaults
    pub draw: DrawConfig,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Raw `Cookie` header value of a logged-in browser session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    /// Signing key material from the last `nav` lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_cache: Option<KeyCache>,
}

impl AuthConfig {
    /// Cookie string, if one is configured and non-blank
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Replace the cookie and drop the key cache bound to the old one
    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
        self.key_cache = None;
    }
}

/// Cached signing key material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCache {
    pub img_key: String,
    pub sub_key: String,
    /// Fingerprint of the cookie the keys were fetched with
    pub credential_fingerprint: String,
    pub fetched_at: DateTime<Utc>,
}

impl KeyCache {
    /// Keys rotate daily; a cache is only reused for the same credential on the same UTC day.
    pub fn is_valid_for(&self, fingerprint: &str, now: DateTime<Utc>) -> bool {
        self.credential_fingerprint == fingerprint && self.fetched_at.date_naive() == now.date_naive()
    }
}

/// Fingerprint of a credential string, used to bind cached material to it
pub fn credential_fingerprint(cookie: Option<&str>) -> String {
    let hash = blake3::hash(cookie.unwrap_or_default().as_bytes());
    hash.to_hex()[..16].to_string()
}

/// HTTP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base URL of the JSON API
    pub api_base: String,
    /// Base URL of the web front page (cookie domain)
    pub web_base: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Relationship lookups in flight at once; 0 means unbounded
    pub max_concurrent_lookups: usize,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.bilibili.com".to_string(),
            web_base: "https://www.bilibili.com".to_string(),
            timeout_secs: 10,
            max_concurrent_lookups: 16,
            user_agent: crate::api::headers::USER_AGENT.to_string(),
        }
    }
}

/// Draw defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Sort mode used when none is given
    pub default_mode: String,
    /// Winner count used when none is given
    pub default_winners: usize,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            default_mode: crate::types::CommentQuery::DEFAULT_MODE.to_string(),
            default_winners: 1,
        }
    }
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> crate::Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(crate::LotteryError::Config(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.draw.default_winners == 0 {
            return Err(crate::LotteryError::Config(
                "draw.default_winners must be at least 1".to_string(),
            ));
        }
        for (name, url) in [("http.api_base", &self.http.api_base), ("http.web_base", &self.http.web_base)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(crate::LotteryError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        Ok(())
    }
}
