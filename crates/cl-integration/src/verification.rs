//! Login verification
//!
//! Checks the configured cookie against `nav` and collects anything that
//! would stop a draw from working.

use chrono::{DateTime, Utc};
use cl_core::api::{Endpoints, HttpClient};
use cl_core::config::{credential_fingerprint, AuthConfig};
use serde::Serialize;

use crate::http::cookie_pairs;
use crate::nav::fetch_nav;

/// Outcome of a login check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub logged_in: bool,
    pub uid: Option<String>,
    pub uname: Option<String>,
    /// Problems found, each with a hint where one exists
    pub issues: Vec<String>,
}

impl VerificationResult {
    pub fn is_ok(&self) -> bool {
        self.logged_in && self.issues.is_empty()
    }
}

/// Cookie names missing from `cookie` that a logged-in session needs
pub fn missing_cookies(cookie: &str) -> Vec<&'static str> {
    let names: Vec<&str> = cookie_pairs(cookie)
        .filter_map(|pair| pair.split_once('=').map(|(name, _)| name.trim()))
        .collect();
    ["SESSDATA"]
        .into_iter()
        .filter(|required| !names.contains(required))
        .collect()
}

/// Check `auth` against the live service
pub async fn verify_login<C: HttpClient>(
    http: &C,
    endpoints: &Endpoints,
    auth: &AuthConfig,
    now: DateTime<Utc>,
) -> VerificationResult {
    let mut result = VerificationResult::default();

    let Some(cookie) = auth.cookie() else {
        result
            .issues
            .push("No cookie configured. Run 'comment-lottery auth set-cookie'".to_string());
        return result;
    };

    for name in missing_cookies(cookie) {
        result
            .issues
            .push(format!("Cookie has no {} entry; copy the full Cookie header", name));
    }

    match fetch_nav(http, endpoints).await {
        Ok(nav) => {
            result.logged_in = nav.is_login;
            result.uid = nav.mid;
            result.uname = nav.uname;
            if !nav.is_login {
                result
                    .issues
                    .push("Cookie is not logged in (expired or revoked)".to_string());
            }
        }
        Err(e) => result.issues.push(format!("Login check failed: {}", e)),
    }

    if let Some(cache) = &auth.key_cache {
        if !cache.is_valid_for(&credential_fingerprint(Some(cookie)), now) {
            result
                .issues
                .push("Cached signing keys are stale; they will be refreshed on the next draw".to_string());
        }
    }

    result
}
