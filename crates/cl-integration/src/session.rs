//! Authenticated session setup
//!
//! A session owns the HTTP client and the signing key material. Key material
//! comes from the persisted [`KeyCache`] when it was fetched for the same
//! cookie on the same UTC day, and from `nav` otherwise. A refreshed cache is
//! handed back to the caller to persist.

use std::sync::Arc;

use cl_core::api::{Endpoints, HttpClient, SignedClient};
use cl_core::clock::{Clock, SystemClock};
use cl_core::config::{credential_fingerprint, AuthConfig, Config, KeyCache};
use cl_core::error::{LotteryError, Result};
use cl_core::signing::{RequestSigner, SigningContext};
use tracing::{debug, info, warn};

use crate::http::ReqwestHttpClient;
use crate::nav::{fetch_nav, NavInfo};

/// Signing material and where it came from
#[derive(Debug, Clone)]
pub struct KeyResolution {
    pub context: SigningContext,
    /// New cache entry when `nav` was queried
    pub refreshed: Option<KeyCache>,
    /// The `nav` answer, when it was queried
    pub nav: Option<NavInfo>,
}

/// Reuse the cached keys if still valid for `auth`'s cookie, otherwise query `nav`
pub async fn resolve_signing_context<C: HttpClient>(
    http: &C,
    endpoints: &Endpoints,
    auth: &AuthConfig,
    clock: &dyn Clock,
) -> Result<KeyResolution> {
    let fingerprint = credential_fingerprint(auth.cookie());
    let now = clock.now();

    if let Some(cache) = auth.key_cache.as_ref().filter(|c| c.is_valid_for(&fingerprint, now)) {
        debug!("Using cached signing keys");
        return Ok(KeyResolution {
            context: SigningContext::new(&cache.img_key, &cache.sub_key)?,
            refreshed: None,
            nav: None,
        });
    }

    info!("Fetching signing keys");
    let nav = fetch_nav(http, endpoints)
        .await
        .map_err(|e| e.with_context("fetching signing keys"))?;
    let context = SigningContext::new(&nav.img_key, &nav.sub_key)?;
    let refreshed = KeyCache {
        img_key: nav.img_key.clone(),
        sub_key: nav.sub_key.clone(),
        credential_fingerprint: fingerprint,
        fetched_at: now,
    };

    Ok(KeyResolution {
        context,
        refreshed: Some(refreshed),
        nav: Some(nav),
    })
}

/// A ready-to-use authenticated client
pub struct Session<C = ReqwestHttpClient> {
    client: SignedClient<C>,
    refreshed_key_cache: Option<KeyCache>,
    nav: Option<NavInfo>,
}

impl Session<ReqwestHttpClient> {
    /// Build the HTTP client from `config`, warm it up, and resolve signing keys
    pub async fn open(config: &Config) -> Result<Self> {
        let cookie = config.auth.cookie().ok_or_else(|| {
            LotteryError::NotLoggedIn(
                "no cookie configured; run `comment-lottery auth set-cookie`".to_string(),
            )
        })?;

        let http = ReqwestHttpClient::new(&config.http, Some(cookie))?;
        if let Err(e) = http.warm_up().await {
            warn!("Front page visit failed, continuing: {}", e);
        }

        Self::with_client(http, config, Arc::new(SystemClock)).await
    }
}

impl<C: HttpClient> Session<C> {
    /// Resolve signing keys over an existing client
    pub async fn with_client(http: C, config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let endpoints = Endpoints::from_config(&config.http);
        let resolution =
            resolve_signing_context(&http, &endpoints, &config.auth, clock.as_ref()).await?;

        if let Some(nav) = &resolution.nav {
            if !nav.is_login {
                warn!("The configured cookie is not logged in; relation lookups will fail");
            }
        }

        let signer = RequestSigner::new(resolution.context).with_clock(clock);
        Ok(Self {
            client: SignedClient::new(http, signer, endpoints),
            refreshed_key_cache: resolution.refreshed,
            nav: resolution.nav,
        })
    }

    pub fn client(&self) -> &SignedClient<C> {
        &self.client
    }

    pub fn into_client(self) -> SignedClient<C> {
        self.client
    }

    /// Key cache to persist, if the keys were fetched rather than reused
    pub fn refreshed_key_cache(&self) -> Option<&KeyCache> {
        self.refreshed_key_cache.as_ref()
    }

    /// Login status, known only when `nav` was queried
    pub fn nav(&self) -> Option<&NavInfo> {
        self.nav.as_ref()
    }
}
