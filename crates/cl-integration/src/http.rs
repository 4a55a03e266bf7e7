//! reqwest-backed HTTP client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cl_core::api::headers::document_headers;
use cl_core::api::{Headers, HttpClient};
use cl_core::config::HttpConfig;
use cl_core::error::{LotteryError, Result};
use reqwest::cookie::Jar;
use reqwest::{RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, trace};

/// HTTP client with an in-memory cookie jar
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    web_base: Url,
}

/// `name=value` pairs of a `Cookie` header string
pub fn cookie_pairs(cookie: &str) -> impl Iterator<Item = &str> {
    cookie
        .split(';')
        .map(str::trim)
        .filter(|pair| matches!(pair.split_once('='), Some((name, _)) if !name.trim().is_empty()))
}

fn parse_base(name: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| LotteryError::Config(format!("{} '{}' is not a valid URL: {}", name, value, e)))
}

fn with_headers(mut request: RequestBuilder, headers: &Headers) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

fn transport(url: &str, e: reqwest::Error) -> LotteryError {
    LotteryError::Transport(format!("GET {}: {}", url, e))
}

impl ReqwestHttpClient {
    /// Build a client; `cookie` seeds the jar for the API and web hosts
    pub fn new(config: &HttpConfig, cookie: Option<&str>) -> Result<Self> {
        let api_base = parse_base("http.api_base", &config.api_base)?;
        let web_base = parse_base("http.web_base", &config.web_base)?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = cookie {
            let mut count = 0;
            for pair in cookie_pairs(cookie) {
                jar.add_cookie_str(pair, &api_base);
                jar.add_cookie_str(pair, &web_base);
                count += 1;
            }
            debug!(cookies = count, "Seeded cookie jar");
        }

        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LotteryError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            jar,
            web_base,
        })
    }

    /// Visit the web front page so the jar picks up the anonymous device cookies
    pub async fn warm_up(&self) -> Result<()> {
        let url = self.web_base.as_str();
        debug!(url, "Warming up session");
        with_headers(self.client.get(self.web_base.clone()), &document_headers())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| transport(url, e))?;
        Ok(())
    }

    /// Whether the jar holds any cookie for `url`
    pub fn has_cookies_for(&self, url: &str) -> bool {
        use reqwest::cookie::CookieStore;
        Url::parse(url)
            .ok()
            .and_then(|url| self.jar.cookies(&url))
            .is_some()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &Headers,
    ) -> Result<Value> {
        trace!(url, params = query.len(), "GET");
        let response = with_headers(self.client.get(url).query(query), headers)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| transport(url, e))?;

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                LotteryError::schema(url, format!("body is not JSON: {}", e))
            } else {
                transport(url, e)
            }
        })
    }
}
