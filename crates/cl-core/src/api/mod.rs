//! Remote API plumbing
//!
//! The core never talks to the network directly. It goes through an
//! [`HttpClient`] supplied by the caller; signed endpoints are only reachable
//! through a [`SignedClient`], which pairs that client with the session's
//! [`RequestSigner`].

pub mod headers;
mod params;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::{LotteryError, Result};
use crate::signing::RequestSigner;

pub use headers::Headers;
pub use params::QueryParams;

/// Transport used by the pipeline
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` with `query` and `headers`, returning the decoded JSON body
    async fn get_json(&self, url: &str, query: &[(String, String)], headers: &Headers)
        -> Result<Value>;
}

/// URLs of the endpoints the pipeline touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api_base: String,
}

impl Endpoints {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(&config.api_base)
    }

    /// Paginated comment listing (signed)
    pub fn comment_list(&self) -> String {
        format!("{}/x/v2/reply/wbi/main", self.api_base)
    }

    /// Relationship lookup (signed)
    pub fn relation(&self) -> String {
        format!("{}/x/space/wbi/acc/relation", self.api_base)
    }

    /// Login status and signing key material (unsigned)
    pub fn nav(&self) -> String {
        format!("{}/x/web-interface/nav", self.api_base)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// The `{code, message, data}` wrapper around every API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Decode a response body, reporting shape mismatches against `endpoint`
    pub fn parse(endpoint: &str, body: Value) -> Result<Self>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(body).map_err(|e| LotteryError::schema(endpoint, e))
    }

    /// Payload of a successful response; a non-zero code or missing payload is an API error
    pub fn into_data(self) -> Result<T> {
        if self.code != 0 {
            return Err(LotteryError::Api {
                code: self.code,
                message: self.message,
            });
        }
        self.data.ok_or_else(|| LotteryError::Api {
            code: self.code,
            message: if self.message.is_empty() {
                "response carried no data".to_string()
            } else {
                format!("response carried no data ({})", self.message)
            },
        })
    }
}

/// An HTTP client that has been through signing setup
pub struct SignedClient<C> {
    http: C,
    signer: RequestSigner,
    endpoints: Endpoints,
}

impl<C: HttpClient> SignedClient<C> {
    pub fn new(http: C, signer: RequestSigner, endpoints: Endpoints) -> Self {
        Self {
            http,
            signer,
            endpoints,
        }
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GET with `w_rid`/`wts` appended to `params`
    pub async fn get_signed(&self, url: &str, params: &QueryParams, headers: &Headers) -> Result<Value> {
        let signature = self.signer.sign(params)?;
        let mut query = params.to_pairs();
        query.extend(signature.into_pairs());

        debug!(url, params = query.len(), "signed GET");
        self.http.get_json(url, &query, headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::mock::ScriptedHttpClient;
    use super::*;
    use crate::clock::FixedClock;
    use crate::signing::SigningContext;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_endpoints_trim_trailing_slash() {
        let endpoints = Endpoints::new("http://127.0.0.1:9000/");
        assert_eq!(
            endpoints.comment_list(),
            "http://127.0.0.1:9000/x/v2/reply/wbi/main"
        );
        assert_eq!(
            Endpoints::default().nav(),
            "https://api.bilibili.com/x/web-interface/nav"
        );
    }

    #[test]
    fn test_envelope_success() {
        let envelope: ApiEnvelope<Value> =
            ApiEnvelope::parse("test", json!({"code": 0, "message": "0", "data": {"x": 1}})).unwrap();
        assert_eq!(envelope.into_data().unwrap(), json!({"x": 1}));
    }

    #[test]
    fn test_envelope_nonzero_code() {
        let envelope: ApiEnvelope<Value> =
            ApiEnvelope::parse("test", json!({"code": -404, "message": "not found"})).unwrap();
        let err = envelope.into_data().unwrap_err();
        assert!(matches!(err, LotteryError::Api { code: -404, .. }));
    }

    #[test]
    fn test_envelope_missing_data() {
        let envelope: ApiEnvelope<Value> =
            ApiEnvelope::parse("test", json!({"code": 0, "message": "0"})).unwrap();
        assert!(matches!(
            envelope.into_data().unwrap_err(),
            LotteryError::Api { code: 0, .. }
        ));
    }

    #[test]
    fn test_envelope_schema_error() {
        let err = ApiEnvelope::<Value>::parse("nav", json!({"message": "no code"})).unwrap_err();
        assert!(matches!(err, LotteryError::Schema { ref endpoint, .. } if endpoint == "nav"));
    }

    #[tokio::test]
    async fn test_signed_get_appends_signature() {
        let http = ScriptedHttpClient::new().route("/x/test", |_| Ok(json!({"code": 0})));
        let context = SigningContext::new(
            "7cd084941338484aae1ad9425b84077c",
            "4932caff0ff746eab6f01bf08b70ac45",
        )
        .unwrap();
        let signer = RequestSigner::new(context)
            .with_clock(Arc::new(FixedClock::at_unix(1_702_204_169)));
        let client = SignedClient::new(http, signer, Endpoints::default());

        let params = QueryParams::new()
            .with("foo", "114")
            .with("bar", "514")
            .with("zab", "1919810");
        client
            .get_signed("https://api.example/x/test", &params, &Headers::new())
            .await
            .unwrap();

        let requests = client.http().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].param("foo"), Some("114"));
        assert_eq!(requests[0].param("w_rid"), Some("8f6f2b5b3d485fe1886cec6a0be8c5d4"));
        assert_eq!(requests[0].param("wts"), Some("1702204169"));
    }
}
