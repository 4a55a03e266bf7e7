//! Scripted in-memory HTTP client for tests

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{Headers, HttpClient};
use crate::error::{LotteryError, Result};

/// A request seen by [`ScriptedHttpClient`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Headers,
}

impl RecordedRequest {
    /// Query value for `key`
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Header value for `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type Handler = Box<dyn Fn(&RecordedRequest) -> Result<Value> + Send + Sync>;

/// Answers requests from handlers registered per URL path
pub struct ScriptedHttpClient {
    routes: Vec<(String, Handler)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests whose URL ends with `path`
    pub fn route<F>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Result<Value> + Send + Sync + 'static,
    {
        self.routes.push((path.to_string(), Box::new(handler)));
        self
    }

    /// Every request seen so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose URL ends with `path`
    pub fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .count()
    }
}

impl Default for ScriptedHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &Headers,
    ) -> Result<Value> {
        let request = RecordedRequest {
            url: url.to_string(),
            query: query.to_vec(),
            headers: headers.clone(),
        };
        self.requests.lock().unwrap().push(request.clone());

        let (_, handler) = self
            .routes
            .iter()
            .find(|(path, _)| url.ends_with(path.as_str()))
            .ok_or_else(|| LotteryError::Transport(format!("no scripted route for {}", url)))?;
        handler(&request)
    }
}
