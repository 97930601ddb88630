//! HTTP seam between exchange adapters and the network.
//!
//! Adapters never touch `reqwest` directly. They ask an [`HttpTransport`] for
//! decoded JSON, which lets tests substitute canned responses.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::MarketsConfig;
use crate::errors::MarketsError;
use crate::models::Exchange;

/// Fetches JSON documents on behalf of an exchange adapter.
///
/// `exchange` is only used to attribute errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` and decode the body as JSON.
    async fn get_json(&self, exchange: Exchange, url: &str) -> Result<Value, MarketsError>;

    /// POST `body` as JSON to `url` and decode the response body as JSON.
    async fn post_json(
        &self,
        exchange: Exchange,
        url: &str,
        body: &Value,
    ) -> Result<Value, MarketsError>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &MarketsConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    async fn read_json(
        exchange: Exchange,
        url: &str,
        response: reqwest::Response,
    ) -> Result<Value, MarketsError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MarketsError::upstream(
                exchange,
                format!("HTTP {} - {}", status, truncate(&body)),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            MarketsError::upstream(exchange, format!("Failed to parse response from {}: {}", url, e))
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(&MarketsConfig::default())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, exchange: Exchange, url: &str) -> Result<Value, MarketsError> {
        debug!("{} GET {}", exchange, url);
        let response = self.client.get(url).send().await?;
        Self::read_json(exchange, url, response).await
    }

    async fn post_json(
        &self,
        exchange: Exchange,
        url: &str,
        body: &Value,
    ) -> Result<Value, MarketsError> {
        debug!("{} POST {}", exchange, url);
        let response = self.client.post(url).json(body).send().await?;
        Self::read_json(exchange, url, response).await
    }
}

const MAX_ERROR_BODY: usize = 512;

/// Error bodies can be whole HTML pages.
fn truncate(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
pub(crate) mod fake {
    //! Canned-response transport for adapter tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub(crate) struct FakeTransport {
        get: HashMap<String, Value>,
        post: Mutex<HashMap<String, Vec<Value>>>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_get(mut self, url: &str, body: Value) -> Self {
            self.get.insert(url.to_string(), body);
            self
        }

        /// Queue POST responses for `url`, returned in order.
        pub(crate) fn with_posts(self, url: &str, bodies: Vec<Value>) -> Self {
            self.post
                .lock()
                .unwrap()
                .insert(url.to_string(), bodies.into_iter().rev().collect());
            self
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get_json(&self, exchange: Exchange, url: &str) -> Result<Value, MarketsError> {
            self.requests.lock().unwrap().push(format!("GET {}", url));
            self.get
                .get(url)
                .cloned()
                .ok_or_else(|| MarketsError::upstream(exchange, format!("HTTP 404 - {}", url)))
        }

        async fn post_json(
            &self,
            exchange: Exchange,
            url: &str,
            body: &Value,
        ) -> Result<Value, MarketsError> {
            self.requests
                .lock()
                .unwrap()
                .push(format!("POST {} {}", url, body));
            self.post
                .lock()
                .unwrap()
                .get_mut(url)
                .and_then(|queue| queue.pop())
                .ok_or_else(|| MarketsError::upstream(exchange, format!("HTTP 404 - {}", url)))
        }
    }
}
