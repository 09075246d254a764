//! HTTP client for the Finance Reporting Gateway
//!
//! Thin reqwest wrapper that reports status, headers, body and timing.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::utils::Timer;

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// HTTP client
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    default_headers: HeaderMap,
    timeout_secs: u64,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create client with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("frg-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self {
            client,
            default_headers: HeaderMap::new(),
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Add default header
    pub fn default_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, HttpError> {
        let (name, value) = parse_header(key.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Send HTTP request
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {e}", request.url)))?;
        debug!("Sending {} request to {}", request.method, url);

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| HttpError::RequestFailed(format!("invalid method {}", request.method)))?;

        let mut headers = self.default_headers.clone();
        for (key, value) in &request.headers {
            let (name, value) = parse_header(key, value)?;
            headers.insert(name, value);
        }

        let mut req_builder = self.client.request(method, url.clone()).headers(headers);
        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let timer = Timer::start(format!("{} {}", request.method, url));

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                HttpError::ConnectionRefused(url.to_string())
            } else {
                HttpError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();

        let mut response_headers = HashMap::new();
        for (key, value) in response.headers().iter() {
            if let Ok(v) = value.to_str() {
                response_headers.insert(key.to_string(), v.to_string());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| HttpError::RequestFailed(format!("failed to read response body: {e}")))?;

        let duration_ms = timer.stop().as_millis() as u64;

        debug!(
            "Response: {} {} in {}ms",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            duration_ms
        );

        Ok(HttpResponse {
            status_code: status.as_u16(),
            headers: response_headers,
            body,
            duration_ms,
        })
    }

    /// POST a JSON body
    pub async fn post_json(
        &self,
        url: &str,
        body: impl Into<String>,
        headers: HashMap<String, String>,
    ) -> Result<HttpResponse, HttpError> {
        self.send(
            HttpRequest::post(url)
                .header("Content-Type", "application/json")
                .headers(headers)
                .body(body),
        )
        .await
    }
}

fn parse_header(key: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| HttpError::InvalidHeader {
        name: key.to_string(),
        reason: e.to_string(),
    })?;
    let value = HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
        name: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok((name, value))
}

/// HTTP request builder
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// HTTP response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub duration_ms: u64,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request_builder() {
        let req = HttpRequest::post("http://example.com")
            .header("Content-Type", "application/json")
            .header("HMAC", "abc")
            .body("{}");

        assert_eq!(req.method, "POST");
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_http_response() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        let resp = HttpResponse {
            status_code: 200,
            headers,
            body: "{}".to_string(),
            duration_ms: 100,
        };

        assert!(resp.is_success());
        assert_eq!(
            resp.get_header("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_timeout_and_default_header() {
        let client = HttpClient::with_timeout(7)
            .unwrap()
            .default_header("Accept", "application/json")
            .unwrap();
        assert_eq!(client.timeout_secs(), 7);
        assert_eq!(client.default_headers.len(), 1);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let client = HttpClient::new().unwrap();
        let result = client.default_header("AUTH", "line\nbreak");
        assert!(matches!(result, Err(HttpError::InvalidHeader { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = HttpClient::new().unwrap();
        let result = client.send(HttpRequest::get("not a url")).await;
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = HttpClient::with_timeout(5).unwrap();
        let result = client
            .post_json("http://127.0.0.1:1/proxy", "{}", HashMap::new())
            .await;
        assert!(matches!(
            result,
            Err(HttpError::ConnectionRefused(_)) | Err(HttpError::RequestFailed(_))
        ));
    }
}
