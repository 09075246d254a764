//! HTTP transport
//!
//! Provides the HTTP client used to reach the gateway.

mod client;

pub use client::{HttpClient, HttpError, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_SECS};
