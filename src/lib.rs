//! FRG client - signed report requests for the Finance Reporting Gateway
//!
//! Builds report requests, wraps them in the gateway envelope, signs the
//! serialized body with HMAC-SHA256 and POSTs it to the configured endpoint.
//!
//! ## Example
//!
//! ```no_run
//! use frg_client::{ClientConfig, DriverTripSummaryReportRequest, GatewayClient};
//!
//! # async fn run() -> Result<(), frg_client::GatewayError> {
//! let client = GatewayClient::new(ClientConfig::new(
//!     "http://146.148.110.253:8080/proxy/finance/reporting",
//!     "shared-secret",
//! ))?;
//! let data = client
//!     .fetch_driver_trip_summary(&DriverTripSummaryReportRequest::for_driver(223))
//!     .await?;
//! println!("{} summaries", data.summaries.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gateway;
pub mod http;
pub mod models;
pub mod output;
pub mod smoke;
pub mod utils;

pub use config::ClientConfig;
pub use gateway::{sign, GatewayClient, GatewayError, SignedRequest, Signer};
pub use models::*;
