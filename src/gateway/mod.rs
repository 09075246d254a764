//! Finance Reporting Gateway client
//!
//! Signs report requests and exchanges them with the gateway over HTTP.

mod client;
mod error;
mod signer;

pub use client::{GatewayClient, SignedRequest};
pub use error::GatewayError;
pub use signer::{sign, Signer};
