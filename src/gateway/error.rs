//! Gateway error types

use thiserror::Error;

use crate::http::HttpError;
use crate::models::ActionType;

/// Errors returned by [`GatewayClient`](super::GatewayClient)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {action} request: {reason}")]
    InvalidRequest { action: ActionType, reason: String },

    #[error("Failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gateway returned an unreadable response: {source}")]
    InvalidResponse {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Gateway response for {0} has no responseData")]
    MissingResponseData(ActionType),
}

impl GatewayError {
    /// HTTP status of a rejected request, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GatewayError::InvalidRequest {
            action: ActionType::DriverTripSummary,
            reason: "driverId is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid DRIVER_TRIP_SUMMARY request: driverId is required"
        );

        let err = GatewayError::Status {
            status: 401,
            body: "bad hmac".to_string(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Gateway returned HTTP 401: bad hmac");
    }

    #[test]
    fn test_http_error_is_transparent() {
        let err: GatewayError = HttpError::Timeout(30).into();
        assert_eq!(err.to_string(), "Timeout after 30 seconds");
        assert_eq!(err.status(), None);
    }
}
