//! Gateway client
//!
//! Wraps report requests in a gateway envelope, signs the serialized body
//! and POSTs it to the configured endpoint.

use std::collections::HashMap;
use tracing::{debug, info};

use super::{GatewayError, Signer};
use crate::config::{mask, ClientConfig};
use crate::http::{HttpClient, HttpResponse};
use crate::models::{
    ActionType, DriverBlockReasonSummaryReportRequest, DriverCancelReasonProfileReportRequest,
    DriverCreditDebitReportRequest, DriverProfileReportRequest, DriverTripSummaryReportRequest,
    DriverTripTransactionReportRequest, GatewayRequest, GatewayResponse, HttpHeader,
    PeopleProfileReportRequest, ReportData, ReportRequest, TaxiDriverMappingReportRequest,
    TaxiProfileReportRequest, VehicleModelProfileReportRequest,
};

/// A serialized and signed request, ready to be sent
#[derive(Clone, Debug)]
pub struct SignedRequest {
    pub action: ActionType,
    pub message_id: String,
    pub url: String,
    pub body: String,
    pub signature: String,
    pub headers: HashMap<String, String>,
}

impl SignedRequest {
    /// Headers with token values masked, for display
    pub fn redacted_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let shown = if name == HttpHeader::Auth.as_str() || name == HttpHeader::Csrf.as_str()
                {
                    mask(value)
                } else {
                    value.clone()
                };
                (name.clone(), shown)
            })
            .collect();
        headers.sort();
        headers
    }
}

/// Client for the Finance Reporting Gateway
#[derive(Clone, Debug)]
pub struct GatewayClient {
    config: ClientConfig,
    http: HttpClient,
    signer: Signer,
}

impl GatewayClient {
    pub fn new(config: ClientConfig) -> Result<Self, GatewayError> {
        config.validate().map_err(GatewayError::Config)?;
        let http = HttpClient::with_timeout(config.timeout_secs)?
            .default_header("Accept", "application/json")?;
        let signer = Signer::new(&config.hmac_secret)?;
        debug!(
            "Gateway client for {} (timeout {}s)",
            config.service_endpoint,
            http.timeout_secs()
        );
        Ok(Self {
            config,
            http,
            signer,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build and sign a request without sending it
    pub fn prepare<R: ReportRequest>(
        &self,
        action: ActionType,
        request: &R,
    ) -> Result<SignedRequest, GatewayError> {
        self.build(GatewayRequest::new(action, request))
    }

    /// Build and sign a request the gateway should only validate
    pub fn prepare_validation<R: ReportRequest>(
        &self,
        action: ActionType,
        request: &R,
    ) -> Result<SignedRequest, GatewayError> {
        self.build(GatewayRequest::new(action, request).validate_only())
    }

    fn build<R: ReportRequest>(
        &self,
        envelope: GatewayRequest<'_, R>,
    ) -> Result<SignedRequest, GatewayError> {
        let action = envelope.action_type;
        envelope
            .request_data
            .validate()
            .map_err(|reason| GatewayError::InvalidRequest { action, reason })?;

        let body = envelope.to_json()?;
        let signature = self.signer.sign(&body);

        let mut headers = HashMap::new();
        headers.insert(HttpHeader::Hmac.as_str().to_string(), signature.clone());
        if let Some(token) = &self.config.auth_token {
            headers.insert(HttpHeader::Auth.as_str().to_string(), token.clone());
        }
        if let Some(token) = &self.config.csrf_token {
            headers.insert(HttpHeader::Csrf.as_str().to_string(), token.clone());
        }

        Ok(SignedRequest {
            action,
            message_id: envelope.message_id.clone(),
            url: self.config.service_endpoint.clone(),
            body,
            signature,
            headers,
        })
    }

    /// Send a prepared request and decode the response envelope
    pub async fn dispatch(&self, signed: SignedRequest) -> Result<GatewayResponse, GatewayError> {
        debug!("Http url: {}", signed.url);
        debug!("Http header: HMAC: {}", signed.signature);
        debug!("Http body: {}", signed.body);

        let response = self
            .http
            .post_json(&signed.url, signed.body, signed.headers)
            .await?;

        debug!("Http response: {}", response.body);
        info!(
            "{} [{}] -> HTTP {} in {}ms",
            signed.action, signed.message_id, response.status_code, response.duration_ms
        );

        parse_response(response)
    }

    /// Sign, send and decode one gateway call
    pub async fn process<R: ReportRequest>(
        &self,
        action: ActionType,
        request: &R,
    ) -> Result<GatewayResponse, GatewayError> {
        let signed = self.prepare(action, request)?;
        self.dispatch(signed).await
    }

    /// Ask the gateway to validate a request without running the report
    pub async fn validate<R: ReportRequest>(
        &self,
        action: ActionType,
        request: &R,
    ) -> Result<GatewayResponse, GatewayError> {
        let signed = self.prepare_validation(action, request)?;
        self.dispatch(signed).await
    }

    /// Run a report and return its `responseData`
    pub async fn fetch<R: ReportRequest>(
        &self,
        action: ActionType,
        request: &R,
    ) -> Result<ReportData, GatewayError> {
        let response = self.process(action, request).await?;
        match response.response_data {
            None | Some(serde_json::Value::Null) => Err(GatewayError::MissingResponseData(action)),
            Some(data) => {
                let body = data.to_string();
                serde_json::from_value(data)
                    .map_err(|source| GatewayError::InvalidResponse { source, body })
            }
        }
    }

    pub async fn fetch_people_profile(
        &self,
        request: &PeopleProfileReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::PeopleProfile, request).await
    }

    pub async fn fetch_driver_profile(
        &self,
        request: &DriverProfileReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::DriverProfile, request).await
    }

    pub async fn fetch_taxi_profile(
        &self,
        request: &TaxiProfileReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::TaxiProfile, request).await
    }

    pub async fn fetch_taxi_driver_mapping(
        &self,
        request: &TaxiDriverMappingReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::TaxiDriverMapping, request).await
    }

    pub async fn fetch_vehicle_model_profile(
        &self,
        request: &VehicleModelProfileReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::VehicleModelProfile, request).await
    }

    pub async fn fetch_driver_trip_transaction(
        &self,
        request: &DriverTripTransactionReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::DriverTripTransaction, request).await
    }

    pub async fn fetch_driver_trip_summary(
        &self,
        request: &DriverTripSummaryReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::DriverTripSummary, request).await
    }

    /// Recent trip summaries; unlike the trip summary, driverId is optional
    pub async fn fetch_driver_recent_trip_summary(
        &self,
        request: &DriverTripTransactionReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::DriverRecentTripSummary, request).await
    }

    pub async fn fetch_driver_block_reason(
        &self,
        request: &DriverBlockReasonSummaryReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::DriverBlockReason, request).await
    }

    pub async fn fetch_driver_cancel_reason(
        &self,
        request: &DriverCancelReasonProfileReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::DriverCancelReason, request).await
    }

    pub async fn fetch_driver_credit_debit(
        &self,
        request: &DriverCreditDebitReportRequest,
    ) -> Result<ReportData, GatewayError> {
        self.fetch(ActionType::DriverCreditDebit, request).await
    }
}

fn parse_response(response: HttpResponse) -> Result<GatewayResponse, GatewayError> {
    if !response.is_success() {
        return Err(GatewayError::Status {
            status: response.status_code,
            body: response.body,
        });
    }

    serde_json::from_str(&response.body).map_err(|source| GatewayError::InvalidResponse {
        source,
        body: response.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn client() -> GatewayClient {
        GatewayClient::new(ClientConfig::new(
            "http://localhost:9/proxy/finance/reporting",
            "keep-this-secret",
        ))
        .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        let err = GatewayClient::new(ClientConfig::new("finance-report", "s")).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_prepare_signs_exact_body() {
        let client = client();
        let request = DriverTripTransactionReportRequest::new().driver_id(223);
        let signed = client
            .prepare(ActionType::DriverTripTransaction, &request)
            .unwrap();

        let signer = Signer::new("keep-this-secret").unwrap();
        assert!(signer.verify(&signed.body, &signed.signature));
        assert_eq!(signed.headers.get("HMAC"), Some(&signed.signature));
        assert!(!signed.headers.contains_key("AUTH"));

        let body: Value = serde_json::from_str(&signed.body).unwrap();
        assert_eq!(body["messageId"], Value::String(signed.message_id.clone()));
        assert_eq!(body["requestData"]["driverId"], 223);
    }

    #[test]
    fn test_prepare_validates_request() {
        let err = client()
            .prepare(
                ActionType::DriverTripSummary,
                &DriverTripSummaryReportRequest::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InvalidRequest {
                action: ActionType::DriverTripSummary,
                ..
            }
        ));
    }

    #[test]
    fn test_recent_summary_needs_no_driver() {
        let signed = client()
            .prepare(
                ActionType::DriverRecentTripSummary,
                &DriverTripTransactionReportRequest::new(),
            )
            .unwrap();
        let body: Value = serde_json::from_str(&signed.body).unwrap();
        assert_eq!(body["actionType"], "DRIVER_RECENT_TRIP_SUMMARY");
        assert_eq!(body["requestData"]["driverId"], Value::Null);
    }

    #[test]
    fn test_prepare_validation_flag_and_tokens() {
        let client = GatewayClient::new(
            ClientConfig::new("http://localhost:9/report", "secret")
                .with_auth_token("auth-token-value")
                .with_csrf_token("csrf-token-value"),
        )
        .unwrap();
        let signed = client
            .prepare_validation(ActionType::TaxiProfile, &TaxiProfileReportRequest::new())
            .unwrap();

        let body: Value = serde_json::from_str(&signed.body).unwrap();
        assert_eq!(body["validateOnly"], true);
        assert_eq!(signed.headers["AUTH"], "auth-token-value");
        assert_eq!(signed.headers["CSRF"], "csrf-token-value");

        let shown = signed.redacted_headers();
        assert!(shown.iter().all(|(_, v)| !v.contains("token-val")));
        assert_eq!(shown[0].0, "AUTH");
    }

    #[test]
    fn test_process_rejects_before_sending() {
        let err = tokio_test::block_on(client().process(
            ActionType::DriverBlockReason,
            &DriverBlockReasonSummaryReportRequest::default(),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("driverId is required"));
    }

    #[test]
    fn test_parse_response_status() {
        let response = HttpResponse {
            status_code: 503,
            headers: HashMap::new(),
            body: "unavailable".to_string(),
            duration_ms: 1,
        };
        assert_eq!(parse_response(response).unwrap_err().status(), Some(503));
    }

    #[test]
    fn test_parse_response_invalid_json() {
        let response = HttpResponse {
            status_code: 200,
            headers: HashMap::new(),
            body: "<html>".to_string(),
            duration_ms: 1,
        };
        match parse_response(response).unwrap_err() {
            GatewayError::InvalidResponse { body, .. } => assert_eq!(body, "<html>"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
