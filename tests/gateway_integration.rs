//! Gateway client tests against a mock FRG endpoint

use mockito::{Matcher, Server};
use serde_json::json;

use frg_client::http::HttpError;
use frg_client::models::{
    ActionType, DriverProfileReportRequest, DriverTripSummaryReportRequest,
    DriverTripTransactionReportRequest, TaxiProfileReportRequest,
};
use frg_client::smoke::run_smoke;
use frg_client::{sign, ClientConfig, GatewayClient, GatewayError};

const PATH: &str = "/proxy/finance/reporting";
const SECRET: &str = "integration-secret";

fn client_for(server: &Server) -> GatewayClient {
    GatewayClient::new(ClientConfig::new(format!("{}{PATH}", server.url()), SECRET)).unwrap()
}

fn response_body(data: serde_json::Value) -> String {
    json!({
        "apiVersion": "v2_10_0",
        "messageId": "3b0f5c1e-0000-4000-8000-000000000000",
        "responseData": data,
    })
    .to_string()
}

#[tokio::test]
async fn test_fetch_returns_records() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("content-type", "application/json")
        .match_header("accept", "application/json")
        .match_header("HMAC", Matcher::Regex("^[0-9a-f]{64}$".to_string()))
        .match_body(Matcher::PartialJsonString(
            json!({
                "apiVersion": "v2_10_0",
                "actionType": "DRIVER_TRIP_SUMMARY",
                "validateOnly": false,
                "requestData": { "driverId": 223, "pageSize": 10, "pagingEnabled": true },
            })
            .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(response_body(json!({
            "summaries": [
                { "driverId": 223, "tripCount": 12 },
                { "driverId": 223, "tripCount": 3 },
            ]
        })))
        .create_async()
        .await;

    let data = client_for(&server)
        .fetch_driver_trip_summary(&DriverTripSummaryReportRequest::for_driver(223))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(data.records(ActionType::DriverTripSummary).len(), 2);
    assert_eq!(data.summaries[0]["tripCount"], 12);
}

#[tokio::test]
async fn test_hmac_header_signs_exact_body() {
    let mut server = Server::new_async().await;
    let client = client_for(&server);

    let request = DriverTripTransactionReportRequest::new()
        .driver_id(223)
        .date_range(
            Default::default(),
            Some("2024-01-01"),
            Some("2024-01-31 23:59:59"),
        );
    let signed = client
        .prepare(ActionType::DriverTripTransaction, &request)
        .unwrap();
    let expected = sign(SECRET, &signed.body).unwrap();
    assert_eq!(signed.signature, expected);

    let mock = server
        .mock("POST", PATH)
        .match_header("HMAC", expected.as_str())
        .match_body(Matcher::Exact(signed.body.clone()))
        .with_status(200)
        .with_body(response_body(json!({ "transactions": [] })))
        .create_async()
        .await;

    let response = client.dispatch(signed).await.unwrap();

    mock.assert_async().await;
    assert!(response.response_data.is_some());
}

#[tokio::test]
async fn test_null_collections_keep_returned_rows() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(response_body(json!({
            "profiles": [{ "driverId": 1 }],
            "transactions": null,
            "summaries": null,
        })))
        .create_async()
        .await;

    let data = client_for(&server)
        .fetch_driver_profile(&DriverProfileReportRequest::new().driver_id(1))
        .await
        .unwrap();

    assert_eq!(data.records(ActionType::DriverProfile).len(), 1);
    assert!(data.transactions.is_empty());
}

#[tokio::test]
async fn test_recent_trip_summary_without_driver() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::PartialJsonString(
            json!({
                "actionType": "DRIVER_RECENT_TRIP_SUMMARY",
                "requestData": { "driverId": null },
            })
            .to_string(),
        ))
        .with_status(200)
        .with_body(response_body(json!({ "summaries": [{ "driverId": 5 }, { "driverId": 6 }] })))
        .create_async()
        .await;

    let data = client_for(&server)
        .fetch_driver_recent_trip_summary(&DriverTripTransactionReportRequest::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(data.summaries.len(), 2);
}

#[tokio::test]
async fn test_server_error_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let err = client_for(&server)
        .fetch_taxi_profile(&TaxiProfileReportRequest::new())
        .await
        .unwrap_err();

    match err {
        GatewayError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_response_data() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(json!({ "apiVersion": "v2_10_0", "messageId": "x" }).to_string())
        .create_async()
        .await;

    let err = client_for(&server)
        .fetch_driver_profile(&DriverProfileReportRequest::new().driver_id(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::MissingResponseData(ActionType::DriverProfile)
    ));
}

#[tokio::test]
async fn test_unreadable_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body("<html>gateway timeout</html>")
        .create_async()
        .await;

    let err = client_for(&server)
        .fetch_taxi_profile(&TaxiProfileReportRequest::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_auth_and_csrf_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("AUTH", "auth-token")
        .match_header("CSRF", "csrf-token")
        .with_status(200)
        .with_body(response_body(json!({ "profiles": [{ "taxiId": 9 }] })))
        .create_async()
        .await;

    let client = GatewayClient::new(
        ClientConfig::new(format!("{}{PATH}", server.url()), SECRET)
            .with_auth_token("auth-token")
            .with_csrf_token("csrf-token"),
    )
    .unwrap();
    let data = client
        .fetch_taxi_profile(&TaxiProfileReportRequest::new().taxi_id(9))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(data.total_records(), 1);
}

#[tokio::test]
async fn test_tokens_omitted_when_unset() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("AUTH", Matcher::Missing)
        .match_header("CSRF", Matcher::Missing)
        .with_status(200)
        .with_body(response_body(json!({ "profiles": [] })))
        .create_async()
        .await;

    client_for(&server)
        .fetch_taxi_profile(&TaxiProfileReportRequest::new())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_validate_only_flag_is_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::PartialJsonString(
            json!({ "validateOnly": true }).to_string(),
        ))
        .with_status(200)
        .with_body(response_body(json!({})))
        .create_async()
        .await;

    client_for(&server)
        .validate(ActionType::TaxiProfile, &TaxiProfileReportRequest::new())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_request_is_not_sent() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", PATH).expect(0).create_async().await;

    let err = client_for(&server)
        .fetch_driver_trip_summary(&DriverTripSummaryReportRequest::new())
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, GatewayError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_smoke_run() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(response_body(json!({ "summaries": [{ "driverId": 223 }] })))
        .expect(3)
        .create_async()
        .await;

    let outcomes = run_smoke(&client_for(&server), 223).await;

    mock.assert_async().await;
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.is_success()));
    assert_eq!(outcomes[1].action, ActionType::DriverTripSummary);
    assert_eq!(outcomes[1].records, 1);
}

#[tokio::test]
async fn test_connection_refused() {
    let client = GatewayClient::new(ClientConfig::new("http://127.0.0.1:1/report", SECRET)).unwrap();

    let err = client
        .fetch_taxi_profile(&TaxiProfileReportRequest::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Http(HttpError::ConnectionRefused(_))
    ));
}
