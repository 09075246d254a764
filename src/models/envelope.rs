//! Gateway request/response envelopes
//!
//! A [`GatewayRequest`] wraps a report request with the metadata the gateway
//! needs to route and audit it. The serialized form is what gets signed, so
//! [`GatewayRequest::to_json`] must be the only path to the wire body.

use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::action::{ActionType, ApiVersion};

/// Envelope sent to the gateway
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest<'a, R: Serialize> {
    pub api_version: ApiVersion,
    pub message_id: String,
    pub request_date: String,
    pub validate_only: bool,
    pub action_type: ActionType,
    pub request_data: &'a R,
}

impl<'a, R: Serialize> GatewayRequest<'a, R> {
    pub fn new(action_type: ActionType, request_data: &'a R) -> Self {
        Self {
            api_version: ApiVersion::default(),
            message_id: Uuid::new_v4().to_string(),
            request_date: Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            validate_only: false,
            action_type,
            request_data,
        }
    }

    /// Ask the gateway to validate the request without running the report
    pub fn validate_only(mut self) -> Self {
        self.validate_only = true;
        self
    }

    /// Serialize with sorted keys and four-space indentation
    pub fn to_json(&self) -> serde_json::Result<String> {
        let value = sort_keys(serde_json::to_value(self)?);
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;
        // serde_json only ever writes valid UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Rebuild every object with its keys in lexical order
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Envelope returned by the gateway
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse<T = Value> {
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub response_data: Option<T>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rows of a report response
///
/// Each report fills one of the lists (see [`ActionType::collection`]); the
/// rest stay empty, whether the gateway omits them or sends `null`. Anything
/// else the gateway returns lands in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub profiles: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transactions: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summaries: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mappings: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub models: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reasons: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ReportData {
    /// Rows for the given action's collection
    pub fn records(&self, action: ActionType) -> &[Value] {
        match action.collection() {
            "profiles" => &self.profiles,
            "transactions" => &self.transactions,
            "summaries" => &self.summaries,
            "mappings" => &self.mappings,
            "models" => &self.models,
            "reasons" => &self.reasons,
            _ => &[],
        }
    }

    /// First non-empty collection, for callers that don't know the action
    pub fn any_records(&self) -> &[Value] {
        [
            &self.profiles,
            &self.transactions,
            &self.summaries,
            &self.mappings,
            &self.models,
            &self.reasons,
        ]
        .into_iter()
        .find(|rows| !rows.is_empty())
        .map(|rows| rows.as_slice())
        .unwrap_or(&[])
    }

    pub fn total_records(&self) -> usize {
        self.profiles.len()
            + self.transactions.len()
            + self.summaries.len()
            + self.mappings.len()
            + self.models.len()
            + self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DriverTripSummaryReportRequest;
    use serde_json::json;

    #[test]
    fn test_envelope_defaults() {
        let report = DriverTripSummaryReportRequest::for_driver(223);
        let request = GatewayRequest::new(ActionType::DriverTripSummary, &report);
        let value: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();

        assert_eq!(value["apiVersion"], json!("v2_10_0"));
        assert_eq!(value["actionType"], json!("DRIVER_TRIP_SUMMARY"));
        assert_eq!(value["validateOnly"], json!(false));
        assert_eq!(value["requestData"]["driverId"], json!(223));
        assert!(Uuid::parse_str(value["messageId"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_envelope_is_sorted_and_indented() {
        let report = json!({ "zeta": 1, "alpha": 2 });
        let request = GatewayRequest::new(ActionType::TaxiProfile, &report);
        let body = request.to_json().unwrap();

        assert!(body.starts_with("{\n    \"actionType\": \"TAXI_PROFILE\",\n    \"apiVersion\""));
        assert!(body.contains("\"requestData\": {\n        \"alpha\": 2,\n        \"zeta\": 1\n    }"));
        assert!(body.find("\"messageId\"").unwrap() < body.find("\"requestData\"").unwrap());
    }

    #[test]
    fn test_request_date_format() {
        let report = json!({});
        let request = GatewayRequest::new(ActionType::TaxiProfile, &report);
        assert!(
            chrono::NaiveDateTime::parse_from_str(&request.request_date, "%Y-%m-%dT%H:%M:%S%.6f")
                .is_ok()
        );
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "apiVersion": "v2_10_0",
            "messageId": "abc",
            "status": "SUCCESS",
            "responseData": {
                "summaries": [{"driverId": 223, "tripCount": 4}],
                "totalCount": 1
            }
        }"#;
        let response: GatewayResponse<ReportData> = serde_json::from_str(raw).unwrap();
        let data = response.response_data.unwrap();

        assert_eq!(data.records(ActionType::DriverTripSummary).len(), 1);
        assert_eq!(data.any_records()[0]["tripCount"], json!(4));
        assert_eq!(data.extra["totalCount"], json!(1));
        assert_eq!(response.extra["status"], json!("SUCCESS"));
        assert!(data.profiles.is_empty());
    }

    #[test]
    fn test_null_collections_are_empty() {
        let raw = r#"{"profiles":[{"driverId":1}],"transactions":null,"summaries":null,"totalCount":1}"#;
        let data: ReportData = serde_json::from_str(raw).unwrap();

        assert_eq!(data.profiles, vec![json!({ "driverId": 1 })]);
        assert!(data.transactions.is_empty());
        assert!(data.summaries.is_empty());
        assert_eq!(data.total_records(), 1);
        assert_eq!(data.extra["totalCount"], json!(1));
    }

    #[test]
    fn test_empty_report_data() {
        let data: ReportData = serde_json::from_str("{}").unwrap();
        assert!(data.is_empty());
        assert!(data.any_records().is_empty());
    }
}
