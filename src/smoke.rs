//! Smoke run
//!
//! Fires a handful of representative reports at the gateway concurrently to
//! check the endpoint, the secret and the envelope format in one go.

use futures::future::{join_all, BoxFuture, FutureExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::gateway::GatewayClient;
use crate::models::{
    ActionType, DateType, DriverProfileReportRequest, DriverTripSummaryReportRequest,
    DriverTripTransactionReportRequest, ReportRequest,
};
use crate::utils::Timer;

/// Driver used when none is given
pub const DEFAULT_SMOKE_DRIVER_ID: i64 = 223;

/// Result of one smoke report
#[derive(Clone, Debug, Serialize)]
pub struct SmokeOutcome {
    pub action: ActionType,
    pub records: usize,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl SmokeOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run the smoke reports for `driver_id` concurrently
pub async fn run_smoke(client: &GatewayClient, driver_id: i64) -> Vec<SmokeOutcome> {
    info!("Running smoke reports for driver {}", driver_id);

    let reports: Vec<BoxFuture<'_, SmokeOutcome>> = vec![
        timed_fetch(
            client,
            ActionType::DriverTripTransaction,
            sample_transaction_request(driver_id),
        )
        .boxed(),
        timed_fetch(
            client,
            ActionType::DriverTripSummary,
            DriverTripSummaryReportRequest::for_driver(driver_id),
        )
        .boxed(),
        timed_fetch(
            client,
            ActionType::DriverProfile,
            DriverProfileReportRequest::new().driver_id(driver_id),
        )
        .boxed(),
    ];

    join_all(reports).await
}

/// A year of a driver's transactions with their profile, newest first
pub fn sample_transaction_request(driver_id: i64) -> DriverTripTransactionReportRequest {
    DriverTripTransactionReportRequest::new()
        .driver_id(driver_id)
        .date_range(DateType::CreateTime, Some("2019-01-01"), Some("2019-12-31"))
        .with_driver_profile()
        .sort_by("transactionId", true)
}

async fn timed_fetch<R: ReportRequest>(
    client: &GatewayClient,
    action: ActionType,
    request: R,
) -> SmokeOutcome {
    let timer = Timer::start(action.as_str());
    let result = client.fetch(action, &request).await;
    let duration_ms = timer.stop().as_millis() as u64;

    match result {
        Ok(data) => SmokeOutcome {
            action,
            records: data.total_records(),
            duration_ms,
            error: None,
        },
        Err(e) => {
            warn!("{} failed: {}", action, e);
            SmokeOutcome {
                action,
                records: 0,
                duration_ms,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sorter;

    #[test]
    fn test_sample_transaction_request() {
        let request = sample_transaction_request(223);

        assert_eq!(request.driver_id, Some(223));
        assert_eq!(request.from_date.as_deref(), Some("2019-01-01"));
        assert_eq!(request.to_date.as_deref(), Some("2019-12-31"));
        assert!(request.with_driver_profile);
        assert_eq!(request.base.sorters, vec![Sorter::desc("transactionId")]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_outcome_success() {
        let outcome = SmokeOutcome {
            action: ActionType::DriverProfile,
            records: 0,
            duration_ms: 1,
            error: None,
        };
        assert!(outcome.is_success());
    }
}
