//! Report request models
//!
//! Every report request embeds [`BaseReportRequest`] (paging, sorting and
//! origin flags) and adds the filters of its own report. Field names follow
//! the gateway's camelCase wire format; unset filters are sent as `null`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use super::action::{DateType, TransactionType};

/// Sort instruction applied by the gateway
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorter {
    pub field: String,
    #[serde(rename = "DESC")]
    pub desc: bool,
}

impl Sorter {
    pub fn new(field: impl Into<String>, desc: bool) -> Self {
        Self {
            field: field.into(),
            desc,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, false)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, true)
    }

    /// Parse `field`, `field:asc` or `field:desc`
    pub fn parse(s: &str) -> Option<Self> {
        let (field, order) = match s.split_once(':') {
            Some((field, order)) => (field.trim(), order.trim().to_lowercase()),
            None => (s.trim(), "asc".to_string()),
        };
        if field.is_empty() {
            return None;
        }
        match order.as_str() {
            "asc" => Some(Self::asc(field)),
            "desc" => Some(Self::desc(field)),
            _ => None,
        }
    }
}

/// Paging, sorting and origin flags shared by all reports
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseReportRequest {
    pub from_staff: bool,
    pub from_portal: bool,
    pub paging_enabled: bool,
    pub page_size: u32,
    pub page_index: u32,
    pub export_enabled: bool,
    pub sorters: Vec<Sorter>,
}

impl Default for BaseReportRequest {
    fn default() -> Self {
        Self {
            from_staff: false,
            from_portal: false,
            paging_enabled: true,
            page_size: 10,
            page_index: 0,
            export_enabled: false,
            sorters: Vec::new(),
        }
    }
}

impl BaseReportRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.paging_enabled && self.page_size == 0 {
            return Err("pageSize must be greater than 0 when paging is enabled".to_string());
        }
        if let Some(sorter) = self.sorters.iter().find(|s| s.field.trim().is_empty()) {
            return Err(format!("sorter has an empty field name: {sorter:?}"));
        }
        Ok(())
    }
}

/// Common behaviour of all report requests
pub trait ReportRequest: Serialize + Send + Sync {
    fn base(&self) -> &BaseReportRequest;

    fn base_mut(&mut self) -> &mut BaseReportRequest;

    /// Client-side checks run before a request is signed and sent
    fn validate(&self) -> Result<(), String> {
        self.base().validate()
    }

    fn sort_by(mut self, field: impl Into<String>, desc: bool) -> Self
    where
        Self: Sized,
    {
        self.base_mut().sorters.push(Sorter::new(field, desc));
        self
    }

    fn page(mut self, page_size: u32, page_index: u32) -> Self
    where
        Self: Sized,
    {
        let base = self.base_mut();
        base.paging_enabled = true;
        base.page_size = page_size;
        base.page_index = page_index;
        self
    }

    fn without_paging(mut self) -> Self
    where
        Self: Sized,
    {
        self.base_mut().paging_enabled = false;
        self
    }
}

macro_rules! impl_report_request {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ReportRequest for $ty {
                fn base(&self) -> &BaseReportRequest {
                    &self.base
                }

                fn base_mut(&mut self) -> &mut BaseReportRequest {
                    &mut self.base
                }
            }
        )*
    };
}

/// People profiles, optionally with driver trip summaries
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleProfileReportRequest {
    #[serde(flatten)]
    pub base: BaseReportRequest,
    pub people_id: Option<i64>,
    pub with_driver_trip_summary: bool,
    pub without_empty_driver_trip_summary: bool,
}

impl PeopleProfileReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn people_id(mut self, id: i64) -> Self {
        self.people_id = Some(id);
        self
    }

    pub fn with_driver_trip_summary(mut self, without_empty: bool) -> Self {
        self.with_driver_trip_summary = true;
        self.without_empty_driver_trip_summary = without_empty;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfileReportRequest {
    #[serde(flatten)]
    pub base: BaseReportRequest,
    pub driver_id: Option<i64>,
    pub with_driver_trip_summary: bool,
    pub without_empty_driver_trip_summary: bool,
}

impl DriverProfileReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver_id(mut self, id: i64) -> Self {
        self.driver_id = Some(id);
        self
    }

    pub fn with_driver_trip_summary(mut self, without_empty: bool) -> Self {
        self.with_driver_trip_summary = true;
        self.without_empty_driver_trip_summary = without_empty;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxiProfileReportRequest {
    #[serde(flatten)]
    pub base: BaseReportRequest,
    pub taxi_id: Option<i64>,
}

impl TaxiProfileReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taxi_id(mut self, id: i64) -> Self {
        self.taxi_id = Some(id);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxiDriverMappingReportRequest {
    #[serde(flatten)]
    pub base: BaseReportRequest,
    pub taxi_id: Option<i64>,
    pub driver_id: Option<i64>,
}

impl TaxiDriverMappingReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taxi_id(mut self, id: i64) -> Self {
        self.taxi_id = Some(id);
        self
    }

    pub fn driver_id(mut self, id: i64) -> Self {
        self.driver_id = Some(id);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleModelProfileReportRequest {
    #[serde(flatten)]
    pub base: BaseReportRequest,
    pub model_id: Option<i64>,
}

impl VehicleModelProfileReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_id(mut self, id: i64) -> Self {
        self.model_id = Some(id);
        self
    }
}

/// Filters over driver trip transactions
///
/// Dates are sent verbatim; the gateway accepts `yyyy-MM-dd`,
/// `yyyy-MM-dd HH:mm:ss` and `yyyy-MM-dd'T'HH:mm:ss.SSSZ`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTripTransactionReportRequest {
    #[serde(flatten)]
    pub base: BaseReportRequest,
    pub transaction_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub trip_id: Option<i64>,
    pub transaction_types: Vec<TransactionType>,
    pub transaction_categories: Vec<String>,
    pub min_amount_in_rupee: Option<f64>,
    pub max_amount_in_rupee: Option<f64>,
    pub min_amount_in_cents: Option<i64>,
    pub max_amount_in_cents: Option<i64>,
    pub description: Option<String>,
    pub date_type: DateType,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub created_by: Option<String>,
    pub with_driver_profile: bool,
}

impl DriverTripTransactionReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transaction_id(mut self, id: i64) -> Self {
        self.transaction_id = Some(id);
        self
    }

    pub fn driver_id(mut self, id: i64) -> Self {
        self.driver_id = Some(id);
        self
    }

    pub fn trip_id(mut self, id: i64) -> Self {
        self.trip_id = Some(id);
        self
    }

    pub fn transaction_type(mut self, kind: TransactionType) -> Self {
        if !self.transaction_types.contains(&kind) {
            self.transaction_types.push(kind);
        }
        self
    }

    pub fn date_range(
        mut self,
        date_type: DateType,
        from: Option<impl Into<String>>,
        to: Option<impl Into<String>>,
    ) -> Self {
        self.date_type = date_type;
        self.from_date = from.map(Into::into);
        self.to_date = to.map(Into::into);
        self
    }

    pub fn amount_in_cents(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_amount_in_cents = min;
        self.max_amount_in_cents = max;
        self
    }

    pub fn with_driver_profile(mut self) -> Self {
        self.with_driver_profile = true;
        self
    }

    fn validate_filters(&self) -> Result<(), String> {
        self.base.validate()?;

        let from = self
            .from_date
            .as_deref()
            .map(|s| parse_zoned_date(s).ok_or_else(|| format!("invalid fromDate: {s}")))
            .transpose()?;
        let to = self
            .to_date
            .as_deref()
            .map(|s| parse_zoned_date(s).ok_or_else(|| format!("invalid toDate: {s}")))
            .transpose()?;
        // Naive dates are in the gateway's local time, so only like is compared with like
        if let (Some((from, from_zoned)), Some((to, to_zoned))) = (from, to) {
            if from_zoned == to_zoned && from > to {
                return Err(format!("fromDate {from} is after toDate {to}"));
            }
        }

        if let (Some(min), Some(max)) = (self.min_amount_in_cents, self.max_amount_in_cents) {
            if min > max {
                return Err(format!("minAmountInCents {min} exceeds maxAmountInCents {max}"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_amount_in_rupee, self.max_amount_in_rupee) {
            if min > max {
                return Err(format!("minAmountInRupee {min} exceeds maxAmountInRupee {max}"));
            }
        }

        Ok(())
    }
}

impl ReportRequest for DriverTripTransactionReportRequest {
    fn base(&self) -> &BaseReportRequest {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseReportRequest {
        &mut self.base
    }

    fn validate(&self) -> Result<(), String> {
        self.validate_filters()
    }
}

/// Trip summary report; same filters as the transaction report, driver required
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverTripSummaryReportRequest(pub DriverTripTransactionReportRequest);

impl DriverTripSummaryReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_driver(driver_id: i64) -> Self {
        Self(DriverTripTransactionReportRequest::new().driver_id(driver_id))
    }
}

impl Deref for DriverTripSummaryReportRequest {
    type Target = DriverTripTransactionReportRequest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DriverTripSummaryReportRequest {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<DriverTripTransactionReportRequest> for DriverTripSummaryReportRequest {
    fn from(filters: DriverTripTransactionReportRequest) -> Self {
        Self(filters)
    }
}

impl ReportRequest for DriverTripSummaryReportRequest {
    fn base(&self) -> &BaseReportRequest {
        &self.0.base
    }

    fn base_mut(&mut self) -> &mut BaseReportRequest {
        &mut self.0.base
    }

    fn validate(&self) -> Result<(), String> {
        if self.0.driver_id.is_none() {
            return Err("driverId is required for driver trip summaries".to_string());
        }
        self.0.validate_filters()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverBlockReasonSummaryReportRequest {
    #[serde(flatten)]
    pub base: BaseReportRequest,
    pub driver_id: Option<i64>,
}

impl DriverBlockReasonSummaryReportRequest {
    pub fn for_driver(driver_id: i64) -> Self {
        Self {
            driver_id: Some(driver_id),
            ..Default::default()
        }
    }
}

impl ReportRequest for DriverBlockReasonSummaryReportRequest {
    fn base(&self) -> &BaseReportRequest {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseReportRequest {
        &mut self.base
    }

    fn validate(&self) -> Result<(), String> {
        if self.driver_id.is_none() {
            return Err("driverId is required for driver block reasons".to_string());
        }
        self.base.validate()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCancelReasonProfileReportRequest {
    #[serde(flatten)]
    pub base: BaseReportRequest,
    pub reason_id: Option<i64>,
}

impl DriverCancelReasonProfileReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reason_id(mut self, id: i64) -> Self {
        self.reason_id = Some(id);
        self
    }
}

/// Credit/debit adjustments; transaction filters plus the taxi mapping flag
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCreditDebitReportRequest {
    #[serde(flatten)]
    pub filters: DriverTripTransactionReportRequest,
    pub with_taxi_driver_mapping: bool,
}

impl DriverCreditDebitReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxi_driver_mapping(mut self) -> Self {
        self.with_taxi_driver_mapping = true;
        self
    }
}

impl Deref for DriverCreditDebitReportRequest {
    type Target = DriverTripTransactionReportRequest;

    fn deref(&self) -> &Self::Target {
        &self.filters
    }
}

impl DerefMut for DriverCreditDebitReportRequest {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.filters
    }
}

impl From<DriverTripTransactionReportRequest> for DriverCreditDebitReportRequest {
    fn from(filters: DriverTripTransactionReportRequest) -> Self {
        Self {
            filters,
            with_taxi_driver_mapping: false,
        }
    }
}

impl ReportRequest for DriverCreditDebitReportRequest {
    fn base(&self) -> &BaseReportRequest {
        &self.filters.base
    }

    fn base_mut(&mut self) -> &mut BaseReportRequest {
        &mut self.filters.base
    }

    fn validate(&self) -> Result<(), String> {
        self.filters.validate_filters()
    }
}

impl_report_request!(
    PeopleProfileReportRequest,
    DriverProfileReportRequest,
    TaxiProfileReportRequest,
    TaxiDriverMappingReportRequest,
    VehicleModelProfileReportRequest,
    DriverCancelReasonProfileReportRequest,
);

/// Parse a report date in any of the formats the gateway accepts
pub fn parse_report_date(s: &str) -> Option<NaiveDateTime> {
    parse_zoned_date(s).map(|(dt, _)| dt)
}

/// Parse a report date, flagging whether it carried an offset (and was
/// converted to UTC)
fn parse_zoned_date(s: &str) -> Option<(NaiveDateTime, bool)> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| (dt, false));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some((dt, false));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some((dt.naive_utc(), true));
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| (dt.naive_utc(), true))
}
