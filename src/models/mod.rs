//! Data models for the Finance Reporting Gateway
//!
//! Enums, report requests and the request/response envelopes.

mod action;
mod envelope;
mod report;

pub use action::{ActionCategory, ActionType, ApiVersion, DateType, HttpHeader, TransactionType};
pub use envelope::{GatewayRequest, GatewayResponse, ReportData};
pub use report::{
    parse_report_date, BaseReportRequest, DriverBlockReasonSummaryReportRequest,
    DriverCancelReasonProfileReportRequest, DriverCreditDebitReportRequest,
    DriverProfileReportRequest, DriverTripSummaryReportRequest,
    DriverTripTransactionReportRequest, PeopleProfileReportRequest, ReportRequest, Sorter,
    TaxiDriverMappingReportRequest, TaxiProfileReportRequest, VehicleModelProfileReportRequest,
};
