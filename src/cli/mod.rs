//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use frg_client::config::ConfigOverrides;
use frg_client::models::{
    ActionType, DateType, DriverBlockReasonSummaryReportRequest,
    DriverCancelReasonProfileReportRequest, DriverCreditDebitReportRequest,
    DriverProfileReportRequest, DriverTripSummaryReportRequest,
    DriverTripTransactionReportRequest, PeopleProfileReportRequest, ReportRequest, Sorter,
    TaxiDriverMappingReportRequest, TaxiProfileReportRequest, TransactionType,
    VehicleModelProfileReportRequest,
};
use frg_client::smoke::DEFAULT_SMOKE_DRIVER_ID;

/// PickMe Finance Reporting Gateway client
#[derive(Parser, Debug)]
#[command(name = "frg-client")]
#[command(version)]
#[command(about = "Run signed report requests against the Finance Reporting Gateway")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment profile (uat, staging, production)
    #[arg(short, long = "env", global = true)]
    pub environment: Option<String>,

    /// Service endpoint URL, overrides the profile
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// HMAC secret used to sign request bodies
    #[arg(long, global = true)]
    pub secret: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Value for the AUTH header
    #[arg(long, global = true)]
    pub auth_token: Option<String>,

    /// Value for the CSRF header
    #[arg(long, global = true)]
    pub csrf_token: Option<String>,
}

impl Args {
    /// Configuration values given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            environment: self.environment.clone(),
            endpoint: self.endpoint.clone(),
            hmac_secret: self.secret.clone(),
            auth_token: self.auth_token.clone(),
            csrf_token: self.csrf_token.clone(),
            timeout_secs: self.timeout,
            config_file: self.config.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one report
    Fetch(FetchArgs),

    /// Run the sample reports concurrently and report pass/fail
    Smoke(SmokeArgs),

    /// List report actions
    List,

    /// Print the HMAC signature of a request body
    Sign(SignArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Report to run (e.g. driver-trip-summary, TAXI_PROFILE)
    #[arg(value_parser = parse_action)]
    pub report: ActionType,

    /// Primary id of the report (people, driver, taxi, model, reason or transaction)
    #[arg(long)]
    pub id: Option<i64>,

    /// Driver id
    #[arg(long)]
    pub driver_id: Option<i64>,

    /// Trip id
    #[arg(long)]
    pub trip_id: Option<i64>,

    /// Start date (yyyy-MM-dd, yyyy-MM-dd HH:mm:ss or ISO 8601)
    #[arg(long)]
    pub from_date: Option<String>,

    /// End date
    #[arg(long)]
    pub to_date: Option<String>,

    /// Date the range applies to (create-time, create-date)
    #[arg(long, value_parser = parse_date_type)]
    pub date_type: Option<DateType>,

    /// Minimum amount in cents
    #[arg(long)]
    pub min_cents: Option<i64>,

    /// Maximum amount in cents
    #[arg(long)]
    pub max_cents: Option<i64>,

    /// Transaction type filter (credit, debit); repeatable
    #[arg(long = "transaction-type", value_parser = parse_transaction_type)]
    pub transaction_types: Vec<TransactionType>,

    /// Page size
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Page index (0-based)
    #[arg(long)]
    pub page_index: Option<u32>,

    /// Disable paging
    #[arg(long, conflicts_with_all = ["page_size", "page_index"])]
    pub no_paging: bool,

    /// Sort order as field[:asc|desc]; repeatable
    #[arg(long = "sort", value_parser = parse_sorter)]
    pub sorters: Vec<Sorter>,

    /// Include driver trip summaries in profile reports
    #[arg(long)]
    pub with_summary: bool,

    /// Skip drivers whose trip summary is empty
    #[arg(long)]
    pub without_empty_summary: bool,

    /// Include driver profiles in transaction reports
    #[arg(long)]
    pub with_profile: bool,

    /// Include taxi driver mappings in credit/debit reports
    #[arg(long)]
    pub with_mapping: bool,

    /// Output format (table, json, json-pretty, csv)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Print the signed request instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Ask the gateway to validate the request without running it
    #[arg(long, conflicts_with = "dry_run")]
    pub validate_only: bool,
}

impl FetchArgs {
    /// Apply paging and sorting to any request
    pub fn apply_base<R: ReportRequest>(&self, mut request: R) -> R {
        let base = request.base_mut();
        if self.no_paging {
            base.paging_enabled = false;
        }
        if let Some(size) = self.page_size {
            base.page_size = size;
        }
        if let Some(index) = self.page_index {
            base.page_index = index;
        }
        base.sorters.extend(self.sorters.iter().cloned());
        request
    }

    /// Transaction filters shared by the transaction, summary and credit/debit reports
    pub fn transaction_filters(&self) -> DriverTripTransactionReportRequest {
        let mut request = DriverTripTransactionReportRequest::new();
        request.transaction_id = self.id.filter(|_| {
            matches!(
                self.report,
                ActionType::DriverTripTransaction | ActionType::DriverCreditDebit
            )
        });
        request.driver_id = self.driver_id;
        request.trip_id = self.trip_id;
        for kind in &self.transaction_types {
            request = request.transaction_type(*kind);
        }
        request = request
            .date_range(
                self.date_type.unwrap_or_default(),
                self.from_date.clone(),
                self.to_date.clone(),
            )
            .amount_in_cents(self.min_cents, self.max_cents);
        if self.with_profile {
            request = request.with_driver_profile();
        }
        self.apply_base(request)
    }

    /// Driver id for reports keyed on a driver, from --driver-id or --id
    fn driver(&self) -> Option<i64> {
        self.driver_id.or(self.id)
    }

    /// Reports whose `--id` is the driver id
    fn id_is_driver(&self) -> bool {
        matches!(
            self.report,
            ActionType::DriverProfile
                | ActionType::DriverTripSummary
                | ActionType::DriverRecentTripSummary
                | ActionType::DriverBlockReason
        )
    }

    /// Reject filters the chosen report does not understand
    pub fn check_filters(&self) -> Result<()> {
        if self.driver_id.is_some() {
            let has_driver = matches!(
                self.report,
                ActionType::DriverProfile
                    | ActionType::TaxiDriverMapping
                    | ActionType::DriverTripTransaction
                    | ActionType::DriverTripSummary
                    | ActionType::DriverRecentTripSummary
                    | ActionType::DriverBlockReason
                    | ActionType::DriverCreditDebit
            );
            if !has_driver {
                bail!("{} does not accept --driver-id", self.report);
            }
            if self.id.is_some() && self.id_is_driver() {
                bail!(
                    "--id and --driver-id both set the driver for {}; pass only one",
                    self.report
                );
            }
        }

        let transaction_report = matches!(
            self.report,
            ActionType::DriverTripTransaction
                | ActionType::DriverTripSummary
                | ActionType::DriverRecentTripSummary
                | ActionType::DriverCreditDebit
        );
        let uses_transaction_filters = self.trip_id.is_some()
            || self.from_date.is_some()
            || self.to_date.is_some()
            || self.date_type.is_some()
            || self.min_cents.is_some()
            || self.max_cents.is_some()
            || !self.transaction_types.is_empty()
            || self.with_profile;
        if uses_transaction_filters && !transaction_report {
            bail!(
                "{} does not accept transaction filters (trip, date, amount, type, profile)",
                self.report
            );
        }

        if (self.with_summary || self.without_empty_summary)
            && !matches!(
                self.report,
                ActionType::PeopleProfile | ActionType::DriverProfile
            )
        {
            bail!("--with-summary only applies to people and driver profiles");
        }
        if self.with_mapping && self.report != ActionType::DriverCreditDebit {
            bail!("--with-mapping only applies to {}", ActionType::DriverCreditDebit);
        }
        Ok(())
    }

    pub fn people_profile(&self) -> PeopleProfileReportRequest {
        let mut request = PeopleProfileReportRequest::new();
        request.people_id = self.id;
        if self.with_summary || self.without_empty_summary {
            request = request.with_driver_trip_summary(self.without_empty_summary);
        }
        self.apply_base(request)
    }

    pub fn driver_profile(&self) -> DriverProfileReportRequest {
        let mut request = DriverProfileReportRequest::new();
        request.driver_id = self.driver();
        if self.with_summary || self.without_empty_summary {
            request = request.with_driver_trip_summary(self.without_empty_summary);
        }
        self.apply_base(request)
    }

    pub fn taxi_profile(&self) -> TaxiProfileReportRequest {
        let mut request = TaxiProfileReportRequest::new();
        request.taxi_id = self.id;
        self.apply_base(request)
    }

    pub fn taxi_driver_mapping(&self) -> TaxiDriverMappingReportRequest {
        let mut request = TaxiDriverMappingReportRequest::new();
        request.taxi_id = self.id;
        request.driver_id = self.driver_id;
        self.apply_base(request)
    }

    pub fn vehicle_model_profile(&self) -> VehicleModelProfileReportRequest {
        let mut request = VehicleModelProfileReportRequest::new();
        request.model_id = self.id;
        self.apply_base(request)
    }

    pub fn trip_summary(&self) -> DriverTripSummaryReportRequest {
        let mut filters = self.transaction_filters();
        filters.driver_id = self.driver();
        filters.into()
    }

    /// Recent summaries take the trip filters without requiring a driver
    pub fn recent_trip_summary(&self) -> DriverTripTransactionReportRequest {
        let mut filters = self.transaction_filters();
        filters.driver_id = self.driver();
        filters
    }

    pub fn block_reason(&self) -> DriverBlockReasonSummaryReportRequest {
        self.apply_base(DriverBlockReasonSummaryReportRequest {
            driver_id: self.driver(),
            ..Default::default()
        })
    }

    pub fn cancel_reason(&self) -> DriverCancelReasonProfileReportRequest {
        let mut request = DriverCancelReasonProfileReportRequest::new();
        request.reason_id = self.id;
        self.apply_base(request)
    }

    pub fn credit_debit(&self) -> DriverCreditDebitReportRequest {
        let mut request = DriverCreditDebitReportRequest::from(self.transaction_filters());
        if self.with_mapping {
            request = request.with_taxi_driver_mapping();
        }
        request
    }
}

/// Arguments for smoke command
#[derive(Parser, Debug)]
pub struct SmokeArgs {
    /// Driver to run the sample reports for
    #[arg(long, default_value_t = DEFAULT_SMOKE_DRIVER_ID)]
    pub driver_id: i64,

    /// Output format (table, json, json-pretty)
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Arguments for sign command
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// File holding the exact body to sign
    #[arg(short, long, conflicts_with = "body")]
    pub file: Option<PathBuf>,

    /// Body to sign; stdin is read when neither --file nor --body is given
    #[arg(short, long)]
    pub body: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "frg-client.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved configuration
    Show {
        /// Also show FRG_* environment variables
        #[arg(long)]
        env_vars: bool,
    },

    /// Describe the supported environment variables
    Env,
}

fn parse_action(s: &str) -> Result<ActionType, String> {
    ActionType::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = ActionType::all().iter().map(|a| a.as_str()).collect();
        format!("unknown report '{s}', expected one of: {}", known.join(", "))
    })
}

fn parse_date_type(s: &str) -> Result<DateType, String> {
    DateType::from_str(s).ok_or_else(|| format!("unknown date type '{s}'"))
}

fn parse_transaction_type(s: &str) -> Result<TransactionType, String> {
    TransactionType::from_str(s).ok_or_else(|| format!("unknown transaction type '{s}'"))
}

fn parse_sorter(s: &str) -> Result<Sorter, String> {
    Sorter::parse(s).ok_or_else(|| format!("invalid sort '{s}', expected field[:asc|desc]"))
}
