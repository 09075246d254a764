//! Gateway enums
//!
//! Action types, API versions and the other enumerated values understood by FRG.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway API version carried in every request envelope
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "v2_10_0")]
    V2_10_0,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V2_10_0 => "v2_10_0",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report category an action belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Registry,
    Transaction,
}

impl ActionCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ActionCategory::Registry => "Registry",
            ActionCategory::Transaction => "Transaction",
        }
    }
}

/// Report actions supported by the gateway
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    // Registry
    PeopleProfile,
    DriverProfile,
    TaxiProfile,
    TaxiDriverMapping,
    VehicleModelProfile,

    // Transaction
    DriverTripTransaction,
    DriverTripSummary,
    DriverRecentTripSummary,
    DriverBlockReason,
    DriverCancelReason,
    DriverCreditDebit,
}

impl ActionType {
    /// Wire name, e.g. `DRIVER_TRIP_SUMMARY`
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::PeopleProfile => "PEOPLE_PROFILE",
            ActionType::DriverProfile => "DRIVER_PROFILE",
            ActionType::TaxiProfile => "TAXI_PROFILE",
            ActionType::TaxiDriverMapping => "TAXI_DRIVER_MAPPING",
            ActionType::VehicleModelProfile => "VEHICLE_MODEL_PROFILE",
            ActionType::DriverTripTransaction => "DRIVER_TRIP_TRANSACTION",
            ActionType::DriverTripSummary => "DRIVER_TRIP_SUMMARY",
            ActionType::DriverRecentTripSummary => "DRIVER_RECENT_TRIP_SUMMARY",
            ActionType::DriverBlockReason => "DRIVER_BLOCK_REASON",
            ActionType::DriverCancelReason => "DRIVER_CANCEL_REASON",
            ActionType::DriverCreditDebit => "DRIVER_CREDIT_DEBIT",
        }
    }

    /// Human readable report name
    pub fn name(&self) -> &'static str {
        match self {
            ActionType::PeopleProfile => "People Profile",
            ActionType::DriverProfile => "Driver Profile",
            ActionType::TaxiProfile => "Taxi Profile",
            ActionType::TaxiDriverMapping => "Taxi Driver Mapping",
            ActionType::VehicleModelProfile => "Vehicle Model Profile",
            ActionType::DriverTripTransaction => "Driver Trip Transaction",
            ActionType::DriverTripSummary => "Driver Trip Summary",
            ActionType::DriverRecentTripSummary => "Driver Recent Trip Summary",
            ActionType::DriverBlockReason => "Driver Block Reason",
            ActionType::DriverCancelReason => "Driver Cancel Reason",
            ActionType::DriverCreditDebit => "Driver Credit/Debit",
        }
    }

    pub fn category(&self) -> ActionCategory {
        match self {
            ActionType::PeopleProfile
            | ActionType::DriverProfile
            | ActionType::TaxiProfile
            | ActionType::TaxiDriverMapping
            | ActionType::VehicleModelProfile => ActionCategory::Registry,
            _ => ActionCategory::Transaction,
        }
    }

    /// Name of the list inside `responseData` that carries this report's rows
    pub fn collection(&self) -> &'static str {
        match self {
            ActionType::PeopleProfile | ActionType::DriverProfile | ActionType::TaxiProfile => {
                "profiles"
            }
            ActionType::TaxiDriverMapping => "mappings",
            ActionType::VehicleModelProfile => "models",
            ActionType::DriverTripTransaction | ActionType::DriverCreditDebit => "transactions",
            ActionType::DriverTripSummary
            | ActionType::DriverRecentTripSummary
            | ActionType::DriverBlockReason => "summaries",
            ActionType::DriverCancelReason => "reasons",
        }
    }

    /// Get all action types
    pub fn all() -> Vec<ActionType> {
        vec![
            ActionType::PeopleProfile,
            ActionType::DriverProfile,
            ActionType::TaxiProfile,
            ActionType::TaxiDriverMapping,
            ActionType::VehicleModelProfile,
            ActionType::DriverTripTransaction,
            ActionType::DriverTripSummary,
            ActionType::DriverRecentTripSummary,
            ActionType::DriverBlockReason,
            ActionType::DriverCancelReason,
            ActionType::DriverCreditDebit,
        ]
    }

    /// Parse from wire name or kebab-case alias (`driver-trip-summary`)
    pub fn from_str(s: &str) -> Option<ActionType> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        Self::all()
            .into_iter()
            .find(|action| action.as_str() == normalized)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which timestamp date filters apply to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateType {
    #[default]
    CreateTime,
    CreateDate,
}

impl DateType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "CREATE_TIME" => Some(DateType::CreateTime),
            "CREATE_DATE" => Some(DateType::CreateDate),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CREDIT" => Some(TransactionType::Credit),
            "DEBIT" => Some(TransactionType::Debit),
            _ => None,
        }
    }
}

/// Custom HTTP headers used by the gateway
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpHeader {
    Hmac,
    Auth,
    Csrf,
}

impl HttpHeader {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpHeader::Hmac => "HMAC",
            HttpHeader::Auth => "AUTH",
            HttpHeader::Csrf => "CSRF",
        }
    }
}
