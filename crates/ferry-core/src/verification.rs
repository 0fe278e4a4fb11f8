//! Verification lookups and check-in results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a verifiable record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
    /// Booked through the customer portal.
    Booking,
    /// Issued at a branch counter.
    Ticket,
}

/// Lifecycle state of a booking or ticket as reported by the server.
///
/// ```text
/// PENDING → CONFIRMED → VERIFIED
///         ↘ CANCELLED
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Verified,
    Cancelled,
    Other(String),
}

impl BookingStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "CONFIRMED" => Self::Confirmed,
            "VERIFIED" => Self::Verified,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Other(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationItemDetail {
    pub item_name: String,
    pub quantity: i64,
    #[serde(default)]
    pub is_vehicle: bool,
    #[serde(default)]
    pub vehicle_no: Option<String>,
}

/// Result of `GET /api/verification/{scan,booking-number,ticket}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub source: VerificationSource,
    pub id: i64,
    /// Booking number or ticket number, depending on `source`.
    pub reference_no: i64,
    pub status: String,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    pub travel_date: NaiveDate,
    #[serde(default)]
    pub departure: Option<String>,
    pub net_amount: f64,
    #[serde(default)]
    pub passenger_count: i64,
    #[serde(default)]
    pub items: Vec<VerificationItemDetail>,
    #[serde(default)]
    pub checked_in_at: Option<String>,
    #[serde(default)]
    pub verification_code: Option<String>,
}

impl VerificationResult {
    #[must_use]
    pub fn status_kind(&self) -> BookingStatus {
        BookingStatus::parse(&self.status)
    }

    #[must_use]
    pub const fn is_checked_in(&self) -> bool {
        self.checked_in_at.is_some()
    }
}

/// Body of `POST /api/verification/check-in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub verification_code: String,
}

/// Response of a successful check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInResult {
    pub message: String,
    pub source: VerificationSource,
    pub id: i64,
    pub reference_no: i64,
    pub checked_in_at: String,
}
