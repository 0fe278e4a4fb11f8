//! Customer portal booking records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: i64,
    pub branch_id: i64,
    pub departure: String,
}

/// An item (passenger class, vehicle type, ...) that can be booked on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookableItem {
    pub id: i64,
    pub name: String,
    pub short_name: String,
    pub is_vehicle: bool,
    pub rate: f64,
    pub levy: f64,
    pub route_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingItemCreate {
    pub item_id: i64,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_no: Option<String>,
}

/// Body of `POST /api/portal/bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub from_branch_id: i64,
    pub to_branch_id: i64,
    pub travel_date: NaiveDate,
    pub departure: String,
    pub items: Vec<BookingItemCreate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingItemRead {
    pub id: i64,
    pub booking_id: i64,
    pub item_id: i64,
    #[serde(default)]
    pub item_name: Option<String>,
    pub rate: f64,
    pub levy: f64,
    pub quantity: i64,
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub is_cancelled: bool,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub booking_no: i64,
    pub status: String,
    #[serde(default)]
    pub verification_code: Option<String>,
    pub branch_id: i64,
    #[serde(default)]
    pub branch_name: Option<String>,
    pub route_id: i64,
    #[serde(default)]
    pub route_name: Option<String>,
    pub travel_date: NaiveDate,
    #[serde(default)]
    pub departure: Option<String>,
    pub amount: f64,
    pub discount: f64,
    pub net_amount: f64,
    pub portal_user_id: i64,
    #[serde(default)]
    pub is_cancelled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<BookingItemRead>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingListItemSummary {
    pub item_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingListItem {
    pub id: i64,
    pub booking_no: i64,
    pub status: String,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub route_name: Option<String>,
    pub travel_date: NaiveDate,
    #[serde(default)]
    pub departure: Option<String>,
    pub net_amount: f64,
    #[serde(default)]
    pub is_cancelled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<BookingListItemSummary>>,
}

/// One page of `GET /api/portal/bookings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingListResponse {
    pub data: Vec<BookingListItem>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}
