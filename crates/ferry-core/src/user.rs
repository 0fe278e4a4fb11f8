//! Cached profile shapes returned by the two login flows.

use serde::{Deserialize, Serialize};

/// Staff profile returned to the gate-verification app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub route_id: Option<i64>,
    #[serde(default)]
    pub route_name: Option<String>,
}

/// Portal customer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub full_name: String,
}
