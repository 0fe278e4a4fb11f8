//! Client error taxonomy and user-facing messages.

use ferry_store::StoreError;
use thiserror::Error;

/// Every way a client call can fail.
///
/// `Clone` so one refresh failure can be handed to every request that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network error: {message}")]
    Network { message: String, timed_out: bool },

    /// The server answered with a non-success status.
    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// The access token could not be renewed; the session has been cleared.
    #[error("session expired: {reason}")]
    SessionExpired { reason: String },

    /// A precondition failed before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// A request or response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Device storage failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl ApiError {
    /// Build a status error, pulling `detail` out of a FastAPI-style
    /// `{"detail": "..."}` body when present.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            detail: parse_detail(body),
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Status { status: 409, .. })
    }

    /// No response, or a 5xx.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Message suitable for showing to an operator or customer as-is.
    #[must_use]
    pub fn friendly_message(&self) -> String {
        const FALLBACK: &str = "Something went wrong. Please try again.";
        match self {
            Self::Network {
                timed_out: true, ..
            } => "Request timed out. Please try again.".into(),
            Self::Network { .. } => "Unable to connect. Please check your internet.".into(),
            Self::SessionExpired { .. } | Self::Status { status: 401, .. } => {
                "Session expired. Please log in again.".into()
            }
            Self::Status { status: 403, .. } => {
                "You do not have permission for this action.".into()
            }
            Self::Status { status: 404, .. } => "Not found. Please check and try again.".into(),
            Self::Status {
                status: 409,
                detail,
            } => detail
                .clone()
                .unwrap_or_else(|| "This action was already performed.".into()),
            Self::Status {
                status: 422,
                detail,
            } => detail
                .clone()
                .unwrap_or_else(|| "Invalid input. Please check your data.".into()),
            Self::Status { status, .. } if *status >= 500 => {
                "Server error. Please try again later.".into()
            }
            Self::Status { detail, .. } => detail.clone().unwrap_or_else(|| FALLBACK.into()),
            Self::Validation(message) => message.clone(),
            Self::Decode(_) | Self::Storage(_) => FALLBACK.into(),
        }
    }
}

fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}
