//! Gate verification endpoints.

use std::sync::Arc;

use ferry_core::verification::CheckInRequest;
use ferry_core::{CheckInResult, VerificationResult};

use crate::client::HttpClient;
use crate::error::ApiError;
use crate::transport::ApiRequest;

const SCAN: &str = "/api/verification/scan";
const CHECK_IN: &str = "/api/verification/check-in";
const BOOKING_NUMBER: &str = "/api/verification/booking-number";
const TICKET: &str = "/api/verification/ticket";

#[derive(Debug, Clone)]
pub struct VerificationService {
    client: Arc<HttpClient>,
}

impl VerificationService {
    #[must_use]
    pub const fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Resolve a scanned QR payload (`code.signature`) to its booking or ticket.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline; a tampered payload is a 400.
    pub async fn scan(&self, payload: &str) -> Result<VerificationResult, ApiError> {
        self.client
            .execute_json(ApiRequest::get(SCAN).query("payload", payload))
            .await
    }

    /// Mark a verification code as checked in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline; an already checked-in code is a
    /// 409. See [`crate::OfflineQueue::check_in`] for the offline-aware variant.
    pub async fn check_in(&self, verification_code: &str) -> Result<CheckInResult, ApiError> {
        let request = ApiRequest::post(CHECK_IN).json(&CheckInRequest {
            verification_code: verification_code.to_string(),
        })?;
        self.client.execute_json(request).await
    }

    /// Look up a portal booking by number, optionally scoped to a branch.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline.
    pub async fn lookup_booking(
        &self,
        booking_no: i64,
        branch_id: Option<i64>,
    ) -> Result<VerificationResult, ApiError> {
        let mut request = ApiRequest::get(BOOKING_NUMBER).query("booking_no", booking_no);
        if let Some(branch_id) = branch_id {
            request = request.query("branch_id", branch_id);
        }
        self.client.execute_json(request).await
    }

    /// Look up a counter ticket. Ticket numbers are only unique per branch, so
    /// the branch is required.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything when
    /// `branch_id` is missing, otherwise errors from the pipeline.
    pub async fn lookup_ticket(
        &self,
        ticket_no: i64,
        branch_id: Option<i64>,
    ) -> Result<VerificationResult, ApiError> {
        let Some(branch_id) = branch_id else {
            return Err(ApiError::Validation(
                "Branch ID required for ticket lookup".into(),
            ));
        };
        let request = ApiRequest::get(TICKET)
            .query("ticket_no", ticket_no)
            .query("branch_id", branch_id);
        self.client.execute_json(request).await
    }
}
