//! Customer portal booking endpoints.

use std::sync::Arc;

use ferry_core::booking::{
    BookableItem, Booking, BookingListResponse, Branch, CreateBookingRequest, ScheduleItem,
};

use crate::client::HttpClient;
use crate::error::ApiError;
use crate::transport::ApiRequest;

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct BookingService {
    client: Arc<HttpClient>,
    base_url: String,
}

impl BookingService {
    /// `base_url` is only used to build QR image links.
    #[must_use]
    pub fn new(client: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline.
    pub async fn branches(&self) -> Result<Vec<Branch>, ApiError> {
        self.client.get_json("/api/booking/branches").await
    }

    /// Branches reachable from `from_branch_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline.
    pub async fn to_branches(&self, from_branch_id: i64) -> Result<Vec<Branch>, ApiError> {
        self.client
            .get_json(&format!("/api/booking/to-branches/{from_branch_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline.
    pub async fn items(
        &self,
        from_branch_id: i64,
        to_branch_id: i64,
    ) -> Result<Vec<BookableItem>, ApiError> {
        self.client
            .get_json(&format!("/api/booking/items/{from_branch_id}/{to_branch_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline.
    pub async fn schedules(&self, branch_id: i64) -> Result<Vec<ScheduleItem>, ApiError> {
        self.client
            .get_json(&format!("/api/booking/schedules/{branch_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a booking with no items, otherwise
    /// errors from the pipeline.
    pub async fn create_booking(&self, booking: &CreateBookingRequest) -> Result<Booking, ApiError> {
        if booking.items.is_empty() {
            return Err(ApiError::Validation(
                "A booking needs at least one item".into(),
            ));
        }
        let request = ApiRequest::post("/api/portal/bookings").json(booking)?;
        self.client.execute_json(request).await
    }

    /// One page of the customer's bookings. `page` starts at 1.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline.
    pub async fn bookings(
        &self,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<BookingListResponse, ApiError> {
        let request = ApiRequest::get("/api/portal/bookings")
            .query("page", page.max(1))
            .query("page_size", page_size.unwrap_or(DEFAULT_PAGE_SIZE));
        self.client.execute_json(request).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline.
    pub async fn booking(&self, booking_id: i64) -> Result<Booking, ApiError> {
        self.client
            .get_json(&format!("/api/portal/bookings/{booking_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] from the pipeline.
    pub async fn cancel_booking(&self, booking_id: i64) -> Result<Booking, ApiError> {
        self.client
            .execute_json(ApiRequest::post(format!(
                "/api/portal/bookings/{booking_id}/cancel"
            )))
            .await
    }

    /// Link to the booking's QR image.
    #[must_use]
    pub fn booking_qr_url(&self, booking_id: i64) -> String {
        format!("{}/api/portal/bookings/{booking_id}/qr", self.base_url)
    }
}
