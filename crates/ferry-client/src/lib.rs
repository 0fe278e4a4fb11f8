//! # ferry-client
//!
//! The request pipeline shared by the ferry apps, and the services built on it.
//!
//! - [`HttpClient`]: bearer injection, transient-failure retry with exponential
//!   backoff, and single-flight token refresh with replay on 401
//! - [`AuthService`], [`VerificationService`], [`BookingService`]: typed
//!   wrappers around the REST endpoints
//! - [`OfflineQueue`]: check-ins that hit a network failure are persisted and
//!   replayed on [`OfflineQueue::flush`]
//!
//! Network I/O goes through the [`Transport`] trait; [`ReqwestTransport`] is the
//! production implementation.

pub mod auth;
pub mod booking;
mod client;
mod error;
pub mod offline;
mod refresh;
mod retry;
mod transport;
pub mod verification;

pub use auth::AuthService;
pub use booking::BookingService;
pub use client::{AuthFailureHandler, HttpClient, HttpClientBuilder, NoopAuthFailureHandler};
pub use error::ApiError;
pub use offline::{CheckInOutcome, OfflineQueue};
pub use retry::RetryPolicy;
pub use transport::{
    ApiRequest, ApiResponse, Method, ReqwestTransport, Transport, TransportError,
};
pub use verification::VerificationService;
