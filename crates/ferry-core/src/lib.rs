//! # ferry-core
//!
//! Wire types and domain records shared by every ferry client crate.
//!
//! - [`AppKind`] profiles (gate checker vs. customer portal)
//! - Session and login/refresh payloads
//! - Verification lookups and check-in results
//! - Customer bookings
//! - Locally persisted records (offline queue entries, daily counter)

pub mod app;
pub mod booking;
pub mod local;
pub mod session;
pub mod user;
pub mod verification;

pub use app::AppKind;
pub use local::{DailyCount, FlushReport, PendingCheckIn};
pub use session::{LoginResponse, RefreshResponse, Session};
pub use user::{CheckerUser, Customer};
pub use verification::{CheckInResult, VerificationResult, VerificationSource};
