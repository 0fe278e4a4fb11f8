//! Check-ins that survive a lost connection.
//!
//! A check-in that fails with a network error is appended to the queue kept in
//! [`DeviceStorage`] and replayed by [`OfflineQueue::flush`]. An entry that
//! keeps failing is dropped once its retry count reaches the ceiling.
//! Enqueue and flush hold the same lock, so a flush never races another flush
//! and an entry enqueued mid-flush is not overwritten.

use ferry_core::{CheckInResult, FlushReport, PendingCheckIn};
use ferry_store::DeviceStorage;
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::verification::VerificationService;

/// Default ceiling for per-entry replay attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// What became of a check-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    Verified(CheckInResult),
    /// The server answered 409: this code was checked in earlier.
    AlreadyVerified { detail: Option<String> },
    /// No connection; the code was queued for the next flush.
    SavedOffline,
}

#[derive(Debug)]
pub struct OfflineQueue {
    verification: VerificationService,
    storage: DeviceStorage,
    max_retries: u32,
    lock: Mutex<()>,
}

impl OfflineQueue {
    #[must_use]
    pub fn new(verification: VerificationService, storage: DeviceStorage) -> Self {
        Self::with_max_retries(verification, storage, DEFAULT_MAX_RETRIES)
    }

    #[must_use]
    pub fn with_max_retries(
        verification: VerificationService,
        storage: DeviceStorage,
        max_retries: u32,
    ) -> Self {
        Self {
            verification,
            storage,
            max_retries,
            lock: Mutex::new(()),
        }
    }

    /// Check in `verification_code`, queueing it if the server is unreachable.
    ///
    /// A successful check-in bumps today's counter.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] for failures other than a network error or a
    /// 409, and storage errors from queueing.
    pub async fn check_in(&self, verification_code: &str) -> Result<CheckInOutcome, ApiError> {
        match self.verification.check_in(verification_code).await {
            Ok(result) => {
                self.bump_counter();
                Ok(CheckInOutcome::Verified(result))
            }
            Err(error) if error.is_conflict() => Ok(CheckInOutcome::AlreadyVerified {
                detail: error.detail().map(str::to_string),
            }),
            Err(error) if error.is_network() => {
                tracing::info!(%error, "check-in saved offline");
                self.enqueue(verification_code).await?;
                Ok(CheckInOutcome::SavedOffline)
            }
            Err(error) => Err(error),
        }
    }

    /// Append a code to the queue with a zero retry count.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the queue cannot be read or written.
    pub async fn enqueue(&self, verification_code: &str) -> Result<(), ApiError> {
        let _guard = self.lock.lock().await;
        let mut queue = self.storage.offline_queue()?;
        queue.push(PendingCheckIn::new(verification_code));
        self.storage.set_offline_queue(&queue)?;
        Ok(())
    }

    /// Number of check-ins waiting for a flush.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the queue cannot be read.
    pub fn pending_count(&self) -> Result<usize, ApiError> {
        Ok(self.storage.offline_queue()?.len())
    }

    /// Replay every queued check-in once.
    ///
    /// Entries that fail for any reason have their retry count bumped and stay
    /// queued until the count reaches the ceiling, when they are dropped and
    /// counted as failed. An empty queue is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the queue cannot be read or written.
    pub async fn flush(&self) -> Result<FlushReport, ApiError> {
        let _guard = self.lock.lock().await;
        let queue = self.storage.offline_queue()?;
        if queue.is_empty() {
            return Ok(FlushReport::default());
        }

        let mut report = FlushReport::default();
        let mut remaining = Vec::with_capacity(queue.len());
        for mut entry in queue {
            match self.verification.check_in(&entry.verification_code).await {
                Ok(_) => {
                    report.succeeded += 1;
                    self.bump_counter();
                }
                Err(error) => {
                    entry.retry_count += 1;
                    if entry.retry_count < self.max_retries {
                        tracing::debug!(
                            code = %entry.verification_code,
                            retry_count = entry.retry_count,
                            %error,
                            "queued check-in failed; keeping",
                        );
                        remaining.push(entry);
                    } else {
                        tracing::warn!(
                            code = %entry.verification_code,
                            %error,
                            "queued check-in dropped after too many attempts",
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        self.storage.set_offline_queue(&remaining)?;
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            remaining = remaining.len(),
            "offline queue flushed",
        );
        Ok(report)
    }

    fn bump_counter(&self) {
        if let Err(error) = self.storage.increment_today_count() {
            tracing::warn!(%error, "could not update today's check-in count");
        }
    }
}
