//! Single-flight coordination for token refresh.
//!
//! The first request to see a 401 becomes the leader and performs the refresh.
//! Requests that see a 401 while the leader is working park on the gate and are
//! released with the leader's outcome.

use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::error::ApiError;

type Outcome = Result<String, ApiError>;

#[derive(Debug, Default)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

#[derive(Debug, Default)]
struct GateState {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<Outcome>>,
}

pub(crate) enum Ticket<'a> {
    /// Perform the refresh and settle the gate.
    Leader(LeaderGuard<'a>),
    /// Wait for the leader's outcome.
    Waiter(oneshot::Receiver<Outcome>),
}

impl RefreshGate {
    pub(crate) fn join(&self) -> Ticket<'_> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.in_progress {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Ticket::Waiter(rx)
        } else {
            state.in_progress = true;
            Ticket::Leader(LeaderGuard {
                gate: self,
                settled: false,
            })
        }
    }

    #[cfg(test)]
    pub(crate) fn parked(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters
            .len()
    }

    #[cfg(test)]
    pub(crate) fn in_progress(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_progress
    }

    fn release(&self, outcome: &Outcome) {
        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A dropped receiver means the waiting request was abandoned.
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Held by the leader. Dropping it without [`LeaderGuard::settle`] releases
/// the waiters with an error and reopens the gate.
pub(crate) struct LeaderGuard<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl LeaderGuard<'_> {
    pub(crate) fn settle(mut self, outcome: &Outcome) {
        self.settled = true;
        self.gate.release(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.gate.release(&Err(ApiError::SessionExpired {
                reason: "token refresh was abandoned".into(),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_caller_waits_for_leader() {
        let gate = RefreshGate::default();
        let Ticket::Leader(leader) = gate.join() else {
            panic!("first caller should lead");
        };
        let Ticket::Waiter(rx) = gate.join() else {
            panic!("second caller should wait");
        };
        assert_eq!(gate.parked(), 1);

        leader.settle(&Ok("new-token".into()));

        assert_eq!(rx.await.unwrap(), Ok("new-token".to_string()));
        assert!(!gate.in_progress());
        assert_eq!(gate.parked(), 0);
    }

    #[tokio::test]
    async fn failure_is_broadcast() {
        let gate = RefreshGate::default();
        let Ticket::Leader(leader) = gate.join() else {
            panic!("first caller should lead");
        };
        let receivers: Vec<_> = (0..3)
            .map(|_| match gate.join() {
                Ticket::Waiter(rx) => rx,
                Ticket::Leader(_) => panic!("gate should be busy"),
            })
            .collect();

        let error = ApiError::SessionExpired {
            reason: "invalid token".into(),
        };
        leader.settle(&Err(error.clone()));

        for rx in receivers {
            assert_eq!(rx.await.unwrap(), Err(error.clone()));
        }
    }

    #[tokio::test]
    async fn dropped_leader_reopens_gate() {
        let gate = RefreshGate::default();
        let rx = {
            let Ticket::Leader(_leader) = gate.join() else {
                panic!("first caller should lead");
            };
            let Ticket::Waiter(rx) = gate.join() else {
                panic!("second caller should wait");
            };
            rx
        };

        assert!(matches!(
            rx.await.unwrap(),
            Err(ApiError::SessionExpired { .. })
        ));
        assert!(matches!(gate.join(), Ticket::Leader(_)));
    }
}
