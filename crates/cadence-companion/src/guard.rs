// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rejects a second submission while the first is still running.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use cadence_core::CadenceError;

/// A busy flag for one user action (checkout, connect calendar, ...).
///
/// This is a flag, not a lock: a second caller is turned away instead of
/// waiting its turn.
#[derive(Debug, Default)]
pub struct InFlightGuard {
    busy: AtomicBool,
}

/// Held while the guarded action runs. Dropping it clears the flag.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the ticket is dropped"]
pub struct InFlightTicket<'a> {
    guard: &'a InFlightGuard,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Marks the action as running. `None` if it already is.
    pub fn try_begin(&self) -> Option<InFlightTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightTicket { guard: self })
    }

    /// Runs `action` unless another one is in flight.
    pub async fn run<T, F>(&self, action: F) -> Result<T, CadenceError>
    where
        F: Future<Output = Result<T, CadenceError>>,
    {
        let Some(_ticket) = self.try_begin() else {
            return Err(CadenceError::Validation(
                "a request is already in progress".into(),
            ));
        };
        action.await
    }
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected_until_release() {
        let guard = InFlightGuard::new();
        let ticket = guard.try_begin().unwrap();
        assert!(guard.is_busy());
        assert!(guard.try_begin().is_none());
        drop(ticket);
        assert!(!guard.is_busy());
        assert!(guard.try_begin().is_some());
    }

    #[tokio::test]
    async fn run_rejects_overlapping_calls() {
        let guard = InFlightGuard::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let first = guard.run(async {
            rx.await.ok();
            Ok::<_, CadenceError>("first")
        });
        let second = async {
            tokio::task::yield_now().await;
            let r = guard.run(async { Ok::<_, CadenceError>("second") }).await;
            tx.send(()).ok();
            r
        };

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a.unwrap(), "first");
        assert!(matches!(b, Err(CadenceError::Validation(_))));
        assert!(!guard.is_busy());
    }

    #[tokio::test]
    async fn failed_action_releases_the_flag() {
        let guard = InFlightGuard::new();
        let r: Result<(), _> = guard
            .run(async { Err(CadenceError::Internal("boom".into())) })
            .await;
        assert!(r.is_err());
        assert!(!guard.is_busy());
    }
}
