//! Cooperative cancellation for long-running searches.

use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared flag a search polls once per step.
///
/// Clones observe the same flag, so a caller keeps one clone and hands the
/// other to the search (possibly on another thread).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    /// Polls left before the token cancels itself.
    #[cfg(test)]
    polls_left: Option<Arc<AtomicUsize>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token for callers that never cancel.
    pub fn never() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.count_poll();
        self.cancelled.load(Ordering::Acquire)
    }

    /// A token that reports cancellation from its `polls + 1`th poll on.
    #[cfg(test)]
    pub(crate) fn cancelled_after(polls: usize) -> Self {
        Self {
            polls_left: Some(Arc::new(AtomicUsize::new(polls))),
            ..Self::default()
        }
    }

    #[cfg(test)]
    fn count_poll(&self) {
        if let Some(polls) = &self.polls_left {
            let exhausted = polls
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_err();
            if exhausted {
                self.cancel();
            }
        }
    }

    #[cfg(not(test))]
    fn count_poll(&self) {}

    /// Returns a guard that cancels this token when dropped, unless disarmed.
    pub fn drop_guard(&self) -> CancelOnDrop {
        CancelOnDrop {
            token: Some(self.clone()),
        }
    }
}

/// Cancels its token on drop.
///
/// Used to stop a background search when the task awaiting it goes away.
#[derive(Debug)]
pub struct CancelOnDrop {
    token: Option<CancelToken>,
}

impl CancelOnDrop {
    /// Drops the guard without cancelling.
    pub fn disarm(mut self) {
        self.token = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
