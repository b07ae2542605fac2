//! Cancellable handles for delayed jobs.

use super::executor::ScheduledEntry;
use super::fallback::FallbackTimer;
use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cancellable handle to one pending delayed job, whether it lives in the
/// underlying resource or in the default dispatcher's timer.
///
/// Holding the handle is optional; dropping it does not cancel the job.
pub struct TimeoutHandle {
    repr: HandleRepr,
    cancelled: AtomicBool,
}

enum HandleRepr {
    /// The resource scheduled the job itself.
    Resource(Box<dyn ScheduledEntry>),
    /// The job went to the default dispatcher's timer.
    Fallback(FallbackTimer),
}

impl TimeoutHandle {
    pub(crate) fn resource(entry: Box<dyn ScheduledEntry>) -> Self {
        Self {
            repr: HandleRepr::Resource(entry),
            cancelled: AtomicBool::new(false),
        }
    }

    pub(crate) fn fallback(timer: FallbackTimer) -> Self {
        Self {
            repr: HandleRepr::Fallback(timer),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Cancels the pending job so it never runs.
    ///
    /// Cancellation reaches the underlying scheduled entry synchronously,
    /// so no timer is leaked. Cancelling twice, or after the job already
    /// fired, is a no-op.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        match &self.repr {
            HandleRepr::Resource(entry) => entry.cancel(),
            HandleRepr::Fallback(timer) => timer.cancel(),
        }
    }

    /// True once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for TimeoutHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self.repr {
            HandleRepr::Resource(_) => "resource",
            HandleRepr::Fallback(_) => "fallback",
        };
        f.debug_struct("TimeoutHandle")
            .field("repr", &repr)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
