//! The task-submission resource seam.

use std::time::Duration;

/// A unit of work handed to an executor resource.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Result of submitting a job for immediate execution.
pub enum SubmitOutcome {
    /// The resource accepted the job and will run it.
    Accepted,
    /// The resource refused the job (saturated or shut down).
    ///
    /// The job rides back to the caller so it can be rerouted instead of
    /// dropped.
    Rejected(Job),
}

/// Result of asking a resource to run a job after a delay.
pub enum ScheduleOutcome {
    /// The resource accepted and returned a cancellable entry.
    Scheduled(Box<dyn ScheduledEntry>),
    /// The resource has no delayed-execution support at all.
    Unsupported(Job),
    /// The resource supports scheduling but refused this request.
    Rejected(Job),
}

/// A cancellable handle to one scheduled entry inside a resource.
pub trait ScheduledEntry: Send + Sync {
    /// Cancels the pending entry so its job never runs.
    ///
    /// Cancelling twice, or after the entry fired, is a no-op.
    fn cancel(&self);
}

/// An arbitrary task-submission resource: anything that can run a callback,
/// and optionally run one after a delay.
///
/// Implementations report refusal through the outcome types rather than by
/// panicking or returning errors; the bridge absorbs every refusal by
/// rerouting to the default dispatcher.
pub trait TaskExecutor: Send + Sync {
    /// Submits a job for immediate execution.
    fn submit(&self, job: Job) -> SubmitOutcome;

    /// Submits a job to run after `delay`.
    ///
    /// Resources without timer support keep the default implementation,
    /// which reports [`ScheduleOutcome::Unsupported`].
    fn schedule(&self, delay: Duration, job: Job) -> ScheduleOutcome {
        let _ = delay;
        ScheduleOutcome::Unsupported(job)
    }

    /// Releases the resource.
    ///
    /// Invoked only by an owning [`DispatchBridge`](super::DispatchBridge)
    /// on its first close; externally owned resources keep the default
    /// no-op.
    fn shutdown(&self) {}
}
