//! Executor adaptation: dispatch bridging, delayed scheduling, fallback.
//!
//! A scheduler needs a dispatcher; hosts have arbitrary task-submission
//! resources (thread pools, bounded queues, test stubs). [`DispatchBridge`]
//! adapts any [`TaskExecutor`] into the dispatcher contract:
//!
//! - [`DispatchBridge::dispatch`] submits a job, rerouting to the
//!   process-wide default dispatcher when the resource rejects it — a
//!   rejected submission never loses the job and never surfaces an error
//! - [`DispatchBridge::schedule_after_delay`] and
//!   [`DispatchBridge::invoke_on_timeout`] use the resource's delayed
//!   scheduling when it has any, falling back to the default dispatcher's
//!   own timer otherwise, and return a cancellable [`TimeoutHandle`]
//! - [`DispatchBridge::close`] shuts the resource down only when the bridge
//!   owns its lifecycle
//!
//! The resource seam is status-based, not panic-based: rejection variants
//! of [`SubmitOutcome`] and [`ScheduleOutcome`] hand the job back so the
//! bridge can reroute it.

pub mod bridge;
pub mod executor;
pub(crate) mod fallback;
pub mod handle;

pub use bridge::DispatchBridge;
pub use executor::{Job, ScheduleOutcome, ScheduledEntry, SubmitOutcome, TaskExecutor};
pub use handle::TimeoutHandle;
