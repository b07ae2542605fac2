//! Adapter from a [`TaskExecutor`] resource to the dispatcher contract.

use super::executor::{Job, ScheduleOutcome, SubmitOutcome, TaskExecutor};
use super::fallback::DefaultDispatcher;
use super::handle::TimeoutHandle;
use crate::context::Context;
use core::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Wraps a task-submission resource into a dispatcher.
///
/// Every refusal — a rejected submission, missing timer support, a closed
/// bridge — is absorbed by rerouting the job to the process-wide default
/// dispatcher. No path loses a job or surfaces an error to the caller.
///
/// Two bridges over the same resource instance compare equal and hash
/// identically, so dispatcher deduplication and context-merging logic treat
/// them as one dispatcher.
pub struct DispatchBridge {
    executor: Arc<dyn TaskExecutor>,
    owns_executor: bool,
    closed: AtomicBool,
}

impl DispatchBridge {
    /// Wraps an externally owned resource. [`close`](Self::close) will not
    /// shut it down.
    #[must_use]
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            executor,
            owns_executor: false,
            closed: AtomicBool::new(false),
        }
    }

    /// Wraps a resource whose lifecycle this bridge owns; the first
    /// [`close`](Self::close) shuts it down.
    #[must_use]
    pub fn owning(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            executor,
            owns_executor: true,
            closed: AtomicBool::new(false),
        }
    }

    /// Submits `job` for execution on the underlying resource.
    ///
    /// A rejection (saturated or shut-down resource, or a closed bridge)
    /// reroutes the job to the default dispatcher; the job always runs
    /// somewhere.
    pub fn dispatch(&self, context: &Context, job: Job) {
        if self.closed.load(Ordering::SeqCst) {
            debug!("dispatch on closed bridge, rerouting to default dispatcher");
            DefaultDispatcher::global().submit(job);
            return;
        }
        match self.executor.submit(job) {
            SubmitOutcome::Accepted => {
                trace!(elements = context.len(), "job accepted by executor");
            }
            SubmitOutcome::Rejected(job) => {
                debug!("executor rejected job, rerouting to default dispatcher");
                DefaultDispatcher::global().submit(job);
            }
        }
    }

    /// Arranges for `continuation` to run after `delay`, resuming a
    /// suspended task.
    ///
    /// The returned handle cancels the underlying scheduled entry, so
    /// cancelling the owning task leaks no timer.
    #[must_use]
    pub fn schedule_after_delay(&self, delay: Duration, continuation: Job) -> TimeoutHandle {
        self.schedule(delay, continuation)
    }

    /// Arranges for a plain timeout `callback` to run after `delay`.
    ///
    /// Same contract and fallback policy as
    /// [`schedule_after_delay`](Self::schedule_after_delay).
    #[must_use]
    pub fn invoke_on_timeout(&self, delay: Duration, callback: Job) -> TimeoutHandle {
        self.schedule(delay, callback)
    }

    fn schedule(&self, delay: Duration, job: Job) -> TimeoutHandle {
        if self.closed.load(Ordering::SeqCst) {
            debug!("schedule on closed bridge, using default dispatcher timer");
            return TimeoutHandle::fallback(DefaultDispatcher::global().schedule(delay, job));
        }
        match self.executor.schedule(delay, job) {
            ScheduleOutcome::Scheduled(entry) => TimeoutHandle::resource(entry),
            ScheduleOutcome::Unsupported(job) => {
                debug!("executor has no timer support, using default dispatcher timer");
                TimeoutHandle::fallback(DefaultDispatcher::global().schedule(delay, job))
            }
            ScheduleOutcome::Rejected(job) => {
                debug!("executor rejected scheduled job, using default dispatcher timer");
                TimeoutHandle::fallback(DefaultDispatcher::global().schedule(delay, job))
            }
        }
    }

    /// Closes the bridge.
    ///
    /// One-way: dispatching afterwards takes the same fallback path as a
    /// rejected submission. The underlying resource is shut down only when
    /// the bridge owns it, and only on the first close.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.owns_executor {
            debug!("closing owned executor resource");
            self.executor.shutdown();
        }
    }

    /// True once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl PartialEq for DispatchBridge {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.executor, &other.executor)
    }
}

impl Eq for DispatchBridge {}

impl Hash for DispatchBridge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Identity of the resource, not its submitted work.
        (Arc::as_ptr(&self.executor).cast::<()>() as usize).hash(state);
    }
}

impl fmt::Debug for DispatchBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchBridge")
            .field("executor", &Arc::as_ptr(&self.executor).cast::<()>())
            .field("owns_executor", &self.owns_executor)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct InlineExecutor {
        submitted: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    impl TaskExecutor for InlineExecutor {
        fn submit(&self, job: Job) -> SubmitOutcome {
            self.submitted.fetch_add(1, Ordering::SeqCst);
            job();
            SubmitOutcome::Accepted
        }

        fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn hash_of(bridge: &DispatchBridge) -> u64 {
        let mut hasher = DefaultHasher::new();
        bridge.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn bridges_over_one_resource_are_equal() {
        let executor: Arc<dyn TaskExecutor> = Arc::new(InlineExecutor::default());
        let a = DispatchBridge::new(Arc::clone(&executor));
        let b = DispatchBridge::owning(executor);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn bridges_over_distinct_resources_differ() {
        let a = DispatchBridge::new(Arc::new(InlineExecutor::default()));
        let b = DispatchBridge::new(Arc::new(InlineExecutor::default()));

        assert_ne!(a, b);
    }

    #[test]
    fn equality_survives_close() {
        let executor: Arc<dyn TaskExecutor> = Arc::new(InlineExecutor::default());
        let a = DispatchBridge::new(Arc::clone(&executor));
        let b = DispatchBridge::new(executor);

        a.close();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn close_is_one_way_and_idempotent() {
        let executor = Arc::new(InlineExecutor::default());
        let bridge = DispatchBridge::owning(Arc::clone(&executor) as Arc<dyn TaskExecutor>);

        assert!(!bridge.is_closed());
        bridge.close();
        bridge.close();
        assert!(bridge.is_closed());
        assert_eq!(executor.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_leaves_external_resources_alone() {
        let executor = Arc::new(InlineExecutor::default());
        let bridge = DispatchBridge::new(Arc::clone(&executor) as Arc<dyn TaskExecutor>);

        bridge.close();
        assert_eq!(executor.shutdowns.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn accepted_dispatch_runs_on_the_resource() {
        let executor = Arc::new(InlineExecutor::default());
        let bridge = DispatchBridge::new(Arc::clone(&executor) as Arc<dyn TaskExecutor>);

        let ran = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&ran);
        bridge.dispatch(
            &Context::new(),
            Box::new(move || {
                flag.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(executor.submitted.load(Ordering::SeqCst), 1);
    }
}
