//! Process-wide default dispatcher backing every fallback path.
//!
//! When a resource rejects a job, has no timer support, or is already
//! closed, the bridge reroutes the job here. The dispatcher is lazily
//! initialized on first use and never rejects: one worker thread drains an
//! unbounded queue, and one timer thread watches a deadline min-heap,
//! moving due jobs onto the worker queue.
//!
//! Cancellation is lazy: a cancelled timer entry stays in the heap and is
//! discarded when its deadline pops, so cancelling never reshuffles the
//! heap.

use super::executor::Job;
use crossbeam_queue::SegQueue;
use parking_lot::{Condvar, Mutex};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once, OnceLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Upper bound on a worker park when the queue is momentarily empty.
const WORKER_PARK_TIMEOUT: Duration = Duration::from_millis(100);

/// Handle to one pending fallback timer entry.
pub(crate) struct FallbackTimer {
    cancelled: Arc<AtomicBool>,
}

impl FallbackTimer {
    /// Marks the entry cancelled; the timer thread discards it at deadline.
    pub(crate) fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!("fallback timer cancelled");
        }
    }
}

struct TimerEntry {
    deadline: Instant,
    /// Insertion order; breaks deadline ties deterministically.
    generation: u64,
    cancelled: Arc<AtomicBool>,
    job: Job,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.generation == other.generation
    }
}

impl Eq for TimerEntry {}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Reverse ordering for min-heap (earliest deadline first)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct TimerState {
    heap: BinaryHeap<TimerEntry>,
    next_generation: u64,
}

/// The always-available dispatcher of last resort.
pub(crate) struct DefaultDispatcher {
    queue: SegQueue<Job>,
    queue_lock: Mutex<()>,
    queue_cv: Condvar,
    timers: Mutex<TimerState>,
    timer_cv: Condvar,
}

impl DefaultDispatcher {
    /// The process-wide instance, created and started on first use.
    pub(crate) fn global() -> &'static Self {
        static GLOBAL: OnceLock<DefaultDispatcher> = OnceLock::new();
        static STARTED: Once = Once::new();

        let dispatcher = GLOBAL.get_or_init(Self::new);
        STARTED.call_once(|| {
            thread::Builder::new()
                .name("propsync-fallback-worker".into())
                .spawn(move || dispatcher.worker_loop())
                .expect("spawn fallback worker thread");
            thread::Builder::new()
                .name("propsync-fallback-timer".into())
                .spawn(move || dispatcher.timer_loop())
                .expect("spawn fallback timer thread");
        });
        dispatcher
    }

    fn new() -> Self {
        Self {
            queue: SegQueue::new(),
            queue_lock: Mutex::new(()),
            queue_cv: Condvar::new(),
            timers: Mutex::new(TimerState::default()),
            timer_cv: Condvar::new(),
        }
    }

    /// Enqueues a job for the worker thread. Never rejects.
    pub(crate) fn submit(&self, job: Job) {
        self.queue.push(job);
        let _guard = self.queue_lock.lock();
        self.queue_cv.notify_one();
    }

    /// Registers a job to run at `delay` from now, returning its
    /// cancellation handle.
    pub(crate) fn schedule(&self, delay: Duration, job: Job) -> FallbackTimer {
        let cancelled = Arc::new(AtomicBool::new(false));
        let deadline = Instant::now() + delay;

        let mut timers = self.timers.lock();
        let generation = timers.next_generation;
        timers.next_generation += 1;
        timers.heap.push(TimerEntry {
            deadline,
            generation,
            cancelled: Arc::clone(&cancelled),
            job,
        });
        drop(timers);
        self.timer_cv.notify_one();

        FallbackTimer { cancelled }
    }

    fn worker_loop(&self) {
        loop {
            while let Some(job) = self.queue.pop() {
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!("fallback job panicked");
                }
            }
            let mut guard = self.queue_lock.lock();
            if self.queue.is_empty() {
                self.queue_cv.wait_for(&mut guard, WORKER_PARK_TIMEOUT);
            }
        }
    }

    fn timer_loop(&self) {
        let mut timers = self.timers.lock();
        loop {
            let now = Instant::now();
            while let Some(entry) = timers.heap.peek() {
                if entry.deadline > now {
                    break;
                }
                let entry = timers.heap.pop().expect("peeked timer entry");
                if entry.cancelled.load(Ordering::SeqCst) {
                    continue;
                }
                self.submit(entry.job);
            }
            match timers.heap.peek().map(|e| e.deadline) {
                Some(deadline) => {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    self.timer_cv.wait_for(&mut timers, timeout);
                }
                None => self.timer_cv.wait(&mut timers),
            }
        }
    }
}
