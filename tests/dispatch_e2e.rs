//! End-to-end dispatch bridging: rejection fallback, delayed execution,
//! cancellation, and close semantics against real threads and real time.

mod common;

use common::{init_test_logging, WAIT_CEILING};
use propsync::{
    Context, DispatchBridge, Job, ScheduleOutcome, ScheduledEntry, SubmitOutcome, TaskExecutor,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

/// Resource that refuses every submission, as a saturated or shut-down
/// pool would.
struct RejectingExecutor {
    rejections: AtomicUsize,
}

impl RejectingExecutor {
    fn new() -> Self {
        Self {
            rejections: AtomicUsize::new(0),
        }
    }
}

impl TaskExecutor for RejectingExecutor {
    fn submit(&self, job: Job) -> SubmitOutcome {
        self.rejections.fetch_add(1, Ordering::SeqCst);
        SubmitOutcome::Rejected(job)
    }
}

/// Resource that runs submissions inline on the calling thread.
struct InlineExecutor {
    accepted: AtomicUsize,
}

impl InlineExecutor {
    fn new() -> Self {
        Self {
            accepted: AtomicUsize::new(0),
        }
    }
}

impl TaskExecutor for InlineExecutor {
    fn submit(&self, job: Job) -> SubmitOutcome {
        self.accepted.fetch_add(1, Ordering::SeqCst);
        job();
        SubmitOutcome::Accepted
    }
}

struct ThreadTimerEntry {
    cancelled: Arc<AtomicBool>,
}

impl ScheduledEntry for ThreadTimerEntry {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Resource with its own delayed scheduling: one thread per entry, firing
/// unless the entry was cancelled first.
struct ThreadTimerExecutor;

impl TaskExecutor for ThreadTimerExecutor {
    fn submit(&self, job: Job) -> SubmitOutcome {
        job();
        SubmitOutcome::Accepted
    }

    fn schedule(&self, delay: Duration, job: Job) -> ScheduleOutcome {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        thread::spawn(move || {
            thread::sleep(delay);
            if !flag.load(Ordering::SeqCst) {
                job();
            }
        });
        ScheduleOutcome::Scheduled(Box::new(ThreadTimerEntry { cancelled }))
    }
}

/// Resource with timer support that refuses every schedule request.
struct SaturatedTimerExecutor;

impl TaskExecutor for SaturatedTimerExecutor {
    fn submit(&self, job: Job) -> SubmitOutcome {
        SubmitOutcome::Rejected(job)
    }

    fn schedule(&self, _delay: Duration, job: Job) -> ScheduleOutcome {
        ScheduleOutcome::Rejected(job)
    }
}

#[test]
fn rejected_dispatch_still_executes_via_fallback() {
    init_test_logging();
    let executor = Arc::new(RejectingExecutor::new());
    let bridge = DispatchBridge::new(Arc::clone(&executor) as Arc<dyn TaskExecutor>);

    let (tx, rx) = mpsc::channel();
    bridge.dispatch(
        &Context::new(),
        Box::new(move || {
            tx.send(()).expect("receiver alive");
        }),
    );

    rx.recv_timeout(WAIT_CEILING)
        .expect("fallback never ran the rejected job");
    assert_eq!(executor.rejections.load(Ordering::SeqCst), 1);
}

#[test]
fn schedule_without_timer_support_falls_back_with_full_delay() {
    init_test_logging();
    let bridge = DispatchBridge::new(Arc::new(RejectingExecutor::new()));
    let delay = Duration::from_millis(150);

    let (tx, rx) = mpsc::channel();
    let requested_at = Instant::now();
    let _handle = bridge.schedule_after_delay(
        delay,
        Box::new(move || {
            tx.send(Instant::now()).expect("receiver alive");
        }),
    );

    let fired_at = rx
        .recv_timeout(WAIT_CEILING)
        .expect("fallback timer never fired");
    assert!(
        fired_at.duration_since(requested_at) >= delay,
        "continuation resumed before the requested delay elapsed"
    );
}

#[test]
fn rejected_schedule_request_falls_back_and_fires() {
    init_test_logging();
    let bridge = DispatchBridge::new(Arc::new(SaturatedTimerExecutor));
    let delay = Duration::from_millis(50);

    let (tx, rx) = mpsc::channel();
    let requested_at = Instant::now();
    let _handle = bridge.invoke_on_timeout(
        delay,
        Box::new(move || {
            tx.send(Instant::now()).expect("receiver alive");
        }),
    );

    let fired_at = rx
        .recv_timeout(WAIT_CEILING)
        .expect("fallback never ran the rejected scheduled job");
    assert!(fired_at.duration_since(requested_at) >= delay);
}

#[test]
fn cancelling_a_fallback_timeout_prevents_the_callback() {
    init_test_logging();
    let bridge = DispatchBridge::new(Arc::new(RejectingExecutor::new()));

    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let handle = bridge.invoke_on_timeout(
        Duration::from_millis(100),
        Box::new(move || {
            flag.store(true, Ordering::SeqCst);
        }),
    );

    handle.cancel();
    handle.cancel();
    assert!(handle.is_cancelled());

    thread::sleep(Duration::from_millis(400));
    assert!(
        !ran.load(Ordering::SeqCst),
        "cancelled callback ran anyway"
    );
}

#[test]
fn cancelling_a_resource_scheduled_entry_reaches_the_resource() {
    init_test_logging();
    let bridge = DispatchBridge::new(Arc::new(ThreadTimerExecutor));

    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let handle = bridge.schedule_after_delay(
        Duration::from_millis(100),
        Box::new(move || {
            flag.store(true, Ordering::SeqCst);
        }),
    );

    handle.cancel();
    thread::sleep(Duration::from_millis(400));
    assert!(
        !ran.load(Ordering::SeqCst),
        "cancelled scheduled entry fired anyway"
    );
}

#[test]
fn resource_timer_fires_when_not_cancelled() {
    init_test_logging();
    let bridge = DispatchBridge::new(Arc::new(ThreadTimerExecutor));
    let delay = Duration::from_millis(50);

    let (tx, rx) = mpsc::channel();
    let requested_at = Instant::now();
    let _handle = bridge.schedule_after_delay(
        delay,
        Box::new(move || {
            tx.send(Instant::now()).expect("receiver alive");
        }),
    );

    let fired_at = rx
        .recv_timeout(WAIT_CEILING)
        .expect("resource timer never fired");
    assert!(fired_at.duration_since(requested_at) >= delay);
}

#[test]
fn dispatch_after_close_bypasses_the_resource_but_runs_the_job() {
    init_test_logging();
    let executor = Arc::new(InlineExecutor::new());
    let bridge = DispatchBridge::owning(Arc::clone(&executor) as Arc<dyn TaskExecutor>);

    bridge.close();
    bridge.close();

    let (tx, rx) = mpsc::channel();
    bridge.dispatch(
        &Context::new(),
        Box::new(move || {
            tx.send(()).expect("receiver alive");
        }),
    );

    rx.recv_timeout(WAIT_CEILING)
        .expect("job dispatched after close never ran");
    assert_eq!(
        executor.accepted.load(Ordering::SeqCst),
        0,
        "closed bridge still handed work to its resource"
    );
}

#[test]
fn schedule_after_close_uses_the_fallback_timer() {
    init_test_logging();
    let bridge = DispatchBridge::new(Arc::new(ThreadTimerExecutor));
    bridge.close();

    let (tx, rx) = mpsc::channel();
    let _handle = bridge.invoke_on_timeout(
        Duration::from_millis(50),
        Box::new(move || {
            tx.send(()).expect("receiver alive");
        }),
    );

    rx.recv_timeout(WAIT_CEILING)
        .expect("timeout scheduled after close never fired");
}
