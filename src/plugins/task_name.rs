//! Debug task-naming bridge.
//!
//! Gives every task a process-unique numeric id and an optional
//! human-readable label, installed into a per-thread slot while the task
//! runs. Diagnostics and panic hooks can then report which logical task a
//! worker thread was executing.
//!
//! This is the bridge
//! [`PropagationEngine::from_host_list`](crate::propagation::PropagationEngine::from_host_list)
//! force-registers first when debug mode is enabled.

use crate::bridge::{PriorState, ThreadLocalBridge};
use crate::context::{Context, ContextElement, Key};
use core::fmt;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_TASK_NAME: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// The key under which task names live in a context.
#[must_use]
pub fn key() -> Key {
    static KEY: OnceLock<Key> = OnceLock::new();
    *KEY.get_or_init(|| Key::new("task-name"))
}

/// A task's debug identity: a process-unique id plus an optional label.
#[derive(Debug, Clone)]
pub struct TaskName {
    id: u64,
    label: Option<String>,
}

impl TaskName {
    /// Allocates the next anonymous task name.
    #[must_use]
    pub fn next() -> Self {
        Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            label: None,
        }
    }

    /// Allocates the next task name with a human-readable label.
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            label: Some(label.into()),
        }
    }

    /// The process-unique numeric id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The label, if one was given.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}#{}", self.id),
            None => write!(f, "#{}", self.id),
        }
    }
}

/// Builds a context element carrying `name`.
#[must_use]
pub fn element(name: TaskName) -> ContextElement {
    ContextElement::new(key(), name)
}

/// The label of the task currently running on the calling thread, if the
/// thread is inside a named task's scope.
#[must_use]
pub fn current() -> Option<String> {
    CURRENT_TASK_NAME.with(|slot| slot.borrow().clone())
}

fn swap(name: Option<String>) -> Option<String> {
    CURRENT_TASK_NAME.with(|slot| slot.replace(name))
}

/// Bridge installing task labels into the per-thread slot.
#[derive(Debug, Default)]
pub struct TaskNameBridge;

impl TaskNameBridge {
    /// Creates the bridge.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ThreadLocalBridge for TaskNameBridge {
    fn key(&self) -> Key {
        key()
    }

    fn update_thread_context(&self, _context: &Context, element: &ContextElement) -> PriorState {
        let next = element.downcast_ref::<TaskName>().map(ToString::to_string);
        Box::new(swap(next))
    }

    fn restore_thread_context(&self, _context: &Context, prior: PriorState) {
        match prior.downcast::<Option<String>>() {
            Ok(prior) => {
                swap(*prior);
            }
            Err(_) => panic!("task-name bridge received a foreign prior state"),
        }
    }
}
