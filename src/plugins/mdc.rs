//! MDC-style correlation-map propagation.
//!
//! A correlation map is a set of string key/value pairs (request ids, user
//! ids) that logging reads from the current thread. This module keeps one
//! map slot per thread and a bridge that swaps a task's snapshot into the
//! slot around execution.
//!
//! Snapshots are `Arc`-shared and immutable: capturing, installing, and
//! restoring never copies the map.

use crate::bridge::{PriorState, ThreadLocalBridge};
use crate::context::{Context, ContextElement, Key};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// An immutable correlation-map snapshot.
pub type MdcMap = Arc<HashMap<String, String>>;

thread_local! {
    static CURRENT_MDC: RefCell<Option<MdcMap>> = const { RefCell::new(None) };
}

/// The key under which correlation snapshots live in a context.
#[must_use]
pub fn key() -> Key {
    static KEY: OnceLock<Key> = OnceLock::new();
    *KEY.get_or_init(|| Key::new("mdc"))
}

/// The calling thread's current correlation map, if any.
#[must_use]
pub fn current() -> Option<MdcMap> {
    CURRENT_MDC.with(|slot| slot.borrow().clone())
}

/// Looks up one correlation value on the calling thread.
#[must_use]
pub fn get(name: &str) -> Option<String> {
    current().and_then(|map| map.get(name).cloned())
}

/// Replaces the calling thread's map, returning the previous one.
pub fn swap(map: Option<MdcMap>) -> Option<MdcMap> {
    CURRENT_MDC.with(|slot| slot.replace(map))
}

/// Builds a context element carrying `map`.
#[must_use]
pub fn element(map: MdcMap) -> ContextElement {
    ContextElement::new(key(), map)
}

/// Captures the calling thread's current map into a context element.
///
/// A thread with no map contributes an empty snapshot, so entering the
/// element still clears stale values left by an unrelated task.
#[must_use]
pub fn capture() -> ContextElement {
    element(current().unwrap_or_default())
}

/// Bridge swapping correlation snapshots around task execution.
#[derive(Debug, Default)]
pub struct MdcBridge;

impl MdcBridge {
    /// Creates the bridge.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ThreadLocalBridge for MdcBridge {
    fn key(&self) -> Key {
        key()
    }

    fn update_thread_context(&self, _context: &Context, element: &ContextElement) -> PriorState {
        let next = element.downcast_ref::<MdcMap>().cloned();
        Box::new(swap(next))
    }

    fn restore_thread_context(&self, _context: &Context, prior: PriorState) {
        match prior.downcast::<Option<MdcMap>>() {
            Ok(prior) => {
                swap(*prior);
            }
            Err(_) => panic!("mdc bridge received a foreign prior state"),
        }
    }
}
