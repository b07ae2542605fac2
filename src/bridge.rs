//! Plugin contract for thread-affine state.
//!
//! A [`ThreadLocalBridge`] encapsulates exactly one kind of thread-affine
//! state (a logging correlation map, a debug label, a security principal)
//! and knows how to push and pop it around a task's execution on a worker
//! thread.
//!
//! Bridges are registered once at process startup from a fixed,
//! host-supplied ordered list (see
//! [`PropagationEngine::from_host_list`](crate::propagation::PropagationEngine::from_host_list));
//! the registry never changes at runtime. Multiple bridges may register for
//! the same key; all of them run, in registration order on install and in
//! the same order on restore.

use crate::context::{Context, ContextElement, Key};
use std::any::Any;

/// Opaque prior-state value handed back by
/// [`ThreadLocalBridge::update_thread_context`] and consumed by
/// [`ThreadLocalBridge::restore_thread_context`].
///
/// Only the bridge that produced a value ever looks inside it.
pub type PriorState = Box<dyn Any + Send>;

/// Translates one context-element kind into real thread-local effects.
pub trait ThreadLocalBridge: Send + Sync {
    /// Identity of the element kind this bridge handles.
    fn key(&self) -> Key;

    /// Installs `element`'s payload into thread-visible state and returns
    /// whatever was there before, for later restoration.
    ///
    /// Called only on the thread that is about to run the task, after the
    /// element was matched against [`Self::key`].
    fn update_thread_context(&self, context: &Context, element: &ContextElement) -> PriorState;

    /// Writes `prior` back, undoing the matching update.
    ///
    /// Called exactly once per matching `update_thread_context` call, on
    /// the same thread, in the same element/bridge order.
    fn restore_thread_context(&self, context: &Context, prior: PriorState);
}
