//! Typed values carried inside a context.

use super::Key;
use core::fmt;
use std::any::Any;
use std::sync::Arc;

/// One typed, immutable value inside a [`Context`](super::Context).
///
/// The payload is reference-counted, so cloning an element (and therefore a
/// context) shares the payload rather than copying it.
#[derive(Clone)]
pub struct ContextElement {
    key: Key,
    value: Arc<dyn Any + Send + Sync>,
}

impl ContextElement {
    /// Wraps `value` under `key`.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(key: Key, value: T) -> Self {
        Self {
            key,
            value: Arc::new(value),
        }
    }

    /// The key identifying this element's kind.
    #[must_use]
    pub fn key(&self) -> Key {
        self.key
    }

    /// The untyped payload.
    #[must_use]
    pub fn value(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }

    /// The payload, downcast to its concrete type.
    ///
    /// Returns `None` when `T` is not the type the element was built with.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_ref().downcast_ref::<T>()
    }
}

impl fmt::Debug for ContextElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextElement")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
