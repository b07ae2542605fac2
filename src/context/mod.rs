//! Context composition primitives.
//!
//! A [`Context`] is the immutable bag of values a task carries across
//! suspension points. Each value is a [`ContextElement`] identified by a
//! [`Key`], and a context holds at most one element per key.
//!
//! Contexts are built by composition, never by mutation:
//!
//! ```
//! use propsync::context::{Context, ContextElement, Key};
//!
//! let trace_key = Key::new("trace");
//! let parent = Context::new() + ContextElement::new(trace_key, 7u64);
//! let child = parent.clone() + ContextElement::new(Key::new("span"), "render");
//!
//! // Extending the child never touches the parent.
//! assert_eq!(parent.len(), 1);
//! assert_eq!(child.len(), 2);
//! ```

pub mod context;
pub mod element;
pub mod key;

pub use context::Context;
pub use element::ContextElement;
pub use key::Key;
