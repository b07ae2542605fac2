//! Propsync: context propagation for cooperatively scheduled tasks.
//!
//! # Overview
//!
//! Cooperative tasks suspend on one worker thread and resume on another, but
//! plenty of useful state is thread-affine: logging correlation maps,
//! security principals, debug labels. Propsync moves that state with the
//! task. A task carries an immutable [`Context`] of keyed elements; around
//! every resume/suspend transition the scheduler calls
//! [`PropagationEngine::enter`] and [`PropagationEngine::leave`], which swap
//! the matching thread-local state in and out through pluggable
//! [`ThreadLocalBridge`] implementations.
//!
//! # Core Guarantees
//!
//! - **Zero-cost when idle**: a context with no propagated elements enters
//!   and leaves without touching a thread-local or allocating
//! - **Exact restoration**: every `enter` is paired with a `leave` that
//!   restores the precise prior state, including across nested scopes
//! - **No leakage**: state installed for one task never bleeds into a
//!   sibling task that runs later on the same worker thread
//! - **No lost work**: [`DispatchBridge`] reroutes rejected or unschedulable
//!   jobs to a process-wide default dispatcher instead of dropping them
//!
//! # Module Structure
//!
//! - [`context`]: `Key`, `ContextElement`, and `Context` composition
//! - [`bridge`]: the `ThreadLocalBridge` plugin contract
//! - [`propagation`]: the enter/leave engine and restore tokens
//! - [`dispatch`]: executor adaptation, delayed scheduling, and fallback
//! - [`plugins`]: worked bridges (MDC correlation maps, debug task naming)
//! - [`config`]: startup configuration read once from the environment
//!
//! # Example
//!
//! ```
//! use propsync::plugins::mdc::{self, MdcBridge};
//! use propsync::{Context, PropagationEngine, ThreadLocalBridge};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let bridges: Vec<Arc<dyn ThreadLocalBridge>> = vec![Arc::new(MdcBridge::new())];
//! let engine = PropagationEngine::new(bridges);
//!
//! let map: HashMap<String, String> =
//!     [("request_id".to_owned(), "r-17".to_owned())].into_iter().collect();
//! let context = Context::new() + mdc::element(Arc::new(map));
//!
//! let scope = engine.scope(&context);
//! assert_eq!(mdc::get("request_id").as_deref(), Some("r-17"));
//! drop(scope);
//! assert!(mdc::get("request_id").is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]

pub mod bridge;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod plugins;
pub mod propagation;

// Re-exports for convenient access to core types
pub use bridge::{PriorState, ThreadLocalBridge};
pub use config::{ConfigError, DebugMode, SchedulerKind};
pub use context::{Context, ContextElement, Key};
pub use dispatch::{
    DispatchBridge, Job, ScheduleOutcome, ScheduledEntry, SubmitOutcome, TaskExecutor,
    TimeoutHandle,
};
pub use propagation::{PropagationEngine, PropagationScope, RestoreToken};
