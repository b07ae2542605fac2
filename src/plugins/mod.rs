//! Worked bridge implementations validating the plugin contract.
//!
//! - [`mdc`]: propagates an MDC-style correlation map (string key/value
//!   snapshots) into a per-thread slot, so log statements on any worker
//!   thread see the task's correlation values
//! - [`task_name`]: installs a numeric task id plus optional label into a
//!   per-thread slot for debugging; this is the bridge the engine
//!   force-registers under debug mode
//!
//! Neither plugin is special: both go through the same
//! [`ThreadLocalBridge`](crate::ThreadLocalBridge) seam any host bridge
//! uses.

pub mod mdc;
pub mod task_name;

pub use mdc::MdcBridge;
pub use task_name::TaskNameBridge;
