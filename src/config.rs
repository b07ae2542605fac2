//! Startup configuration, read once from the environment.
//!
//! # Supported Environment Variables
//!
//! | Variable | Values | Maps to |
//! |----------|--------|---------|
//! | `PROPSYNC_DEBUG` | `auto` \| `on` \| `off` | [`DebugMode`] |
//! | `PROPSYNC_SCHEDULER` | `pool` \| `steal` | [`SchedulerKind`] |
//!
//! Both are resolved exactly once, at process startup. An unrecognized
//! value is a fatal [`ConfigError`]: the process refuses to continue with
//! an ambiguous configuration rather than guess.

use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable selecting the debug mode.
pub const ENV_DEBUG: &str = "PROPSYNC_DEBUG";
/// Environment variable selecting the dispatcher implementation.
pub const ENV_SCHEDULER: &str = "PROPSYNC_SCHEDULER";

/// Errors produced while reading startup configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// [`ENV_DEBUG`] held something other than `auto`, `on`, or `off`.
    #[error("unrecognized debug mode {value:?} (expected auto, on, or off)")]
    InvalidDebugMode {
        /// The offending value.
        value: String,
    },
    /// [`ENV_SCHEDULER`] held something other than `pool` or `steal`.
    #[error("unrecognized scheduler {value:?} (expected pool or steal)")]
    InvalidScheduler {
        /// The offending value.
        value: String,
    },
}

/// Whether debug facilities (the built-in task-naming bridge) are active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebugMode {
    /// Follow the build: enabled when debug assertions are compiled in.
    #[default]
    Auto,
    /// Always enabled.
    On,
    /// Always disabled.
    Off,
}

impl DebugMode {
    /// Resolves the switch for this process.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        match self {
            Self::On => true,
            Self::Off => false,
            Self::Auto => cfg!(debug_assertions),
        }
    }

    /// Reads the mode from [`ENV_DEBUG`]; an unset variable means `Auto`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(ENV_DEBUG) {
            Ok(value) => value.parse(),
            Err(env::VarError::NotPresent) => Ok(Self::Auto),
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidDebugMode {
                value: "<non-utf8>".to_owned(),
            }),
        }
    }
}

impl FromStr for DebugMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(ConfigError::InvalidDebugMode {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DebugMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::On => "on",
            Self::Off => "off",
        })
    }
}

/// Which dispatcher implementation the host should wire at startup.
///
/// This crate validates and reports the choice; the host performs the
/// actual wiring. The decision is startup-time only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerKind {
    /// The default pool-based dispatcher.
    #[default]
    Pool,
    /// The alternative work-stealing dispatcher.
    WorkSteal,
}

impl SchedulerKind {
    /// Reads the kind from [`ENV_SCHEDULER`]; an unset variable means
    /// `Pool`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(ENV_SCHEDULER) {
            Ok(value) => value.parse(),
            Err(env::VarError::NotPresent) => Ok(Self::Pool),
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidScheduler {
                value: "<non-utf8>".to_owned(),
            }),
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pool" => Ok(Self::Pool),
            "steal" => Ok(Self::WorkSteal),
            other => Err(ConfigError::InvalidScheduler {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pool => "pool",
            Self::WorkSteal => "steal",
        })
    }
}
