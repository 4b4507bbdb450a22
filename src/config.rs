//! Behavior knobs for a [`RefCount`](crate::refcount::RefCount).
//!
//! The defaults reproduce the classic class refcount behavior: over-long keys
//! are silently truncated and a violated global invariant brings the thread
//! down with a panic.
//!
//! # Examples
//!
//! ```rust
//! use classref::config::{Config, FatalPolicy, TruncationPolicy};
//!
//! let config = Config::new()
//!     .with_truncation(TruncationPolicy::Warn)
//!     .with_fatal(FatalPolicy::Abort);
//!
//! assert_eq!(config.truncation, TruncationPolicy::Warn);
//! assert_eq!(config.fatal, FatalPolicy::Abort);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What [`RefCount::resolve`](crate::refcount::RefCount::resolve) does with a
/// key longer than [`KEY_MAX`](crate::refcount::KEY_MAX) bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TruncationPolicy {
    /// Truncate without reporting.
    #[default]
    Silent,
    /// Truncate and emit a `warn!` naming both the original and the stored key.
    Warn,
}

/// How a global invariant violation terminates execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FatalPolicy {
    /// Panic the calling thread. The payload is the rendered
    /// [`GlobalInvariantViolation`](crate::error::RefCountError::GlobalInvariantViolation).
    #[default]
    Panic,
    /// Abort the whole process.
    Abort,
}

/// Configuration of a reference counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Policy for keys exceeding the key capacity.
    pub truncation: TruncationPolicy,
    /// Policy for unrecoverable invariant violations.
    pub fatal: FatalPolicy,
}

impl Config {
    /// Creates the default configuration.
    pub const fn new() -> Self {
        Config {
            truncation: TruncationPolicy::Silent,
            fatal: FatalPolicy::Panic,
        }
    }

    /// Sets the key truncation policy.
    pub const fn with_truncation(self, truncation: TruncationPolicy) -> Self {
        Self { truncation, ..self }
    }

    /// Sets the fatal policy.
    pub const fn with_fatal(self, fatal: FatalPolicy) -> Self {
        Self { fatal, ..self }
    }
}
