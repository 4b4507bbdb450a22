//! Error type shared by the whole crate.
//!
//! Only [`RefCountError::KeyTooLong`] (and, with the `json` feature,
//! [`RefCountError::Json`]) is ever returned to a caller. The other variants
//! describe conditions detected inside the counting operations: a
//! [`ClassImbalance`](RefCountError::ClassImbalance) is rendered into the log
//! and swallowed, a [`GlobalInvariantViolation`](RefCountError::GlobalInvariantViolation)
//! becomes the message of the fatal panic.

use thiserror::Error;

/// Unified error type for class-based reference counting.
#[derive(Debug, Error)]
pub enum RefCountError {
    /// A class was decremented more times than it was incremented.
    #[error("refcount imbalance on key {key} (class count {count})")]
    ClassImbalance {
        /// The offending class key.
        key: String,
        /// The class count observed right after the bad decrement.
        count: isize,
    },

    /// A balanced decrement hit a global counter that was already at or below zero.
    #[error("refcount global invariant violated on key {key}: global count is {global}")]
    GlobalInvariantViolation {
        /// The class whose decrement found the global counter exhausted.
        key: String,
        /// The global count observed at decrement time.
        global: isize,
    },

    /// A key longer than the class key capacity was passed to a strict lookup.
    #[error("class key {key:?} exceeds {max} bytes")]
    KeyTooLong {
        /// The rejected key.
        key: String,
        /// The key capacity in bytes.
        max: usize,
    },

    /// Error from the JSON observer.
    #[cfg(feature = "json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for fallible class-based reference counting operations.
pub type Result<T> = std::result::Result<T, RefCountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_imbalance() {
        let err = RefCountError::ClassImbalance {
            key: "net_rx".to_string(),
            count: -1,
        };
        assert_eq!(
            err.to_string(),
            "refcount imbalance on key net_rx (class count -1)"
        );
    }

    #[test]
    fn test_display_violation() {
        let err = RefCountError::GlobalInvariantViolation {
            key: "A".to_string(),
            global: 0,
        };
        assert_eq!(
            err.to_string(),
            "refcount global invariant violated on key A: global count is 0"
        );
    }

    #[test]
    fn test_display_key_too_long() {
        let err = RefCountError::KeyTooLong {
            key: "abc".to_string(),
            max: 2,
        };
        assert_eq!(err.to_string(), "class key \"abc\" exceeds 2 bytes");
    }
}
