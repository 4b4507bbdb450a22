//! JSON observer for serializing reference counters.
//!
//! This module provides [`JsonObserver`], which serializes one or more
//! [`RefCount`]s, with all their classes, to JSON using serde.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! classref = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use classref::refcount::RefCount;
//! use classref::observers::json::JsonObserver;
//!
//! let rc = RefCount::new().with_name("socket");
//! rc.resolve("rx").add(2);
//! rc.resolve("tx").dec();
//!
//! let json = JsonObserver::new().to_json(&rc).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"name":"socket","global":2,"classes":[{"key":"rx","count":2},{"key":"tx","count":-1}]}"#
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::refcount::RefCount;
use crate::snapshot::RefCountSnapshot;

/// A snapshot stamped with the time it was taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimedSnapshot {
    /// Milliseconds since Unix epoch.
    pub timestamp_ms: u64,
    /// The counter state.
    #[serde(flatten)]
    pub snapshot: RefCountSnapshot,
}

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
    /// Whether to stamp each counter with the capture time.
    pub include_timestamp: bool,
}

/// An observer that serializes reference counters to JSON.
///
/// Pretty-printed output with timestamps:
///
/// ```rust,ignore
/// use classref::observers::json::JsonObserver;
///
/// let observer = JsonObserver::new()
///     .pretty(true)
///     .include_timestamp(true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables the `timestamp_ms` field.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Serializes one counter to a JSON object.
    pub fn to_json(&self, rc: &RefCount) -> Result<String> {
        if self.config.include_timestamp {
            self.encode(&self.stamp(rc))
        } else {
            self.encode(&rc.snapshot())
        }
    }

    /// Serializes several counters to a JSON array.
    pub fn to_json_all<'a>(&self, counters: impl Iterator<Item = &'a RefCount>) -> Result<String> {
        if self.config.include_timestamp {
            let snapshots: Vec<TimedSnapshot> = counters.map(|rc| self.stamp(rc)).collect();
            self.encode(&snapshots)
        } else {
            let snapshots: Vec<RefCountSnapshot> = counters.map(RefCount::snapshot).collect();
            self.encode(&snapshots)
        }
    }

    /// Serializes one counter to a JSON byte vector.
    pub fn to_json_bytes(&self, rc: &RefCount) -> Result<Vec<u8>> {
        let bytes = if self.config.include_timestamp {
            serde_json::to_vec(&self.stamp(rc))?
        } else {
            serde_json::to_vec(&rc.snapshot())?
        };
        Ok(bytes)
    }

    fn stamp(&self, rc: &RefCount) -> TimedSnapshot {
        TimedSnapshot {
            timestamp_ms: current_timestamp_ms(),
            snapshot: rc.snapshot(),
        }
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
