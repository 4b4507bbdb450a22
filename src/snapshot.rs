//! Snapshot types for serializing reference counter state.
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! classref = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use classref::refcount::RefCount;
//! use classref::snapshot::RefCountSnapshot;
//!
//! let rc = RefCount::new().with_name("page");
//! rc.resolve("A").inc();
//! rc.resolve("B").dec();
//!
//! let snapshot = RefCountSnapshot::capture(&rc);
//! assert_eq!(snapshot.global, 1);
//! assert!(!snapshot.is_balanced());
//! assert_eq!(snapshot.imbalanced().count(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::refcount::{Class, RefCount};

/// A snapshot of a single class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassSnapshot {
    /// The class key, rendered lossily.
    pub key: String,
    /// The class count.
    pub count: isize,
}

impl ClassSnapshot {
    /// Creates a new class snapshot.
    pub fn new(key: impl Into<String>, count: isize) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }

    /// Creates a snapshot from a class handle.
    pub fn from_class(class: &Class<'_>) -> Self {
        Self {
            key: class.key().to_string(),
            count: class.read(),
        }
    }

    /// Returns `true` if the class count is negative.
    pub fn is_imbalanced(&self) -> bool {
        self.count < 0
    }
}

/// A point-in-time copy of a reference counter and all its classes.
///
/// Counts are read one by one without stopping writers, so a snapshot taken
/// while other threads are counting may be momentarily inconsistent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefCountSnapshot {
    /// The counter name, absent if unnamed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// The global count.
    pub global: isize,
    /// The classes, in creation order.
    pub classes: Vec<ClassSnapshot>,
}

impl RefCountSnapshot {
    /// Captures the current state of `rc`.
    pub fn capture(rc: &RefCount) -> Self {
        Self {
            name: (!rc.name().is_empty()).then(|| rc.name().to_string()),
            global: rc.read(),
            classes: rc.classes().iter().map(ClassSnapshot::from_class).collect(),
        }
    }

    /// Sum of all class counts.
    pub fn class_total(&self) -> isize {
        self.classes.iter().map(|class| class.count).sum()
    }

    /// Returns `true` if the global count equals the sum of the class counts.
    pub fn is_balanced(&self) -> bool {
        self.global == self.class_total()
    }

    /// Returns the classes whose count is negative.
    pub fn imbalanced(&self) -> impl Iterator<Item = &ClassSnapshot> {
        self.classes.iter().filter(|class| class.is_imbalanced())
    }

    /// Returns the snapshot of the class named `key`, if any.
    pub fn get(&self, key: &str) -> Option<&ClassSnapshot> {
        self.classes.iter().find(|class| class.key == key)
    }
}

impl RefCount {
    /// Captures a [`RefCountSnapshot`] of this counter.
    pub fn snapshot(&self) -> RefCountSnapshot {
        RefCountSnapshot::capture(self)
    }
}
