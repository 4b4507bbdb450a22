//! Two-level reference counter: one global count, one count per class key.
//!
//! # Architecture
//!
//! ```text
//!                   ┌──────────────────────────────────────────┐
//!                   │                 RefCount                 │
//!                   ├──────────────────────────────────────────┤
//!                   │ global ████████ (CachePadded<AtomicIsize>)│
//!                   │ registry: Mutex<Vec<Arc<ClassCounter>>>  │
//!                   └───────┬─────────────┬─────────────┬──────┘
//!                           │             │             │
//!                      ┌────▼───┐    ┌────▼───┐    ┌────▼───┐
//!                      │ "net"  │    │ "disk" │    │ "ctl"  │
//!                      │ count  │    │ count  │    │ count  │
//!                      └────────┘    └────────┘    └────────┘
//! ```
//!
//! Each increment lands on a class count and then on the global count. A
//! decrement that would take a class below zero stops at the class count:
//! the imbalance is logged against that key and the global count, which
//! decides when the tracked object can go away, is left alone.
//!
//! # Locking
//!
//! The counts are plain atomics and never take a lock. Only creating a new
//! class record touches the registry mutex, and the expected number of keys
//! per object is small, so lookup is a linear scan.
//!
//! The class-then-global update pair is not atomic as a unit: a concurrent
//! reader may observe the class count already moved while the global count
//! has not yet followed.

mod class;
mod key;
mod registry;

pub use class::Class;
pub use key::{ClassKey, KEY_MAX};

use std::borrow::Cow;
use std::fmt::{self, Debug, Display};
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use log::trace;

use crate::config::{Config, FatalPolicy, TruncationPolicy};
use crate::diagnostics::{self, ImbalanceAction, LOG_TARGET};
use crate::error::Result;
use class::ClassCounter;
use registry::ClassRegistry;

/// A type that can be observed to retrieve its current count.
///
/// Implemented by [`RefCount`] (the global count) and by [`Class`] (the count
/// attributed to one key).
pub trait Observable: Debug {
    /// Returns the display name: the counter name, or the class key.
    fn name(&self) -> Cow<'_, str>;

    /// Returns the current count.
    fn value(&self) -> isize;
}

impl Display for dyn Observable + '_ {
    /// Formats the counter as `name:value` if named, or just `value` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name().is_empty() {
            write!(f, "{}:{}", self.name(), self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}

/// Class-based reference counter for one tracked object.
///
/// # Examples
///
/// ```rust
/// use classref::refcount::RefCount;
///
/// let rc = RefCount::new().with_name("socket");
///
/// let rx = rc.resolve("rx_path");
/// let tx = rc.resolve("tx_path");
///
/// rx.inc();
/// tx.inc();
/// assert_eq!(rc.read(), 2);
///
/// // A buggy path drops a reference it never took: contained.
/// rc.resolve("timer").dec();
/// assert_eq!(rc.read(), 2);
/// assert_eq!(rc.imbalanced().len(), 1);
///
/// rx.dec();
/// assert!(tx.dec_and_test());
///
/// rc.destroy();
/// ```
pub struct RefCount {
    name: &'static str,
    global: CachePadded<AtomicIsize>,
    registry: ClassRegistry,
    config: Config,
    default_action: Option<Arc<dyn ImbalanceAction>>,
}

impl RefCount {
    /// Creates a counter with a zero global count and no classes.
    pub fn new() -> Self {
        RefCount {
            name: "",
            global: CachePadded::new(AtomicIsize::new(0)),
            registry: ClassRegistry::default(),
            config: Config::new(),
            default_action: None,
        }
    }

    /// Returns a builder for a customized counter.
    pub fn builder() -> RefCountBuilder {
        RefCountBuilder::default()
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Returns the name of this counter, empty if unnamed.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the configuration in effect.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the global count.
    #[inline]
    pub fn read(&self) -> isize {
        self.global.load(Ordering::Acquire)
    }

    /// Returns the class for `key`, creating it on first use.
    ///
    /// Keys are cut to [`KEY_MAX`] bytes for both storage and comparison, so
    /// keys sharing that prefix resolve to the same class. With
    /// [`TruncationPolicy::Warn`] the cut is logged when the class is created.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classref::refcount::RefCount;
    ///
    /// let rc = RefCount::new();
    /// let a = rc.resolve("A");
    /// let again = rc.resolve("A");
    /// assert!(a.same_class(&again));
    /// ```
    pub fn resolve(&self, key: &str) -> Class<'_> {
        self.resolve_inner(key, None)
    }

    /// Like [`resolve`](Self::resolve), installing `action` if the class is new.
    ///
    /// An existing class keeps the action it was created with.
    pub fn resolve_with_action(&self, key: &str, action: Arc<dyn ImbalanceAction>) -> Class<'_> {
        self.resolve_inner(key, Some(action))
    }

    /// Like [`resolve`](Self::resolve), but refuses keys longer than [`KEY_MAX`].
    pub fn try_resolve(&self, key: &str) -> Result<Class<'_>> {
        let class_key = ClassKey::try_new(key)?;
        Ok(self.resolve_key(class_key, None, None))
    }

    /// Returns the class for `key` if it was already created.
    pub fn get(&self, key: &str) -> Option<Class<'_>> {
        self.registry
            .get(&ClassKey::new(key))
            .map(|counter| Class::new(counter, self))
    }

    /// Returns every class, in creation order.
    pub fn classes(&self) -> Vec<Class<'_>> {
        self.registry
            .entries()
            .into_iter()
            .map(|counter| Class::new(counter, self))
            .collect()
    }

    /// Returns the keys of the classes whose count is negative.
    pub fn imbalanced(&self) -> Vec<ClassKey> {
        self.registry
            .entries()
            .iter()
            .filter(|counter| counter.read() < 0)
            .map(|counter| *counter.key())
            .collect()
    }

    /// Number of classes created so far.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if no class was ever resolved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases every class record, then the counter itself.
    ///
    /// Returns the number of class records released. Dropping the counter
    /// has the same effect; this method only makes the end of life explicit.
    pub fn destroy(mut self) -> usize {
        self.release()
    }

    fn release(&mut self) -> usize {
        let released = self.registry.release();
        if released > 0 {
            trace!(
                target: LOG_TARGET,
                "releasing refcount {:?}: {} classes, global count {}",
                self.name,
                released,
                self.read()
            );
        }
        released
    }

    fn resolve_inner(&self, key: &str, action: Option<Arc<dyn ImbalanceAction>>) -> Class<'_> {
        let (class_key, truncated) = ClassKey::truncating(key);
        self.resolve_key(class_key, truncated.then_some(key), action)
    }

    /// Get-or-create; `truncated_from` is the original key when it was cut,
    /// reported once, when the class is created.
    fn resolve_key(
        &self,
        key: ClassKey,
        truncated_from: Option<&str>,
        action: Option<Arc<dyn ImbalanceAction>>,
    ) -> Class<'_> {
        let counter = self.registry.get_or_insert_with(&key, || {
            if let Some(original) = truncated_from {
                diagnostics::report_truncation(self.config.truncation, original, &key);
            }
            trace!(target: LOG_TARGET, "new class {key:?} on refcount {:?}", self.name);
            ClassCounter::new(key, action.or_else(|| self.default_action.clone()))
        });
        Class::new(counter, self)
    }
}

impl Drop for RefCount {
    fn drop(&mut self) {
        self.release();
    }
}

impl Default for RefCount {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for RefCount {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name)
    }

    fn value(&self) -> isize {
        self.read()
    }
}

impl Debug for RefCount {
    /// Formats the counter showing the global count and every class.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{ global:{}", self.name, self.read())?;
        for counter in self.registry.entries() {
            write!(f, " [{}]:{}", counter.key(), counter.read())?;
        }
        write!(f, " }}")
    }
}

/// Builder for [`RefCount`].
///
/// # Examples
///
/// ```rust
/// use classref::config::{FatalPolicy, TruncationPolicy};
/// use classref::refcount::RefCount;
///
/// let rc = RefCount::builder()
///     .with_name("inode")
///     .with_truncation(TruncationPolicy::Warn)
///     .with_fatal(FatalPolicy::Panic)
///     .build();
///
/// assert_eq!(rc.name(), "inode");
/// ```
#[derive(Default)]
pub struct RefCountBuilder {
    name: &'static str,
    config: Config,
    action: Option<Arc<dyn ImbalanceAction>>,
}

impl RefCountBuilder {
    /// Sets the counter name.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the key truncation policy.
    pub fn with_truncation(mut self, truncation: TruncationPolicy) -> Self {
        self.config = self.config.with_truncation(truncation);
        self
    }

    /// Sets the fatal policy.
    pub fn with_fatal(mut self, fatal: FatalPolicy) -> Self {
        self.config = self.config.with_fatal(fatal);
        self
    }

    /// Sets the action inherited by every class created without its own.
    pub fn with_imbalance_action(mut self, action: impl ImbalanceAction + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Builds the counter.
    pub fn build(self) -> RefCount {
        let mut rc = RefCount::new();
        rc.name = self.name;
        rc.config = self.config;
        rc.default_action = self.action;
        rc
    }
}
