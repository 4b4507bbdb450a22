//! Class records and the handle used to count through them.
//!
//! A [`Class`] is what callers hold on to: it pairs the per-key record with a
//! borrow of the owning [`RefCount`], so every operation reaches both the
//! class count and the global count. The borrow ties the handle to the owner,
//! making it impossible to keep counting after the owner is destroyed.

use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use super::key::ClassKey;
use super::{Observable, RefCount};
use crate::diagnostics::{self, ImbalanceAction};
use crate::error::RefCountError;

/// References attributed to one key of a [`RefCount`].
pub(crate) struct ClassCounter {
    key: ClassKey,
    count: AtomicIsize,
    action: Option<Arc<dyn ImbalanceAction>>,
}

impl ClassCounter {
    pub(crate) fn new(key: ClassKey, action: Option<Arc<dyn ImbalanceAction>>) -> Self {
        ClassCounter {
            key,
            count: AtomicIsize::new(0),
            action,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &ClassKey {
        &self.key
    }

    #[inline]
    pub(crate) fn read(&self) -> isize {
        self.count.load(Ordering::Acquire)
    }
}

impl Debug for ClassCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassCounter")
            .field("key", &self.key)
            .field("count", &self.read())
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// Handle to a class of references on a [`RefCount`].
///
/// Obtained from [`RefCount::resolve`] and friends. Handles are cheap to
/// clone, `Send` and `Sync`: counting is lock-free and may happen from any
/// number of threads at once.
///
/// The increment and decrement operations take a class but act on the
/// object's global count as well: callers think in terms of the tracked
/// object's lifetime while attributing every operation to a key.
///
/// # Examples
///
/// ```rust
/// use classref::refcount::RefCount;
///
/// let rc = RefCount::new();
/// let net = rc.resolve("net");
/// let disk = rc.resolve("disk");
///
/// net.inc();
/// disk.add(2);
/// assert_eq!(rc.read(), 3);
///
/// disk.dec();
/// disk.dec();
/// assert!(net.dec_and_test());
/// ```
#[derive(Clone)]
pub struct Class<'rc> {
    counter: Arc<ClassCounter>,
    owner: &'rc RefCount,
}

impl<'rc> Class<'rc> {
    pub(crate) fn new(counter: Arc<ClassCounter>, owner: &'rc RefCount) -> Self {
        Class { counter, owner }
    }

    /// The key of this class.
    #[inline]
    pub fn key(&self) -> &ClassKey {
        self.counter.key()
    }

    /// The reference counter owning this class.
    #[inline]
    pub fn owner(&self) -> &'rc RefCount {
        self.owner
    }

    /// Returns the class count.
    #[inline]
    pub fn read(&self) -> isize {
        self.counter.read()
    }

    /// Returns `true` if this class was decremented more than incremented.
    #[inline]
    pub fn is_imbalanced(&self) -> bool {
        self.read() < 0
    }

    /// Returns `true` if both handles refer to the same class record.
    #[inline]
    pub fn same_class(&self, other: &Class<'_>) -> bool {
        Arc::ptr_eq(&self.counter, &other.counter)
    }

    /// Takes one reference on behalf of this class.
    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    /// Takes `n` references on behalf of this class.
    ///
    /// Both counts move by `n` with no invariant checks, so a negative `n`
    /// bypasses the imbalance containment of [`dec`](Self::dec).
    #[inline]
    pub fn add(&self, n: isize) {
        self.counter.count.fetch_add(n, Ordering::Relaxed);
        self.owner.global.fetch_add(n, Ordering::Relaxed);
    }

    /// Drops one reference on behalf of this class.
    ///
    /// If the class count goes negative the imbalance is logged, the class
    /// action runs, and the global count is left untouched: a misbehaving key
    /// can never release references held by other keys.
    ///
    /// # Panics
    ///
    /// If the class is balanced but the global count is already at or below
    /// zero, the global invariant was broken earlier by someone else. This is
    /// fatal: with [`FatalPolicy::Panic`](crate::config::FatalPolicy::Panic) the
    /// call panics, with [`FatalPolicy::Abort`](crate::config::FatalPolicy::Abort)
    /// the process aborts.
    pub fn dec(&self) {
        let count = self.counter.count.fetch_sub(1, Ordering::AcqRel) - 1;
        if count < 0 {
            diagnostics::report_imbalance(self.key(), count, self.counter.action.as_deref());
            return;
        }

        // Check and decrement in one step so the global count never goes below zero.
        let step = self
            .owner
            .global
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |global| {
                (global > 0).then(|| global - 1)
            });

        if let Err(global) = step {
            diagnostics::fatal(
                self.owner.config().fatal,
                RefCountError::GlobalInvariantViolation {
                    key: self.key().to_string(),
                    global,
                },
            );
        }
    }

    /// Drops one reference and returns `true` if the global count is now zero.
    ///
    /// A `true` result means no references remain on the tracked object and it
    /// may be released. The test reads the global count after the decrement,
    /// whether or not the decrement reached it.
    #[inline]
    pub fn dec_and_test(&self) -> bool {
        self.dec();
        self.owner.read() == 0
    }
}

impl Observable for Class<'_> {
    fn name(&self) -> Cow<'_, str> {
        self.key().to_str_lossy()
    }

    fn value(&self) -> isize {
        self.read()
    }
}

impl Debug for Class<'_> {
    /// Formats the class as `key{count}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.key(), self.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FatalPolicy};
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_new_class_is_zero() {
        let rc = RefCount::new();
        let class = rc.resolve("A");
        assert_eq!(class.read(), 0);
        assert!(!class.is_imbalanced());
    }

    #[test]
    fn test_inc() {
        let rc = RefCount::new();
        let class = rc.resolve("A");
        class.inc();
        class.inc();
        assert_eq!(class.read(), 2);
        assert_eq!(rc.read(), 2);
    }

    #[test]
    fn test_add() {
        let rc = RefCount::new();
        let class = rc.resolve("A");
        class.add(5);
        assert_eq!(class.read(), 5);
        assert_eq!(rc.read(), 5);
        class.add(-2);
        assert_eq!(class.read(), 3);
        assert_eq!(rc.read(), 3);
    }

    #[test]
    fn test_dec_balanced() {
        let rc = RefCount::new();
        let class = rc.resolve("A");
        class.add(2);
        class.dec();
        assert_eq!(class.read(), 1);
        assert_eq!(rc.read(), 1);
    }

    #[test]
    fn test_dec_imbalance_is_contained() {
        let rc = RefCount::new();
        let a = rc.resolve("A");
        let b = rc.resolve("B");
        b.inc();

        a.dec();
        assert_eq!(a.read(), -1);
        assert!(a.is_imbalanced());
        assert_eq!(rc.read(), 1);

        // The stray decrement must not make the object look releasable.
        assert!(!a.dec_and_test());
        assert_eq!(a.read(), -2);
        assert_eq!(rc.read(), 1);
    }

    #[test]
    fn test_imbalance_runs_action() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let rc = RefCount::builder()
            .with_imbalance_action(move |key: &ClassKey, count: isize| {
                assert_eq!(key.as_str(), Some("A"));
                assert!(count < 0);
                seen.fetch_add(1, Ordering::Relaxed);
            })
            .build();

        let a = rc.resolve("A");
        a.inc();
        a.dec();
        assert_eq!(hits.load(Ordering::Relaxed), 0);
        a.dec();
        a.dec();
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_dec_and_test() {
        let rc = RefCount::new();
        let a = rc.resolve("A");
        let b = rc.resolve("B");
        a.inc();
        b.inc();
        assert!(!a.dec_and_test());
        assert!(b.dec_and_test());
        assert_eq!(rc.read(), 0);
    }

    #[test]
    #[should_panic(expected = "global invariant violated on key A: global count is 0")]
    fn test_dec_on_exhausted_global_is_fatal() {
        let rc = RefCount::new();
        let a = rc.resolve("A");
        let b = rc.resolve("B");
        // Class A looks balanced but the global count was drained through B.
        a.inc();
        b.add(-1);
        assert_eq!(rc.read(), 0);
        a.dec();
    }

    #[test]
    fn test_fatal_does_not_wrap_global() {
        let rc = RefCount::builder()
            .with_config(Config::new().with_fatal(FatalPolicy::Panic))
            .build();
        let a = rc.resolve("A");
        let b = rc.resolve("B");
        a.inc();
        b.add(-1);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| a.dec()));
        assert!(result.is_err());
        assert_eq!(rc.read(), 0);
    }

    #[test]
    fn test_same_class() {
        let rc = RefCount::new();
        let a = rc.resolve("A");
        let again = rc.resolve("A");
        let b = rc.resolve("B");
        assert!(a.same_class(&again));
        assert!(!a.same_class(&b));
        assert!(a.same_class(&a.clone()));
    }

    #[test]
    fn test_owner() {
        let rc = RefCount::new();
        let class = rc.resolve("A");
        assert!(std::ptr::eq(class.owner(), &rc));
    }

    #[test]
    fn test_observable() {
        let rc = RefCount::new();
        let class = rc.resolve("sock");
        class.add(3);
        assert_eq!(class.name(), "sock");
        assert_eq!(class.value(), 3);
        assert_eq!(format!("{}", &class as &dyn Observable), "sock:3");
    }

    #[test]
    fn test_debug() {
        let rc = RefCount::new();
        let class = rc.resolve("A");
        class.inc();
        assert_eq!(format!("{class:?}"), "A{1}");
    }

    #[test]
    fn test_multiple_threads() {
        use std::thread;

        let rc = RefCount::new();
        thread::scope(|s| {
            for key in ["a", "b", "c", "d"] {
                let class = rc.resolve(key);
                s.spawn(move || {
                    for _ in 0..1000 {
                        class.inc();
                    }
                    for _ in 0..500 {
                        class.dec();
                    }
                });
            }
        });

        assert_eq!(rc.read(), 2000);
        for class in rc.classes() {
            assert_eq!(class.read(), 500);
        }
    }

    #[test]
    fn test_concurrent_same_class() {
        use std::thread;

        let rc = RefCount::new();
        let class = rc.resolve("shared");
        class.add(8 * 100);
        thread::scope(|s| {
            for _ in 0..8 {
                let class = class.clone();
                s.spawn(move || {
                    for _ in 0..100 {
                        class.dec();
                    }
                });
            }
        });

        assert_eq!(class.read(), 0);
        assert_eq!(rc.read(), 0);
    }
}
