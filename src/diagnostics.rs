//! Imbalance reporting and the fatal path.
//!
//! Every detected problem goes through the [`log`] facade under the
//! [`LOG_TARGET`] target, so the host application decides where the reports
//! end up (`env_logger`, syslog, a test capture...). On top of the log line, a
//! class may carry an [`ImbalanceAction`] supplied by the caller.
//!
//! ```text
//!   Class::dec()
//!       │
//!       ├── class count < 0 ──► report_imbalance() ──► error!  + ImbalanceAction
//!       │                                               (global left untouched)
//!       │
//!       └── global count <= 0 ──► fatal() ──► error!  + panic / abort
//! ```

use log::{error, warn};

use crate::config::{FatalPolicy, TruncationPolicy};
use crate::error::RefCountError;
use crate::refcount::ClassKey;

/// Log target used for every record emitted by this crate.
pub const LOG_TARGET: &str = "classref";

/// Caller-supplied hook invoked whenever a class goes negative.
///
/// The hook runs after the imbalance has been logged, on the thread that
/// performed the bad decrement. It receives the class key and the class count
/// observed right after that decrement.
///
/// Any `Fn(&ClassKey, isize) + Send + Sync` closure is an `ImbalanceAction`.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use classref::refcount::RefCount;
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let seen = Arc::clone(&hits);
///
/// let rc = RefCount::builder()
///     .with_imbalance_action(move |_key: &classref::refcount::ClassKey, _count: isize| {
///         seen.fetch_add(1, Ordering::Relaxed);
///     })
///     .build();
///
/// rc.resolve("A").dec();
/// assert_eq!(hits.load(Ordering::Relaxed), 1);
/// ```
pub trait ImbalanceAction: Send + Sync {
    /// Called with the offending key and its (negative) class count.
    fn on_imbalance(&self, key: &ClassKey, count: isize);
}

impl<F> ImbalanceAction for F
where
    F: Fn(&ClassKey, isize) + Send + Sync,
{
    #[inline]
    fn on_imbalance(&self, key: &ClassKey, count: isize) {
        self(key, count)
    }
}

/// Logs a class imbalance and runs the class action, if any.
#[cold]
pub(crate) fn report_imbalance(key: &ClassKey, count: isize, action: Option<&dyn ImbalanceAction>) {
    let err = RefCountError::ClassImbalance {
        key: key.to_string(),
        count,
    };
    error!(target: LOG_TARGET, "BUG: {err} !");

    if let Some(action) = action {
        action.on_imbalance(key, count);
    }
}

/// Reports a truncated key according to `policy`.
pub(crate) fn report_truncation(policy: TruncationPolicy, original: &str, stored: &ClassKey) {
    if policy == TruncationPolicy::Warn {
        warn!(
            target: LOG_TARGET,
            "class key {original:?} truncated to {:?} ({} bytes)",
            stored.to_str_lossy(),
            stored.len()
        );
    }
}

/// Terminates the current thread or process after logging `err`.
#[cold]
#[inline(never)]
pub(crate) fn fatal(policy: FatalPolicy, err: RefCountError) -> ! {
    error!(target: LOG_TARGET, "BUG: {err}");
    match policy {
        FatalPolicy::Panic => panic!("{err}"),
        FatalPolicy::Abort => std::process::abort(),
    }
}
