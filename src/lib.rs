//! # Classref - Class-Based Reference Counting
//!
//! A Rust library for reference counting objects whose lifetime is shared by
//! many independently-written code paths. Besides the usual global count, every
//! reference is attributed to a **class** (a short key naming the code path that
//! took it), so that when the books do not balance you know *who* is to blame.
//!
//! ## The Problem
//!
//! With a plain reference count, all increments and decrements collapse into a
//! single number. A path that drops one reference too many can bring the count
//! to zero while other paths still use the object: the object is freed under
//! their feet and the bug shows up far away from its cause, typically as memory
//! corruption.
//!
//! ## The Solution: Per-Class Counts
//!
//! Each [`RefCount`](refcount::RefCount) keeps one count per class key next to the
//! global count:
//!
//! 1. **Attribution**: every increment and decrement goes through a
//!    [`Class`](refcount::Class) handle and moves both the class count and the
//!    global count.
//!
//! 2. **Containment**: a decrement that would take a class below zero is
//!    logged against that key and **does not** reach the global count. A
//!    misbehaving path cannot release references held by others.
//!
//! 3. **Fail loudly on corruption**: a balanced decrement that finds the
//!    global count already exhausted proves that the invariant was broken
//!    somewhere else. This is fatal (panic or abort, see
//!    [`FatalPolicy`](config::FatalPolicy)).
//!
//! ```text
//!   rc.resolve("rx").inc()   rx: 1   global: 1
//!   rc.resolve("tx").inc()   tx: 1   global: 2
//!   rc.resolve("rx").dec()   rx: 0   global: 1
//!   rc.resolve("rx").dec()   rx: -1  global: 1   <- "BUG: refcount imbalance on key rx"
//!   rc.resolve("tx").dec()   tx: 0   global: 0   <- object may be released
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use classref::refcount::RefCount;
//!
//! let rc = RefCount::new().with_name("buffer");
//!
//! // Resolve the class once and keep the handle around.
//! let reader = rc.resolve("reader");
//! let writer = rc.resolve("writer");
//!
//! reader.inc();
//! writer.inc();
//!
//! reader.dec();
//! if writer.dec_and_test() {
//!     // last reference gone: release the tracked object
//! }
//!
//! rc.destroy();
//! ```
//!
//! ## Diagnostics
//!
//! Reports go through the [`log`] facade under the `classref` target; install
//! any logger (`env_logger`, `tracing-log`, ...) to see them. A caller-supplied
//! [`ImbalanceAction`](diagnostics::ImbalanceAction) can be attached to react
//! to imbalances programmatically.
//!
//! ## Thread Safety
//!
//! [`RefCount`](refcount::RefCount) and [`Class`](refcount::Class) are `Send + Sync`.
//! Counting is lock-free; only the creation of a new class takes a short lock on
//! the class registry.
//!
//! ## Observers
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `serde` | [`snapshot`] | Serializable point-in-time copies of the counts |
//! | `json` | [`observers::json`] | Serialize a counter and its classes to JSON |
//! | `table` | [`observers::table`] | Pretty-print the classes as an ASCII table |
//! | `full` | All observers | Enables all observer modules |

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod observers;
pub mod refcount;

#[cfg(feature = "serde")]
pub mod snapshot;

pub use error::{RefCountError, Result};
