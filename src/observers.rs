//! Observer implementations for exporting reference counter state.
//!
//! - [`table`] - Pretty-print the classes of a counter using the `tabled` crate
//! - [`json`] - Serialize a counter and its classes to JSON
//!
//! Observers only read counts; they never take the counting path and can run
//! while other threads keep counting.
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module
//! - `full` - Enables all observer modules
//!
//! # Example
//!
//! ```rust,ignore
//! use classref::refcount::RefCount;
//! use classref::Result;
//!
//! fn dump(rc: &RefCount) -> Result<()> {
//!     #[cfg(feature = "table")]
//!     {
//!         use classref::observers::table::TableObserver;
//!         println!("{}", TableObserver::new().render(rc));
//!     }
//!
//!     #[cfg(feature = "json")]
//!     {
//!         use classref::observers::json::JsonObserver;
//!         println!("{}", JsonObserver::new().pretty(true).to_json(rc)?);
//!     }
//!
//!     Ok(())
//! }
//! ```

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;
