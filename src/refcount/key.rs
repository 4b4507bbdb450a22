//! Fixed-capacity class keys.
//!
//! A [`ClassKey`] stores at most [`KEY_MAX`] bytes inline. Longer input is cut
//! at that byte bound, both when storing and when comparing, so two keys that
//! agree on their first [`KEY_MAX`] bytes name the same class.

use std::borrow::Cow;
use std::fmt::{self, Debug, Display};

use crate::error::{RefCountError, Result};

/// Capacity of a class key in bytes.
pub const KEY_MAX: usize = 20;

/// A class key, truncated to [`KEY_MAX`] bytes.
///
/// Truncation works on bytes, not characters: a multi-byte UTF-8 character
/// straddling the bound is cut in half. [`Display`] renders such keys lossily.
///
/// # Examples
///
/// ```rust
/// use classref::refcount::{ClassKey, KEY_MAX};
///
/// let short = ClassKey::new("net_rx");
/// assert_eq!(short.as_str(), Some("net_rx"));
///
/// let a = ClassKey::new("a_rather_long_class_key_1");
/// let b = ClassKey::new("a_rather_long_class_key_2");
/// assert_eq!(a.len(), KEY_MAX);
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassKey {
    bytes: [u8; KEY_MAX],
    len: u8,
}

impl ClassKey {
    /// Builds a key, truncating `key` to [`KEY_MAX`] bytes.
    pub fn new(key: &str) -> Self {
        Self::truncating(key).0
    }

    /// Builds a key and reports whether `key` had to be truncated.
    pub fn truncating(key: &str) -> (Self, bool) {
        let raw = key.as_bytes();
        let len = raw.len().min(KEY_MAX);
        let mut bytes = [0u8; KEY_MAX];
        bytes[..len].copy_from_slice(&raw[..len]);
        (
            ClassKey {
                bytes,
                len: len as u8,
            },
            raw.len() > KEY_MAX,
        )
    }

    /// Builds a key, refusing input longer than [`KEY_MAX`] bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classref::refcount::ClassKey;
    ///
    /// assert!(ClassKey::try_new("fits").is_ok());
    /// assert!(ClassKey::try_new("this_key_is_far_too_long").is_err());
    /// ```
    pub fn try_new(key: &str) -> Result<Self> {
        match Self::truncating(key) {
            (_, true) => Err(RefCountError::KeyTooLong {
                key: key.to_string(),
                max: KEY_MAX,
            }),
            (class_key, false) => Ok(class_key),
        }
    }

    /// Returns the stored bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Returns the key as a string slice, or `None` if truncation split a
    /// UTF-8 character.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Returns the key as a string, replacing a split trailing character.
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Number of stored bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` for the empty key.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<&str> for ClassKey {
    fn from(key: &str) -> Self {
        ClassKey::new(key)
    }
}

impl Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl Debug for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassKey({:?})", self.to_str_lossy())
    }
}
