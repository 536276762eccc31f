//! Redacting wrapper for sensitive credential strings.
//!
//! Database passwords and service-role keys travel through state
//! snapshots, log-adjacent structs, and test assertions. Wrapping them in
//! [`Secret`] guarantees that a stray `{:?}` or `{}` never prints the
//! plaintext; access is explicit via [`Secret::expose`].

use std::fmt;

/// Marker printed in place of secret contents.
const REDACTED: &str = "[redacted]";

/// A string whose contents are hidden from `Debug` and `Display`.
///
/// Equality compares the underlying contents, so secrets remain usable
/// as plain value types in state comparisons and tests.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    /// Wrap a plaintext string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Explicit access to the plaintext.
    ///
    /// Call sites should be the only places the plaintext escapes, e.g.
    /// when building an outbound authentication header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True if the secret holds no characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}
