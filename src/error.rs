//! Error types for the meterkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when decorator configuration is invalid
//!   (duplicate cache name on a registry, malformed custom tags).
//! - [`DisposedError`]: Returned when a cache operation is attempted on a
//!   decorator that has already been disposed.
//!
//! ## Example Usage
//!
//! ```
//! use meterkit::builder::MeteredCacheBuilder;
//!
//! // Reserved tag keys are caught at build time without panicking
//! let builder = MeteredCacheBuilder::new().tag("result", "oops");
//! assert!(builder.validate_tags().is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when decorator configuration is invalid.
///
/// Produced by [`MeteredCacheBuilder::try_build`](crate::builder::MeteredCacheBuilder::try_build)
/// when a cache name is already registered against the target registry, or
/// when a custom tag is empty or collides with a reserved tag key. Carries a
/// human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// DisposedError
// ---------------------------------------------------------------------------

/// Error returned when an operation reaches a fully disposed decorator.
///
/// Only surfaces once the instance state is `Disposed`; operations that
/// overlap an in-progress disposal complete against the last consistent
/// state instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposedError(String);

impl DisposedError {
    /// Creates a new `DisposedError` for the named cache instance.
    ///
    /// `name` is the configured cache name, if any.
    pub fn new(name: Option<&str>) -> Self {
        match name {
            Some(name) => Self(format!("metered cache `{name}` has been disposed")),
            None => Self("metered cache has been disposed".to_string()),
        }
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisposedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DisposedError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
