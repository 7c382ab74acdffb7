// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source trait definition.
//!
//! A `ConfigSource` answers "what is the raw string value named X?". The process
//! environment and a loaded env file are both sources; the resolver queries them by
//! a field's environment variable name.

/// A trait for sources of raw configuration strings.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a loaded source can be shared freely.
///
/// # Examples
///
/// ```rust
/// use stratacfg::ports::ConfigSource;
///
/// struct Fixed;
///
/// impl ConfigSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn get(&self, key: &str) -> Option<String> {
///         (key == "HOST").then(|| "localhost".to_string())
///     }
/// }
///
/// assert_eq!(Fixed.get("HOST").as_deref(), Some("localhost"));
/// assert!(Fixed.contains("HOST"));
/// ```
pub trait ConfigSource: Send + Sync {
    /// Returns a short name for logs and error messages, e.g. `"env"`.
    fn name(&self) -> &str;

    /// Looks up the raw value stored under `key`.
    ///
    /// Returns `None` if the source has no such key. An empty string is a present value.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns true if the source holds `key`.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
