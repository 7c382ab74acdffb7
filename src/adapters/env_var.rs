// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable configuration source adapter.
//!
//! This module provides an adapter that looks up configuration values in the process
//! environment, or in a fixed map standing in for it.

use crate::ports::ConfigSource;
use std::collections::HashMap;
use std::env;

/// Configuration source adapter for environment variables.
///
/// Lookups go to the live process environment at the time of the call. Variables whose
/// value is not valid Unicode are reported as absent.
///
/// # Examples
///
/// ```rust
/// use stratacfg::adapters::EnvVarAdapter;
/// use stratacfg::ports::ConfigSource;
///
/// // Read the process environment
/// let adapter = EnvVarAdapter::new();
/// assert_eq!(adapter.name(), "env");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvVarAdapter {
    /// Fixed values used instead of the process environment
    values: Option<HashMap<String, String>>,
}

impl EnvVarAdapter {
    /// Creates an adapter over the process environment.
    pub fn new() -> Self {
        Self { values: None }
    }

    /// Creates an adapter over fixed values instead of the process environment.
    ///
    /// This is intended for tests, where mutating the real environment would leak
    /// between test threads.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stratacfg::adapters::EnvVarAdapter;
    /// use stratacfg::ports::ConfigSource;
    /// use std::collections::HashMap;
    ///
    /// let mut values = HashMap::new();
    /// values.insert("HOST_PORT".to_string(), "9090".to_string());
    ///
    /// let adapter = EnvVarAdapter::with_values(values);
    /// assert_eq!(adapter.get("HOST_PORT").as_deref(), Some("9090"));
    /// ```
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            values: Some(values),
        }
    }
}

impl ConfigSource for EnvVarAdapter {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        match &self.values {
            Some(values) => values.get(key).cloned(),
            None => env::var(key).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Helper to set and clean up environment variables
    struct EnvGuard {
        keys: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { keys: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.keys.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in &self.keys {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_env_adapter_name() {
        let adapter = EnvVarAdapter::new();
        assert_eq!(adapter.name(), "env");
    }

    #[test]
    fn test_env_adapter_get() {
        let mut guard = EnvGuard::new();
        guard.set("STRATACFG_ENV_ADAPTER_GET", "test_value");

        let adapter = EnvVarAdapter::new();
        assert_eq!(
            adapter.get("STRATACFG_ENV_ADAPTER_GET").as_deref(),
            Some("test_value")
        );
    }

    #[test]
    fn test_env_adapter_sees_later_changes() {
        let mut guard = EnvGuard::new();
        let adapter = EnvVarAdapter::new();
        assert!(adapter.get("STRATACFG_ENV_ADAPTER_LIVE").is_none());

        guard.set("STRATACFG_ENV_ADAPTER_LIVE", "now");
        assert_eq!(
            adapter.get("STRATACFG_ENV_ADAPTER_LIVE").as_deref(),
            Some("now")
        );
    }

    #[test]
    fn test_env_adapter_get_nonexistent() {
        let adapter = EnvVarAdapter::new();
        assert!(adapter.get("NONEXISTENT_VAR_12345").is_none());
    }

    #[test]
    fn test_env_adapter_empty_value_is_present() {
        let mut guard = EnvGuard::new();
        guard.set("STRATACFG_ENV_ADAPTER_EMPTY", "");

        let adapter = EnvVarAdapter::new();
        assert_eq!(
            adapter.get("STRATACFG_ENV_ADAPTER_EMPTY").as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_env_adapter_with_values() {
        let mut values = HashMap::new();
        values.insert("HOST_PORT".to_string(), "9090".to_string());

        let adapter = EnvVarAdapter::with_values(values);
        assert_eq!(adapter.get("HOST_PORT").as_deref(), Some("9090"));
        assert!(adapter.get("PATH").is_none());
        assert!(adapter.contains("HOST_PORT"));
    }

    #[test]
    fn test_env_adapter_default() {
        let adapter = EnvVarAdapter::default();
        assert_eq!(adapter.name(), "env");
    }
}
