// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration values.
//!
//! Every source delivers strings; [`ConfigValue`] is what those strings become once
//! parsed for a field's [`FieldKind`]. The parsing rules live here so that the
//! environment, the env file, defaults and flags all agree on them.

use crate::domain::errors::{ConfigError, Result};
use crate::domain::field::FieldKind;
use crate::domain::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed configuration value of one of the supported kinds.
///
/// # Examples
///
/// ```
/// use stratacfg::domain::{ConfigValue, FieldKind};
///
/// let value = FieldKind::Int.parse("PORT", "8080").unwrap();
/// assert_eq!(value, ConfigValue::Int(8080));
/// assert_eq!(value.kind(), FieldKind::Int);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConfigValue {
    /// A boolean value.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A string, taken verbatim.
    String(String),
    /// A timestamp.
    Time(Timestamp),
}

impl ConfigValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            ConfigValue::Bool(_) => FieldKind::Bool,
            ConfigValue::Int(_) => FieldKind::Int,
            ConfigValue::Float(_) => FieldKind::Float,
            ConfigValue::String(_) => FieldKind::String,
            ConfigValue::Time(_) => FieldKind::Time,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float, if this is a float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is a timestamp value.
    pub fn as_time(&self) -> Option<Timestamp> {
        match self {
            ConfigValue::Time(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<Timestamp> for ConfigValue {
    fn from(value: Timestamp) -> Self {
        ConfigValue::Time(value)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(value) => write!(f, "{}", value),
            ConfigValue::Int(value) => write!(f, "{}", value),
            ConfigValue::Float(value) => write!(f, "{}", value),
            ConfigValue::String(value) => write!(f, "{}", value),
            ConfigValue::Time(value) => write!(f, "{}", value),
        }
    }
}

/// Parses a boolean.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and `0`, `f`, `F`, `FALSE`, `false`,
/// `False`. Anything else is an error.
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => value
            .parse::<bool>()
            .map_err(|e| ConfigError::from_parse_bool_error(key.to_string(), e)),
    }
}

/// Parses a signed decimal integer.
pub fn parse_int(key: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
}

/// Parses a 64-bit float.
pub fn parse_float(key: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|e| ConfigError::from_parse_float_error(key.to_string(), e))
}

/// Parses a timestamp, rejecting input that matches no layout.
pub fn parse_time(key: &str, value: &str) -> Result<Timestamp> {
    let parsed = Timestamp::parse(value);
    if parsed.is_zero() {
        return Err(ConfigError::InvalidTimestamp {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(parsed)
}
