// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! Structural problems (a field that cannot be written, a missing flag name, a malformed
//! `.env` line) abort loading and surface here. Per-value parse failures from the
//! environment, the env file or flags never do; they are treated as absent values.

use crate::domain::field::FieldKind;
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for configuration operations.
///
/// # Examples
///
/// ```
/// use stratacfg::domain::errors::ConfigError;
///
/// fn bind() -> Result<(), ConfigError> {
///     Err(ConfigError::NoFlagName {
///         field: "port".to_string(),
///     })
/// }
///
/// assert!(bind().is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The field's storage was bound read-only and cannot receive values.
    #[error("Cannot set field '{field}': storage is not writable")]
    CantSet {
        /// The field name
        field: String,
    },

    /// The field declares no command-line flag name.
    #[error("Field '{field}' has no flag name")]
    NoFlagName {
        /// The field name
        field: String,
    },

    /// The field's Rust type is not one of the supported kinds.
    #[error("Field '{field}' has unsupported type {type_name}")]
    UnsupportedType {
        /// The field name
        field: String,
        /// The Rust type name of the field
        type_name: String,
    },

    /// A value of one kind was written into a field of another kind.
    #[error("Field '{field}' holds {expected} values, got {found}")]
    TypeMismatch {
        /// The field name
        field: String,
        /// The field's kind
        expected: FieldKind,
        /// The kind of the rejected value
        found: FieldKind,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A value matched none of the recognized timestamp layouts.
    #[error("Invalid timestamp for key '{key}': '{value}'")]
    InvalidTimestamp {
        /// The key being converted
        key: String,
        /// The rejected input
        value: String,
    },

    /// A line of an env file could not be parsed.
    #[error("Failed to parse env file at line {line}: {message}")]
    ParseError {
        /// One-based line number
        line: usize,
        /// The error message
        message: String,
    },

    /// The env file does not exist.
    #[error("Env file does not exist: {}", path.display())]
    FileNotFound {
        /// The path that was looked up
        path: PathBuf,
    },

    /// An error occurred in a configuration source.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Two fields declared the same flag name.
    #[error("Flag '--{name}' is registered more than once")]
    DuplicateFlag {
        /// The flag name
        name: String,
    },

    /// The flag name is empty or reserved by the flag parser.
    #[error("Flag name '{name}' is reserved or invalid")]
    InvalidFlagName {
        /// The flag name
        name: String,
    },

    /// Command-line flags could not be parsed.
    #[error("Failed to parse command-line flags: {0}")]
    FlagError(#[from] clap::Error),

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "int".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseFloatError.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "float64".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseBoolError.
    pub fn from_parse_bool_error(key: String, err: ParseBoolError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "bool".to_string(),
            source: Box::new(err),
        }
    }

    /// Returns true if this error reports a missing env file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::FileNotFound { .. })
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
