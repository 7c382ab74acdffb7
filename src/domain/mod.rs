// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and value semantics.
//!
//! This module defines field declarations, the typed values fields hold, timestamp
//! parsing, and the error type. It has no knowledge of where values come from.

pub mod config_value;
pub mod errors;
pub mod field;
pub mod timestamp;

// Re-export commonly used types
pub use config_value::ConfigValue;
pub use errors::{ConfigError, Result};
pub use field::{FieldBinding, FieldKind};
pub use timestamp::Timestamp;
