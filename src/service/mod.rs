// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer that turns bound fields into loaded configuration.
//!
//! [`FieldResolver`] applies the precedence rules to a single field; [`ConfigLoader`]
//! drives a whole configuration struct through them.

pub mod loader;
pub mod resolver;

// Re-export commonly used types
pub use loader::{ConfigLoader, ConfigLoaderBuilder, Configurable};
pub use resolver::{FieldResolver, ResolvedField, ValueOrigin};
