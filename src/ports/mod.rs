// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! These traits describe what the resolver needs from its collaborators: something
//! that looks up raw values by name, and something that turns file content into a
//! key/value map. Adapters implement them.

pub mod parser;
pub mod source;

// Re-export commonly used types
pub use parser::ConfigParser;
pub use source::ConfigSource;
