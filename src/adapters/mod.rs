// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing the concrete configuration sources.
//!
//! The OS environment and the env file implement the `ConfigSource` port; the flag
//! registry wraps `clap` for command-line flags.

pub mod cli;
pub mod dotenv_file;
pub mod env_var;

pub use cli::FlagRegistry;
pub use dotenv_file::{DotenvFile, DotenvParser, DEFAULT_ENV_FILE};
pub use env_var::EnvVarAdapter;
