// SPDX-License-Identifier: MIT OR Apache-2.0

//! A layered configuration crate for command-line programs.
//!
//! Every field of a configuration struct is filled from four sources. A later source
//! overrides an earlier one:
//!
//! 1. the declared default
//! 2. an OS environment variable
//! 3. an entry in a `.env` file
//! 4. a command-line flag
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Field bindings, typed values, timestamps and errors
//! - **Ports**: Trait definitions for sources of raw values (`ConfigSource`, `ConfigParser`)
//! - **Adapters**: The process environment, the `.env` file and the `clap` flag registry
//! - **Service**: Per-field resolution and the loader that drives it
//!
//! # Supported field types
//!
//! `bool`, `i64`, `f64`, `String` and [`domain::Timestamp`]. Binding any other type is
//! reported as `ConfigError::UnsupportedType`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stratacfg::prelude::*;
//!
//! #[derive(Default)]
//! struct ServerConfig {
//!     port: i64,
//!     verbose: bool,
//! }
//!
//! impl Configurable for ServerConfig {
//!     fn bind_fields(&mut self) -> Vec<FieldBinding<'_>> {
//!         vec![
//!             FieldBinding::new("port", &mut self.port)
//!                 .flag("port")
//!                 .env("HOST_PORT")
//!                 .default("8080")
//!                 .description("Port to listen on"),
//!             FieldBinding::new("verbose", &mut self.verbose)
//!                 .flag("verbose")
//!                 .description("Verbose logging"),
//!         ]
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut config = ServerConfig::default();
//! stratacfg::load(&mut config)?;
//! println!("listening on {}", config.port);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

use adapters::DEFAULT_ENV_FILE;
use domain::Result;
use service::{ConfigLoader, Configurable, ResolvedField};

/// Loads `target` from the process environment, `./.env` and the process arguments.
///
/// A missing `.env` file is not an error.
///
/// # Errors
///
/// Returns an error if a field binding is invalid, the `.env` file cannot be read or
/// parsed, or the command line cannot be parsed. `--help` is reported as a
/// `ConfigError::FlagError` whose kind is `DisplayHelp`.
pub fn load<T: Configurable + ?Sized>(target: &mut T) -> Result<Vec<ResolvedField>> {
    ConfigLoader::builder()
        .with_env_file(DEFAULT_ENV_FILE)
        .build()?
        .load(target)
}

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::adapters::{DotenvFile, EnvVarAdapter, FlagRegistry};
    pub use crate::domain::{ConfigError, ConfigValue, FieldBinding, FieldKind, Result, Timestamp};
    pub use crate::ports::{ConfigParser, ConfigSource};
    pub use crate::service::{
        ConfigLoader, Configurable, FieldResolver, ResolvedField, ValueOrigin,
    };
}
