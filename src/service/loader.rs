// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loading.
//!
//! The loader binds every field of a configuration struct, registers its flags, parses
//! the command line once, and then resolves each field against the default, the
//! environment, the env file and the flags.

use crate::adapters::{DotenvFile, EnvVarAdapter, FlagRegistry};
use crate::domain::{FieldBinding, Result};
use crate::ports::ConfigSource;
use crate::service::resolver::{FieldResolver, ResolvedField};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Program name used when none can be derived from the process arguments.
const FALLBACK_PROGRAM_NAME: &str = "app";

/// A configuration struct whose fields can be bound for loading.
///
/// # Examples
///
/// ```rust
/// use stratacfg::domain::FieldBinding;
/// use stratacfg::service::Configurable;
///
/// struct ServerConfig {
///     port: i64,
///     host: String,
/// }
///
/// impl Configurable for ServerConfig {
///     fn bind_fields(&mut self) -> Vec<FieldBinding<'_>> {
///         vec![
///             FieldBinding::new("port", &mut self.port)
///                 .flag("port")
///                 .env("HOST_PORT")
///                 .default("8080")
///                 .description("Port to listen on"),
///             FieldBinding::new("host", &mut self.host)
///                 .flag("host")
///                 .env("HOST_NAME")
///                 .default("localhost"),
///         ]
///     }
/// }
/// ```
pub trait Configurable {
    /// Returns a binding for every configurable field, in declaration order.
    fn bind_fields(&mut self) -> Vec<FieldBinding<'_>>;
}

/// Loads configuration structs from defaults, the environment, an env file and flags.
///
/// Each load registers flags in a fresh [`FlagRegistry`], so one loader can be reused.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use stratacfg::domain::FieldBinding;
/// use stratacfg::service::{ConfigLoader, ValueOrigin};
///
/// # fn main() -> stratacfg::domain::Result<()> {
/// let loader = ConfigLoader::builder()
///     .with_program_name("server")
///     .with_env_values(HashMap::from([("HOST_PORT".to_string(), "7070".to_string())]))
///     .with_args(["--verbose"])
///     .build()?;
///
/// let mut port: i64 = 0;
/// let mut verbose = false;
/// let fields = loader.load_fields(vec![
///     FieldBinding::new("port", &mut port).flag("port").env("HOST_PORT").default("8080"),
///     FieldBinding::new("verbose", &mut verbose).flag("verbose"),
/// ])?;
///
/// assert_eq!(fields[0].origin, ValueOrigin::EnvFile);
/// assert_eq!(port, 7070);
/// assert!(verbose);
/// # Ok(())
/// # }
/// ```
pub struct ConfigLoader {
    /// Program name shown in flag help
    program: String,
    /// The OS environment, or a stand-in for it
    environment: Box<dyn ConfigSource>,
    /// Loaded env file entries
    env_file: DotenvFile,
    /// Command-line arguments, without the program name
    args: Vec<OsString>,
}

impl ConfigLoader {
    /// Creates a new loader builder.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Returns the program name used in flag help.
    pub fn program_name(&self) -> &str {
        &self.program
    }

    /// Returns the loaded env file.
    pub fn env_file(&self) -> &DotenvFile {
        &self.env_file
    }

    /// Returns the command-line arguments the loader parses.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Loads every field `target` binds.
    pub fn load<T: Configurable + ?Sized>(&self, target: &mut T) -> Result<Vec<ResolvedField>> {
        self.load_fields(target.bind_fields())
    }

    /// Loads an explicit list of bindings.
    ///
    /// # Errors
    ///
    /// The first binding that fails validation or flag registration aborts the load
    /// before any arguments are parsed. A flag syntax error aborts it after all defaults
    /// have been written.
    pub fn load_fields(&self, bindings: Vec<FieldBinding<'_>>) -> Result<Vec<ResolvedField>> {
        self.load_with_flags(bindings).map(|(fields, _)| fields)
    }

    /// Loads an explicit list of bindings and also returns the parsed flag registry,
    /// which holds the positional arguments and the help text.
    pub fn load_with_flags(
        &self,
        bindings: Vec<FieldBinding<'_>>,
    ) -> Result<(Vec<ResolvedField>, FlagRegistry)> {
        let mut flags = FlagRegistry::new(self.program.clone());

        let mut resolvers = Vec::with_capacity(bindings.len());
        for binding in bindings {
            resolvers.push(FieldResolver::new(
                binding,
                &mut flags,
                self.environment.as_ref(),
                &self.env_file,
            )?);
        }

        flags.parse_from(self.args.iter().cloned())?;

        let fields = resolvers
            .iter_mut()
            .map(|resolver| resolver.resolve(&flags))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Loaded {} configuration fields for {}",
            fields.len(),
            self.program
        );
        Ok((fields, flags))
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("program", &self.program)
            .field("environment", &self.environment.name())
            .field("env_file", &self.env_file)
            .field("args", &self.args)
            .finish()
    }
}

/// Where the builder takes env file entries from.
enum EnvFileSource {
    Path(PathBuf),
    Values(HashMap<String, String>),
    DefaultLocation { app_name: String, qualifier: String },
}

/// Builder for constructing a [`ConfigLoader`].
///
/// Unless overridden, the loader reads the process environment, uses no env file, and
/// parses the process arguments.
///
/// # Examples
///
/// ```rust,no_run
/// use stratacfg::service::ConfigLoader;
///
/// # fn main() -> stratacfg::domain::Result<()> {
/// let loader = ConfigLoader::builder()
///     .with_program_name("server")
///     .with_env_file(".env")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ConfigLoaderBuilder {
    program: Option<String>,
    environment: Option<Box<dyn ConfigSource>>,
    env_file: Option<EnvFileSource>,
    args: Option<Vec<OsString>>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the program name shown in flag help.
    pub fn with_program_name(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Replaces the OS environment with another source.
    pub fn with_environment(mut self, environment: Box<dyn ConfigSource>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Reads a fixed set of variables instead of the process environment.
    pub fn with_env_vars(self, vars: HashMap<String, String>) -> Self {
        self.with_environment(Box::new(EnvVarAdapter::with_values(vars)))
    }

    /// Reads env file entries from `path`. A missing file yields no entries.
    pub fn with_env_file(mut self, path: impl AsRef<Path>) -> Self {
        self.env_file = Some(EnvFileSource::Path(path.as_ref().to_path_buf()));
        self
    }

    /// Uses already-parsed env file entries.
    pub fn with_env_values(mut self, values: HashMap<String, String>) -> Self {
        self.env_file = Some(EnvFileSource::Values(values));
        self
    }

    /// Reads the env file from the platform configuration directory of the application.
    pub fn with_default_env_file(mut self, app_name: &str, qualifier: &str) -> Self {
        self.env_file = Some(EnvFileSource::DefaultLocation {
            app_name: app_name.to_string(),
            qualifier: qualifier.to_string(),
        });
        self
    }

    /// Sets the command-line arguments, without the program name.
    pub fn with_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the loader, reading the env file if one was configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the env file exists but cannot be read or parsed.
    pub fn build(self) -> Result<ConfigLoader> {
        let env_file = match self.env_file {
            None => DotenvFile::empty(),
            Some(EnvFileSource::Path(path)) => DotenvFile::load_or_empty(path)?,
            Some(EnvFileSource::Values(values)) => DotenvFile::from_values(values),
            Some(EnvFileSource::DefaultLocation {
                app_name,
                qualifier,
            }) => DotenvFile::from_default_location(&app_name, &qualifier)?,
        };

        Ok(ConfigLoader {
            program: self.program.unwrap_or_else(default_program_name),
            environment: self
                .environment
                .unwrap_or_else(|| Box::new(EnvVarAdapter::new())),
            env_file,
            args: self
                .args
                .unwrap_or_else(|| std::env::args_os().skip(1).collect()),
        })
    }
}

fn default_program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_stem)
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_PROGRAM_NAME.to_string())
}
