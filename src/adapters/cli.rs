// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line flag registry.
//!
//! Fields register one long flag each (`--name=value` or `--name value`). Boolean flags
//! may also be given bare (`--verbose`) or with an explicit value (`--verbose=false`).
//! Parsing stops at the first positional argument; it and everything after it are kept
//! as positional arguments.

use crate::domain::config_value::{parse_bool, parse_float, parse_int};
use crate::domain::{ConfigError, ConfigValue, FieldKind, Result, Timestamp};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashMap;
use std::ffi::OsString;

/// Argument id collecting positional arguments.
const POSITIONAL_ID: &str = "__positional";

/// Flag names the parser claims for itself.
const RESERVED_FLAGS: [&str; 1] = ["help"];

/// An explicit registry of command-line flags, built on `clap`.
///
/// Flags are registered with a typed default and a description, then parsed once.
/// After parsing, [`FlagRegistry::current_value`] returns each flag's value, which is
/// the default when the flag was not given.
///
/// # Examples
///
/// ```rust
/// use stratacfg::adapters::FlagRegistry;
/// use stratacfg::domain::ConfigValue;
///
/// let mut flags = FlagRegistry::new("server");
/// flags.register_int("port", 8080, "Port to listen on").unwrap();
/// flags.register_bool("verbose", false, "Verbose logging").unwrap();
///
/// flags.parse_from(["--port=6060", "--verbose"]).unwrap();
///
/// assert_eq!(flags.current_value("port"), Some(ConfigValue::Int(6060)));
/// assert_eq!(flags.current_bool("verbose"), Some(true));
/// ```
#[derive(Debug, Clone)]
pub struct FlagRegistry {
    /// Program name shown in help output
    program: String,
    /// Registered flags, in registration order
    args: Vec<Arg>,
    /// Kind of every registered flag
    kinds: HashMap<String, FieldKind>,
    /// Parse result, once parsed
    matches: Option<ArgMatches>,
}

impl FlagRegistry {
    /// Creates an empty registry.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            kinds: HashMap::new(),
            matches: None,
        }
    }

    /// Registers a flag of `kind` whose default is given in string form.
    ///
    /// Registration after parsing is ignored, matching a registry that has already
    /// been consumed.
    pub fn register(
        &mut self,
        name: &str,
        kind: FieldKind,
        default: &str,
        description: &str,
    ) -> Result<()> {
        if self.is_parsed() {
            tracing::debug!("Flags already parsed; not registering --{}", name);
            return Ok(());
        }

        if name.is_empty()
            || name.starts_with('-')
            || name.contains('=')
            || name == POSITIONAL_ID
            || RESERVED_FLAGS.contains(&name)
        {
            return Err(ConfigError::InvalidFlagName {
                name: name.to_string(),
            });
        }

        if self.kinds.contains_key(name) {
            return Err(ConfigError::DuplicateFlag {
                name: name.to_string(),
            });
        }

        let arg = Arg::new(name.to_string())
            .long(name.to_string())
            .help(description.to_string())
            .action(ArgAction::Set)
            .default_value(default.to_string());

        let arg = match kind {
            FieldKind::Bool => arg
                .value_parser(bool_flag)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true"),
            FieldKind::Int => arg.value_parser(int_flag).allow_negative_numbers(true),
            FieldKind::Float => arg.value_parser(float_flag).allow_negative_numbers(true),
            // Timestamps stay raw until read back; a bad default must not fail parsing.
            FieldKind::String | FieldKind::Time => arg,
        };

        tracing::trace!("Registered --{} ({}, default '{}')", name, kind, default);

        self.args.push(arg);
        self.kinds.insert(name.to_string(), kind);
        Ok(())
    }

    /// Registers a boolean flag.
    pub fn register_bool(&mut self, name: &str, default: bool, description: &str) -> Result<()> {
        self.register(name, FieldKind::Bool, &default.to_string(), description)
    }

    /// Registers an integer flag.
    pub fn register_int(&mut self, name: &str, default: i64, description: &str) -> Result<()> {
        self.register(name, FieldKind::Int, &default.to_string(), description)
    }

    /// Registers a float flag.
    pub fn register_float(&mut self, name: &str, default: f64, description: &str) -> Result<()> {
        self.register(name, FieldKind::Float, &default.to_string(), description)
    }

    /// Registers a string flag.
    pub fn register_string(&mut self, name: &str, default: &str, description: &str) -> Result<()> {
        self.register(name, FieldKind::String, default, description)
    }

    /// Registers a timestamp flag. The default is kept in its raw form.
    pub fn register_time(&mut self, name: &str, default: &str, description: &str) -> Result<()> {
        self.register(name, FieldKind::Time, default, description)
    }

    /// Returns true if a flag with this name is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Returns the kind of a registered flag.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.kinds.get(name).copied()
    }

    /// Returns the number of registered flags.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if no flags are registered.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns true once the arguments have been parsed.
    pub fn is_parsed(&self) -> bool {
        self.matches.is_some()
    }

    /// Builds the `clap` command describing every registered flag.
    pub fn command(&self) -> Command {
        Command::new(self.program.clone())
            .no_binary_name(true)
            .args(self.args.iter().cloned())
            .arg(
                Arg::new(POSITIONAL_ID)
                    .value_name("ARGS")
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .trailing_var_arg(true)
                    .hide(true),
            )
    }

    /// Renders the help text for the registered flags.
    pub fn render_help(&self) -> String {
        self.command().render_help().to_string()
    }

    /// Parses `args`, which must not include the program name.
    ///
    /// Unknown flags, malformed values, and `--help` are reported as
    /// `ConfigError::FlagError`.
    pub fn parse_from<I, T>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;
        self.matches = Some(matches);
        Ok(())
    }

    /// Parses the process arguments, skipping the program name.
    pub fn parse_env_args(&mut self) -> Result<()> {
        self.parse_from(std::env::args_os().skip(1))
    }

    /// Returns a flag's current value, typed by its kind.
    ///
    /// Returns `None` before parsing or for unknown flags. Timestamp flags that match no
    /// layout read back as the zero timestamp.
    pub fn current_value(&self, name: &str) -> Option<ConfigValue> {
        let matches = self.matches.as_ref()?;
        match self.kind_of(name)? {
            FieldKind::Bool => one::<bool>(matches, name).map(ConfigValue::Bool),
            FieldKind::Int => one::<i64>(matches, name).map(ConfigValue::Int),
            FieldKind::Float => one::<f64>(matches, name).map(ConfigValue::Float),
            FieldKind::String => one::<String>(matches, name).map(ConfigValue::String),
            FieldKind::Time => one::<String>(matches, name)
                .map(|raw| ConfigValue::Time(Timestamp::parse(&raw))),
        }
    }

    /// Returns a flag's current value as the string it was given in.
    pub fn raw_value(&self, name: &str) -> Option<String> {
        let matches = self.matches.as_ref()?;
        let mut raw = matches.try_get_raw(name).ok().flatten()?;
        raw.next().and_then(|value| value.to_str()).map(str::to_string)
    }

    /// Returns a boolean flag's current value.
    pub fn current_bool(&self, name: &str) -> Option<bool> {
        self.current_value(name).and_then(|value| value.as_bool())
    }

    /// Returns an integer flag's current value.
    pub fn current_int(&self, name: &str) -> Option<i64> {
        self.current_value(name).and_then(|value| value.as_int())
    }

    /// Returns a float flag's current value.
    pub fn current_float(&self, name: &str) -> Option<f64> {
        self.current_value(name).and_then(|value| value.as_float())
    }

    /// Returns a string flag's current value.
    pub fn current_string(&self, name: &str) -> Option<String> {
        match self.current_value(name)? {
            ConfigValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a timestamp flag's current value.
    pub fn current_time(&self, name: &str) -> Option<Timestamp> {
        self.current_value(name).and_then(|value| value.as_time())
    }

    /// Returns the arguments left over after the flags.
    pub fn positional_args(&self) -> Vec<String> {
        self.matches
            .as_ref()
            .and_then(|matches| matches.try_get_many::<String>(POSITIONAL_ID).ok().flatten())
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    }
}

fn one<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches.try_get_one::<T>(name).ok().flatten().cloned()
}

fn bool_flag(value: &str) -> Result<bool> {
    parse_bool("flag", value)
}

fn int_flag(value: &str) -> Result<i64> {
    parse_int("flag", value)
}

fn float_flag(value: &str) -> Result<f64> {
    parse_float("flag", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FlagRegistry {
        let mut flags = FlagRegistry::new("test");
        flags.register_int("port", 8080, "Port").unwrap();
        flags.register_bool("verbose", false, "Verbose").unwrap();
        flags.register_float("ratio", 0.5, "Ratio").unwrap();
        flags.register_string("host", "localhost", "Host").unwrap();
        flags.register_time("since", "2006-01-02", "Since").unwrap();
        flags
    }

    #[test]
    fn test_defaults_when_not_given() {
        let mut flags = registry();
        flags.parse_from(Vec::<String>::new()).unwrap();

        assert_eq!(flags.current_int("port"), Some(8080));
        assert_eq!(flags.current_bool("verbose"), Some(false));
        assert_eq!(flags.current_float("ratio"), Some(0.5));
        assert_eq!(flags.current_string("host").as_deref(), Some("localhost"));
        assert_eq!(flags.current_time("since"), Some(Timestamp::parse("2006-01-02")));
        assert_eq!(flags.raw_value("since").as_deref(), Some("2006-01-02"));
    }

    #[test]
    fn test_long_form_equals_and_space() {
        let mut flags = registry();
        flags
            .parse_from(["--port=6060", "--host", "example.org", "--ratio=1.25"])
            .unwrap();

        assert_eq!(flags.current_int("port"), Some(6060));
        assert_eq!(flags.current_string("host").as_deref(), Some("example.org"));
        assert_eq!(flags.current_float("ratio"), Some(1.25));
    }

    #[test]
    fn test_bool_flag_forms() {
        let mut flags = registry();
        flags.parse_from(["--verbose"]).unwrap();
        assert_eq!(flags.current_bool("verbose"), Some(true));

        let mut flags = registry();
        flags.parse_from(["--verbose=F"]).unwrap();
        assert_eq!(flags.current_bool("verbose"), Some(false));

        let mut flags = registry();
        flags.parse_from(["--verbose=1"]).unwrap();
        assert_eq!(flags.current_bool("verbose"), Some(true));
    }

    #[test]
    fn test_time_flag() {
        let mut flags = registry();
        flags.parse_from(["--since=2006-01-02T15:04:05Z"]).unwrap();
        assert_eq!(
            flags.current_time("since"),
            Some(Timestamp::parse("2006-01-02T15:04:05Z"))
        );

        let mut flags = registry();
        flags.parse_from(["--since=whenever"]).unwrap();
        assert_eq!(flags.current_time("since"), Some(Timestamp::zero()));
    }

    #[test]
    fn test_negative_numbers_with_space_form() {
        let mut flags = registry();
        flags.parse_from(["--port", "-5", "--ratio", "-0.25"]).unwrap();

        assert_eq!(flags.current_int("port"), Some(-5));
        assert_eq!(flags.current_float("ratio"), Some(-0.25));
    }

    #[test]
    fn test_invalid_int_value_is_error() {
        let mut flags = registry();
        let result = flags.parse_from(["--port=eighty"]);
        assert!(matches!(result, Err(ConfigError::FlagError(_))));
        assert!(!flags.is_parsed());
    }

    #[test]
    fn test_unknown_flag_is_error() {
        let mut flags = registry();
        let result = flags.parse_from(["--nope=1"]);
        assert!(matches!(result, Err(ConfigError::FlagError(_))));
    }

    #[test]
    fn test_help_is_reported_as_error() {
        let mut flags = registry();
        match flags.parse_from(["--help"]) {
            Err(ConfigError::FlagError(e)) => {
                assert_eq!(e.kind(), clap::error::ErrorKind::DisplayHelp)
            }
            other => panic!("expected help, got {:?}", other),
        }
    }

    #[test]
    fn test_positional_args_stop_flag_parsing() {
        let mut flags = registry();
        flags
            .parse_from(["--port=1", "serve", "--port=2", "extra"])
            .unwrap();

        assert_eq!(flags.current_int("port"), Some(1));
        assert_eq!(flags.positional_args(), vec!["serve", "--port=2", "extra"]);
    }

    #[test]
    fn test_duplicate_flag_is_error() {
        let mut flags = registry();
        let result = flags.register_int("port", 1, "again");
        assert!(matches!(result, Err(ConfigError::DuplicateFlag { .. })));
    }

    #[test]
    fn test_reserved_and_invalid_names() {
        let mut flags = FlagRegistry::new("test");
        for name in ["help", "", "-x", "a=b"] {
            let result = flags.register_string(name, "", "");
            assert!(
                matches!(result, Err(ConfigError::InvalidFlagName { .. })),
                "expected '{}' to be rejected",
                name
            );
        }
    }

    #[test]
    fn test_register_after_parse_is_ignored() {
        let mut flags = registry();
        flags.parse_from(Vec::<String>::new()).unwrap();
        flags.register_int("late", 1, "too late").unwrap();

        assert!(!flags.is_registered("late"));
        assert_eq!(flags.current_value("late"), None);
    }

    #[test]
    fn test_values_unavailable_before_parse() {
        let flags = registry();
        assert!(!flags.is_parsed());
        assert_eq!(flags.current_value("port"), None);
        assert_eq!(flags.raw_value("port"), None);
        assert!(flags.positional_args().is_empty());
    }

    #[test]
    fn test_kind_and_len() {
        let flags = registry();
        assert_eq!(flags.len(), 5);
        assert!(!flags.is_empty());
        assert_eq!(flags.kind_of("since"), Some(FieldKind::Time));
        assert_eq!(flags.kind_of("missing"), None);
    }

    #[test]
    fn test_render_help_lists_flags() {
        let help = registry().render_help();
        assert!(help.contains("--port"));
        assert!(help.contains("Port"));
        assert!(help.contains("--verbose"));
        assert!(!help.contains(POSITIONAL_ID));
    }
}
