// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-field resolution.
//!
//! A [`FieldResolver`] owns one bound field. It validates the field's metadata, registers
//! its flag, writes the default, and later overlays values from the environment, the env
//! file and the command line, in that order.

use crate::adapters::FlagRegistry;
use crate::domain::config_value::parse_bool;
use crate::domain::field::{FieldSlot, Storage};
use crate::domain::{ConfigError, ConfigValue, FieldBinding, FieldKind, Result, Timestamp};
use crate::ports::ConfigSource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The source that supplied a field's final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrigin {
    /// The declared default.
    Default,
    /// An OS environment variable.
    Environment,
    /// An entry of the env file.
    EnvFile,
    /// A command-line flag.
    Flag,
}

impl fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueOrigin::Default => "default",
            ValueOrigin::Environment => "environment",
            ValueOrigin::EnvFile => "env file",
            ValueOrigin::Flag => "flag",
        })
    }
}

/// The outcome of resolving one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedField {
    /// The field name
    pub field: String,
    /// The field's flag name
    pub flag: String,
    /// The value written into the field
    pub value: ConfigValue,
    /// Where the value came from
    pub origin: ValueOrigin,
}

/// Resolves a single configuration field against every source.
pub struct FieldResolver<'a> {
    field_name: String,
    kind: FieldKind,
    flag_name: String,
    env_name: Option<String>,
    default_value: String,
    description: String,
    slot: FieldSlot<'a>,
    environment: &'a dyn ConfigSource,
    env_file: &'a dyn ConfigSource,
}

impl<'a> FieldResolver<'a> {
    /// Validates `binding`, registers its flag and writes its default into the field.
    ///
    /// # Errors
    ///
    /// - `ConfigError::CantSet` if the field was bound read-only
    /// - `ConfigError::NoFlagName` if no flag name was declared
    /// - `ConfigError::UnsupportedType` if the field type is not a supported kind
    /// - `ConfigError::DuplicateFlag` or `ConfigError::InvalidFlagName` from registration
    pub fn new(
        binding: FieldBinding<'a>,
        flags: &mut FlagRegistry,
        environment: &'a dyn ConfigSource,
        env_file: &'a dyn ConfigSource,
    ) -> Result<Self> {
        let kind = binding.kind();
        let parts = binding.into_parts();

        let storage = match parts.storage {
            Storage::Writable(storage) => storage,
            Storage::ReadOnly => return Err(ConfigError::CantSet { field: parts.name }),
        };

        let flag_name = match parts.flag {
            Some(flag) if !flag.is_empty() => flag,
            _ => return Err(ConfigError::NoFlagName { field: parts.name }),
        };

        let unsupported = || ConfigError::UnsupportedType {
            field: parts.name.clone(),
            type_name: parts.type_name.to_string(),
        };
        let kind = kind.ok_or_else(unsupported)?;
        let slot = FieldSlot::downcast(kind, storage).ok_or_else(unsupported)?;

        let mut resolver = Self {
            field_name: parts.name,
            kind,
            flag_name,
            env_name: parts.env.filter(|env| !env.is_empty()),
            default_value: parts.default,
            description: parts.description,
            slot,
            environment,
            env_file,
        };

        let flag_default = match kind {
            FieldKind::Time => resolver.default_value.clone(),
            _ => kind.coerce(&resolver.default_value).to_string(),
        };
        flags.register(
            &resolver.flag_name,
            kind,
            &flag_default,
            &resolver.description,
        )?;
        resolver.set_default_value_on_config()?;

        tracing::trace!(
            "Bound field {} ({}) to --{}",
            resolver.field_name,
            kind,
            resolver.flag_name
        );
        Ok(resolver)
    }

    /// Returns the field name.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the normalized type name: `bool`, `int`, `float64`, `string` or `time`.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Returns the flag name.
    pub fn flag_name(&self) -> &str {
        &self.flag_name
    }

    /// Returns the environment variable name, if any.
    pub fn env_name(&self) -> Option<&str> {
        self.env_name.as_deref()
    }

    /// Returns the raw default value.
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    /// Returns the flag description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns true for boolean fields.
    pub fn is_bool(&self) -> bool {
        self.kind == FieldKind::Bool
    }

    /// Returns true for integer fields.
    pub fn is_int(&self) -> bool {
        self.kind == FieldKind::Int
    }

    /// Returns true for float fields.
    pub fn is_float(&self) -> bool {
        self.kind == FieldKind::Float
    }

    /// Returns true for string fields.
    pub fn is_string(&self) -> bool {
        self.kind == FieldKind::String
    }

    /// Returns true for timestamp fields.
    pub fn is_time(&self) -> bool {
        self.kind == FieldKind::Time
    }

    /// Returns the value currently held by the field.
    pub fn value(&self) -> ConfigValue {
        match &self.slot {
            FieldSlot::Bool(value) => ConfigValue::Bool(**value),
            FieldSlot::Int(value) => ConfigValue::Int(**value),
            FieldSlot::Float(value) => ConfigValue::Float(**value),
            FieldSlot::String(value) => ConfigValue::String(value.to_string()),
            FieldSlot::Time(value) => ConfigValue::Time(**value),
        }
    }

    fn parse_found(&self, source: &str, key: &str, raw: &str) -> Option<ConfigValue> {
        match self.kind.parse(key, raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(
                    "Ignoring {} value for {} (field {}): {}",
                    source,
                    key,
                    self.field_name,
                    e
                );
                None
            }
        }
    }

    /// Returns the environment variable's value parsed as the field's kind.
    ///
    /// Unset or empty variables and values that fail to parse are not found.
    pub fn env_value(&self) -> Option<ConfigValue> {
        let key = self.env_name.as_deref()?;
        let raw = self.environment.get(key).filter(|raw| !raw.is_empty())?;
        self.parse_found(self.environment.name(), key, &raw)
    }

    /// Environment value of a boolean field.
    pub fn env_bool(&self) -> Option<bool> {
        self.env_value().and_then(|value| value.as_bool())
    }

    /// Environment value of an integer field.
    pub fn env_int(&self) -> Option<i64> {
        self.env_value().and_then(|value| value.as_int())
    }

    /// Environment value of a float field.
    pub fn env_float(&self) -> Option<f64> {
        self.env_value().and_then(|value| value.as_float())
    }

    /// Environment value of a string field.
    pub fn env_string(&self) -> Option<String> {
        self.env_value()
            .and_then(|value| value.as_str().map(str::to_string))
    }

    /// Environment value of a timestamp field.
    pub fn env_time(&self) -> Option<Timestamp> {
        self.env_value().and_then(|value| value.as_time())
    }

    /// Returns the env file entry parsed as the field's kind.
    ///
    /// An entry with an empty value is present; entries that fail to parse are not found.
    pub fn env_file_value(&self) -> Option<ConfigValue> {
        let key = self.env_name.as_deref()?;
        let raw = self.env_file.get(key)?;
        self.parse_found(self.env_file.name(), key, &raw)
    }

    /// Env file value of a boolean field.
    pub fn env_file_bool(&self) -> Option<bool> {
        self.env_file_value().and_then(|value| value.as_bool())
    }

    /// Env file value of an integer field.
    pub fn env_file_int(&self) -> Option<i64> {
        self.env_file_value().and_then(|value| value.as_int())
    }

    /// Env file value of a float field.
    pub fn env_file_float(&self) -> Option<f64> {
        self.env_file_value().and_then(|value| value.as_float())
    }

    /// Env file value of a string field.
    pub fn env_file_string(&self) -> Option<String> {
        self.env_file_value()
            .and_then(|value| value.as_str().map(str::to_string))
    }

    /// Env file value of a timestamp field.
    pub fn env_file_time(&self) -> Option<Timestamp> {
        self.env_file_value().and_then(|value| value.as_time())
    }

    /// Returns the flag's value if it differs from the default.
    ///
    /// A flag passed with exactly its default value cannot be told apart from an absent
    /// flag and is reported as not found. A timestamp flag that matches no layout is not
    /// found either.
    pub fn flag_value(&self, flags: &FlagRegistry) -> Option<ConfigValue> {
        let current = flags.current_value(&self.flag_name)?;
        if let ConfigValue::Time(timestamp) = &current {
            if timestamp.is_zero() {
                return None;
            }
        }
        (current != self.kind.coerce(&self.default_value)).then_some(current)
    }

    /// Flag value of a boolean field.
    pub fn flag_bool(&self, flags: &FlagRegistry) -> Option<bool> {
        self.flag_value(flags).and_then(|value| value.as_bool())
    }

    /// Flag value of an integer field.
    pub fn flag_int(&self, flags: &FlagRegistry) -> Option<i64> {
        self.flag_value(flags).and_then(|value| value.as_int())
    }

    /// Flag value of a float field.
    pub fn flag_float(&self, flags: &FlagRegistry) -> Option<f64> {
        self.flag_value(flags).and_then(|value| value.as_float())
    }

    /// Flag value of a string field.
    pub fn flag_string(&self, flags: &FlagRegistry) -> Option<String> {
        self.flag_value(flags)
            .and_then(|value| value.as_str().map(str::to_string))
    }

    /// Flag value of a timestamp field.
    pub fn flag_time(&self, flags: &FlagRegistry) -> Option<Timestamp> {
        self.flag_value(flags).and_then(|value| value.as_time())
    }

    /// The default as a boolean, `false` if it does not parse.
    pub fn default_value_to_bool(&self) -> bool {
        parse_bool("default", &self.default_value).unwrap_or(false)
    }

    /// The default as a float, `0.0` if it does not parse.
    pub fn default_value_to_float(&self) -> f64 {
        FieldKind::Float
            .coerce(&self.default_value)
            .as_float()
            .unwrap_or_default()
    }

    /// The default as an integer, `0` if it does not parse.
    pub fn default_value_to_int(&self) -> i64 {
        FieldKind::Int
            .coerce(&self.default_value)
            .as_int()
            .unwrap_or_default()
    }

    /// The default as a string.
    pub fn default_value_to_string(&self) -> String {
        self.default_value.clone()
    }

    /// The default as a timestamp, zero if it matches no layout.
    pub fn default_value_to_time(&self) -> Timestamp {
        Timestamp::parse(&self.default_value)
    }

    /// Writes a boolean into the field.
    pub fn set_config_bool(&mut self, value: bool) -> Result<()> {
        self.apply(ConfigValue::Bool(value))
    }

    /// Writes a float into the field.
    pub fn set_config_float(&mut self, value: f64) -> Result<()> {
        self.apply(ConfigValue::Float(value))
    }

    /// Writes an integer into the field.
    pub fn set_config_int(&mut self, value: i64) -> Result<()> {
        self.apply(ConfigValue::Int(value))
    }

    /// Writes a string into the field.
    pub fn set_config_string(&mut self, value: impl Into<String>) -> Result<()> {
        self.apply(ConfigValue::String(value.into()))
    }

    /// Writes a timestamp into the field.
    pub fn set_config_time(&mut self, value: Timestamp) -> Result<()> {
        self.apply(ConfigValue::Time(value))
    }

    /// Writes `value` into the field.
    ///
    /// Returns `ConfigError::TypeMismatch` if `value` is not of the field's kind.
    pub fn apply(&mut self, value: ConfigValue) -> Result<()> {
        match (&mut self.slot, value) {
            (FieldSlot::Bool(slot), ConfigValue::Bool(value)) => **slot = value,
            (FieldSlot::Int(slot), ConfigValue::Int(value)) => **slot = value,
            (FieldSlot::Float(slot), ConfigValue::Float(value)) => **slot = value,
            (FieldSlot::String(slot), ConfigValue::String(value)) => **slot = value,
            (FieldSlot::Time(slot), ConfigValue::Time(value)) => **slot = value,
            (_, value) => {
                return Err(ConfigError::TypeMismatch {
                    field: self.field_name.clone(),
                    expected: self.kind,
                    found: value.kind(),
                })
            }
        }
        Ok(())
    }

    /// Writes the coerced default into the field.
    pub fn set_default_value_on_config(&mut self) -> Result<()> {
        let value = self.kind.coerce(&self.default_value);
        self.apply(value)
    }

    /// Overlays the environment, the env file and the flag onto the field, in that order.
    pub fn resolve(&mut self, flags: &FlagRegistry) -> Result<ResolvedField> {
        let mut origin = ValueOrigin::Default;

        if let Some(value) = self.env_value() {
            self.apply(value)?;
            origin = ValueOrigin::Environment;
        }
        if let Some(value) = self.env_file_value() {
            self.apply(value)?;
            origin = ValueOrigin::EnvFile;
        }
        if let Some(value) = self.flag_value(flags) {
            self.apply(value)?;
            origin = ValueOrigin::Flag;
        }

        let value = self.value();
        tracing::debug!("Field {} = {} (from {})", self.field_name, value, origin);

        Ok(ResolvedField {
            field: self.field_name.clone(),
            flag: self.flag_name.clone(),
            value,
            origin,
        })
    }
}

impl fmt::Debug for FieldResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldResolver")
            .field("field_name", &self.field_name)
            .field("kind", &self.kind)
            .field("flag_name", &self.flag_name)
            .field("env_name", &self.env_name)
            .field("default_value", &self.default_value)
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{DotenvFile, EnvVarAdapter};
    use std::collections::HashMap;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn no_env() -> EnvVarAdapter {
        EnvVarAdapter::with_values(HashMap::new())
    }

    #[test]
    fn test_new_writes_default() {
        let env = no_env();
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let mut port: i64 = 0;

        let resolver = FieldResolver::new(
            FieldBinding::new("port", &mut port).flag("port").default("8080"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();

        assert!(resolver.is_int());
        assert!(!resolver.is_bool());
        assert_eq!(resolver.type_name(), "int");
        assert_eq!(resolver.value(), ConfigValue::Int(8080));
        assert!(flags.is_registered("port"));
        drop(resolver);
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_read_only_checked_before_flag() {
        let env = no_env();
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let port: i64 = 0;

        let result = FieldResolver::new(
            FieldBinding::read_only("port", &port),
            &mut flags,
            &env,
            &file,
        );
        assert!(matches!(result, Err(ConfigError::CantSet { .. })));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_missing_flag_name() {
        let env = no_env();
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let mut host = String::new();

        let result = FieldResolver::new(
            FieldBinding::new("host", &mut host).env("HOST"),
            &mut flags,
            &env,
            &file,
        );
        assert!(matches!(result, Err(ConfigError::NoFlagName { field }) if field == "host"));
    }

    #[test]
    fn test_unsupported_type() {
        let env = no_env();
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let mut count: u32 = 0;

        let result = FieldResolver::new(
            FieldBinding::new("count", &mut count).flag("count"),
            &mut flags,
            &env,
            &file,
        );
        match result {
            Err(ConfigError::UnsupportedType { field, type_name }) => {
                assert_eq!(field, "count");
                assert_eq!(type_name, "u32");
            }
            other => panic!("expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_defaults_become_zero() {
        let env = no_env();
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let mut port: i64 = 5;
        let mut ratio: f64 = 5.0;
        let mut debug = true;

        let port_resolver = FieldResolver::new(
            FieldBinding::new("port", &mut port).flag("port").default("eighty"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        let ratio_resolver = FieldResolver::new(
            FieldBinding::new("ratio", &mut ratio).flag("ratio").default("half"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        let debug_resolver = FieldResolver::new(
            FieldBinding::new("debug", &mut debug).flag("debug").default("yes"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();

        assert_eq!(port_resolver.default_value_to_int(), 0);
        assert_eq!(ratio_resolver.default_value_to_float(), 0.0);
        assert!(!debug_resolver.default_value_to_bool());
        drop((port_resolver, ratio_resolver, debug_resolver));

        assert_eq!(port, 0);
        assert_eq!(ratio, 0.0);
        assert!(!debug);
    }

    #[test]
    fn test_env_value_parsing() {
        let env = EnvVarAdapter::with_values(map(&[
            ("PORT", "9090"),
            ("BAD_PORT", "ninety"),
            ("EMPTY_PORT", ""),
        ]));
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let (mut a, mut b, mut c, mut d) = (0i64, 0i64, 0i64, 0i64);

        let good = FieldResolver::new(
            FieldBinding::new("a", &mut a).flag("a").env("PORT"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        let bad = FieldResolver::new(
            FieldBinding::new("b", &mut b).flag("b").env("BAD_PORT"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        let empty = FieldResolver::new(
            FieldBinding::new("c", &mut c).flag("c").env("EMPTY_PORT"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        let none = FieldResolver::new(
            FieldBinding::new("d", &mut d).flag("d"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();

        assert_eq!(good.env_int(), Some(9090));
        assert_eq!(bad.env_int(), None);
        assert_eq!(empty.env_int(), None);
        assert_eq!(none.env_value(), None);
        assert_eq!(good.env_bool(), None);
    }

    #[test]
    fn test_env_file_empty_value_is_present() {
        let env = no_env();
        let file = DotenvFile::from_values(map(&[("NAME", ""), ("PORT", "7070")]));
        let mut flags = FlagRegistry::new("test");
        let mut name = String::from("unset");
        let mut port = 0i64;

        let name_resolver = FieldResolver::new(
            FieldBinding::new("name", &mut name).flag("name").env("NAME").default("app"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        let port_resolver = FieldResolver::new(
            FieldBinding::new("port", &mut port).flag("port").env("PORT"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();

        assert_eq!(name_resolver.env_file_string().as_deref(), Some(""));
        assert_eq!(port_resolver.env_file_int(), Some(7070));
        assert_eq!(port_resolver.env_file_float(), None);
    }

    #[test]
    fn test_flag_equal_to_default_is_not_found() {
        let env = no_env();
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let mut port = 0i64;

        let resolver = FieldResolver::new(
            FieldBinding::new("port", &mut port).flag("port").default("8080"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        flags.parse_from(["--port=8080"]).unwrap();

        assert_eq!(resolver.flag_int(&flags), None);
    }

    #[test]
    fn test_flag_time_value() {
        let env = no_env();
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let mut since = Timestamp::zero();

        let resolver = FieldResolver::new(
            FieldBinding::new("since", &mut since).flag("since").default("2006-01-02"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        flags.parse_from(["--since=2010-05-06 07:08:09"]).unwrap();

        assert!(resolver.is_time());
        assert_eq!(
            resolver.flag_time(&flags),
            Some(Timestamp::parse("2010-05-06T07:08:09Z"))
        );
        assert_eq!(resolver.default_value_to_time(), Timestamp::parse("2006-01-02"));
    }

    #[test]
    fn test_apply_type_mismatch() {
        let env = no_env();
        let file = DotenvFile::empty();
        let mut flags = FlagRegistry::new("test");
        let mut host = String::new();

        let mut resolver = FieldResolver::new(
            FieldBinding::new("host", &mut host).flag("host"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();

        let result = resolver.set_config_int(1);
        assert!(matches!(
            result,
            Err(ConfigError::TypeMismatch {
                expected: FieldKind::String,
                found: FieldKind::Int,
                ..
            })
        ));

        resolver.set_config_string("example.org").unwrap();
        assert_eq!(resolver.value(), ConfigValue::String("example.org".to_string()));
    }

    #[test]
    fn test_resolve_reports_origin() {
        let env = EnvVarAdapter::with_values(map(&[("DEBUG", "true"), ("PORT", "9090")]));
        let file = DotenvFile::from_values(map(&[("PORT", "7070")]));
        let mut flags = FlagRegistry::new("test");
        let mut debug = false;
        let mut port = 0i64;
        let mut host = String::new();

        let mut debug_resolver = FieldResolver::new(
            FieldBinding::new("debug", &mut debug).flag("debug").env("DEBUG"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        let mut port_resolver = FieldResolver::new(
            FieldBinding::new("port", &mut port).flag("port").env("PORT").default("8080"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        let mut host_resolver = FieldResolver::new(
            FieldBinding::new("host", &mut host).flag("host").default("localhost"),
            &mut flags,
            &env,
            &file,
        )
        .unwrap();
        flags.parse_from(["--host=example.org"]).unwrap();

        let debug_field = debug_resolver.resolve(&flags).unwrap();
        let port_field = port_resolver.resolve(&flags).unwrap();
        let host_field = host_resolver.resolve(&flags).unwrap();

        assert_eq!(debug_field.origin, ValueOrigin::Environment);
        assert_eq!(debug_field.value, ConfigValue::Bool(true));
        assert_eq!(port_field.origin, ValueOrigin::EnvFile);
        assert_eq!(port_field.value, ConfigValue::Int(7070));
        assert_eq!(host_field.origin, ValueOrigin::Flag);
        assert_eq!(host_field.flag, "host");

        drop((debug_resolver, port_resolver, host_resolver));
        assert!(debug);
        assert_eq!(port, 7070);
        assert_eq!(host, "example.org");
    }

    #[test]
    fn test_value_origin_display() {
        assert_eq!(ValueOrigin::Default.to_string(), "default");
        assert_eq!(ValueOrigin::EnvFile.to_string(), "env file");
    }
}
