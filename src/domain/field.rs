// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field declarations.
//!
//! A [`FieldBinding`] pairs a borrowed struct field with the metadata that tells the
//! resolver where its value may come from: a flag name, an environment variable name,
//! a default, and a help description. The field's [`FieldKind`] is discovered once,
//! from its Rust type, when the binding is created.

use crate::domain::config_value::{parse_bool, parse_float, parse_int, parse_time, ConfigValue};
use crate::domain::errors::Result;
use crate::domain::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;

/// The closed set of field types a configuration structure may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `f64`
    Float,
    /// `String`
    String,
    /// [`Timestamp`]
    Time,
}

impl FieldKind {
    /// Maps a Rust type to its kind, or `None` for unsupported types.
    pub fn of<T: Any>() -> Option<Self> {
        Self::from_type_id(TypeId::of::<T>())
    }

    fn from_type_id(id: TypeId) -> Option<Self> {
        if id == TypeId::of::<bool>() {
            Some(FieldKind::Bool)
        } else if id == TypeId::of::<i64>() {
            Some(FieldKind::Int)
        } else if id == TypeId::of::<f64>() {
            Some(FieldKind::Float)
        } else if id == TypeId::of::<String>() {
            Some(FieldKind::String)
        } else if id == TypeId::of::<Timestamp>() {
            Some(FieldKind::Time)
        } else {
            None
        }
    }

    /// Returns the normalized type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Float => "float64",
            FieldKind::String => "string",
            FieldKind::Time => "time",
        }
    }

    /// Parses `value` as this kind. `key` names the value in errors.
    pub fn parse(&self, key: &str, value: &str) -> Result<ConfigValue> {
        Ok(match self {
            FieldKind::Bool => ConfigValue::Bool(parse_bool(key, value)?),
            FieldKind::Int => ConfigValue::Int(parse_int(key, value)?),
            FieldKind::Float => ConfigValue::Float(parse_float(key, value)?),
            FieldKind::String => ConfigValue::String(value.to_string()),
            FieldKind::Time => ConfigValue::Time(parse_time(key, value)?),
        })
    }

    /// Parses a declared default, falling back to the kind's zero value.
    pub fn coerce(&self, value: &str) -> ConfigValue {
        match self {
            FieldKind::Time => ConfigValue::Time(Timestamp::parse(value)),
            _ => self
                .parse("default", value)
                .unwrap_or_else(|_| self.zero_value()),
        }
    }

    /// Returns the zero value of this kind.
    pub fn zero_value(&self) -> ConfigValue {
        match self {
            FieldKind::Bool => ConfigValue::Bool(false),
            FieldKind::Int => ConfigValue::Int(0),
            FieldKind::Float => ConfigValue::Float(0.0),
            FieldKind::String => ConfigValue::String(String::new()),
            FieldKind::Time => ConfigValue::Time(Timestamp::zero()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Where a binding's value is stored.
pub(crate) enum Storage<'a> {
    Writable(&'a mut (dyn Any + 'static)),
    ReadOnly,
}

/// Typed, writable view of a bound field.
pub(crate) enum FieldSlot<'a> {
    Bool(&'a mut bool),
    Int(&'a mut i64),
    Float(&'a mut f64),
    String(&'a mut String),
    Time(&'a mut Timestamp),
}

impl<'a> FieldSlot<'a> {
    /// Downcasts writable storage to the slot of `kind`.
    pub(crate) fn downcast(kind: FieldKind, storage: &'a mut (dyn Any + 'static)) -> Option<Self> {
        match kind {
            FieldKind::Bool => storage.downcast_mut::<bool>().map(FieldSlot::Bool),
            FieldKind::Int => storage.downcast_mut::<i64>().map(FieldSlot::Int),
            FieldKind::Float => storage.downcast_mut::<f64>().map(FieldSlot::Float),
            FieldKind::String => storage.downcast_mut::<String>().map(FieldSlot::String),
            FieldKind::Time => storage.downcast_mut::<Timestamp>().map(FieldSlot::Time),
        }
    }
}

/// A configuration field and its declared metadata.
///
/// # Examples
///
/// ```
/// use stratacfg::domain::{FieldBinding, FieldKind};
///
/// let mut port: i64 = 0;
/// let binding = FieldBinding::new("port", &mut port)
///     .flag("port")
///     .env("HOST_PORT")
///     .default("8080")
///     .description("Port to listen on");
///
/// assert_eq!(binding.kind(), Some(FieldKind::Int));
/// assert_eq!(binding.flag_name(), Some("port"));
/// ```
pub struct FieldBinding<'a> {
    name: String,
    type_name: &'static str,
    type_id: TypeId,
    storage: Storage<'a>,
    flag: Option<String>,
    env: Option<String>,
    default: String,
    description: String,
}

impl<'a> FieldBinding<'a> {
    /// Binds a writable field.
    pub fn new<T: Any>(name: impl Into<String>, field: &'a mut T) -> Self {
        Self::with_storage::<T>(name.into(), Storage::Writable(field))
    }

    /// Declares a field whose storage cannot be written.
    ///
    /// Resolving such a binding fails with `ConfigError::CantSet`.
    pub fn read_only<T: Any>(name: impl Into<String>, _field: &'a T) -> Self {
        Self::with_storage::<T>(name.into(), Storage::ReadOnly)
    }

    fn with_storage<T: Any>(name: String, storage: Storage<'a>) -> Self {
        Self {
            name,
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            storage,
            flag: None,
            env: None,
            default: String::new(),
            description: String::new(),
        }
    }

    /// Sets the command-line flag name.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.flag = Some(name.into());
        self
    }

    /// Sets the environment variable name, also used as the env file key.
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = Some(name.into());
        self
    }

    /// Sets the default value in the field type's string form.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    /// Sets the flag help text.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the Rust type name of the field.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the field kind, or `None` if the type is unsupported.
    pub fn kind(&self) -> Option<FieldKind> {
        FieldKind::from_type_id(self.type_id)
    }

    /// Returns true if the field can receive values.
    pub fn is_writable(&self) -> bool {
        matches!(self.storage, Storage::Writable(_))
    }

    /// Returns the flag name, if declared.
    pub fn flag_name(&self) -> Option<&str> {
        self.flag.as_deref()
    }

    /// Returns the environment variable name, if declared.
    pub fn env_name(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Returns the raw default value.
    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Returns the help description.
    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub(crate) fn into_parts(self) -> BindingParts<'a> {
        BindingParts {
            name: self.name,
            type_name: self.type_name,
            storage: self.storage,
            flag: self.flag,
            env: self.env,
            default: self.default,
            description: self.description,
        }
    }
}

impl fmt::Debug for FieldBinding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("writable", &self.is_writable())
            .field("flag", &self.flag)
            .field("env", &self.env)
            .field("default", &self.default)
            .field("description", &self.description)
            .finish()
    }
}

/// A binding taken apart for the resolver.
pub(crate) struct BindingParts<'a> {
    pub(crate) name: String,
    pub(crate) type_name: &'static str,
    pub(crate) storage: Storage<'a>,
    pub(crate) flag: Option<String>,
    pub(crate) env: Option<String>,
    pub(crate) default: String,
    pub(crate) description: String,
}
