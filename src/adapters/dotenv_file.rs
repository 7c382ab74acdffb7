// SPDX-License-Identifier: MIT OR Apache-2.0

//! `.env` file configuration source adapter.
//!
//! This module provides the `.env` parser and an adapter holding the entries of one
//! loaded file. The format is one `KEY=VALUE` assignment per line, optionally
//! preceded by `export`. Blank lines and `#` comments are ignored, except that a `#`
//! inside a quoted value is kept. Values may be wrapped in single or double quotes;
//! double-quoted values expand `\n` and `\r` and drop the backslash from any other
//! escape except `\$`.

use crate::domain::{ConfigError, Result};
use crate::ports::{ConfigParser, ConfigSource};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, ErrorKind};
use std::path::{Path, PathBuf};

/// Maximum allowed size for env files (10MB)
const MAX_ENV_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default env file name.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Parser for `.env` formatted text.
///
/// # Examples
///
/// ```rust
/// use stratacfg::adapters::DotenvParser;
/// use stratacfg::ports::ConfigParser;
///
/// let parser = DotenvParser::new();
/// let content = "export HOST=localhost\nGREETING=\"hello # world\" # comment\n";
/// let result = parser.parse(content).unwrap();
/// assert_eq!(result.get("HOST"), Some(&"localhost".to_string()));
/// assert_eq!(result.get("GREETING"), Some(&"hello # world".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DotenvParser;

impl DotenvParser {
    /// Creates a new env file parser.
    pub fn new() -> Self {
        DotenvParser
    }

    /// Parses entries from a reader, line by line.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<HashMap<String, String>> {
        let mut result = HashMap::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if is_ignored_line(&line) {
                continue;
            }

            let (key, value) = parse_line(&line).map_err(|message| ConfigError::ParseError {
                line: index + 1,
                message,
            })?;
            result.insert(key, value);
        }

        Ok(result)
    }
}

impl ConfigParser for DotenvParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        self.parse_reader(content.as_bytes())
    }
}

fn is_ignored_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn parse_line(line: &str) -> std::result::Result<(String, String), String> {
    if line.is_empty() {
        return Err("zero length line".to_string());
    }

    let line = strip_comment(line);

    let (key, value) = line
        .split_once('=')
        .ok_or_else(|| format!("cannot separate key from value on line '{}'", line))?;

    let key = key.strip_prefix("export").unwrap_or(key).trim();
    if key.is_empty() {
        return Err(format!("missing key on line '{}'", line));
    }

    Ok((key.to_string(), parse_value(value)))
}

/// Truncates `line` at the first `#` that lies outside a quoted span.
fn strip_comment(line: &str) -> String {
    if !line.contains('#') {
        return line.to_string();
    }

    let mut in_quotes = false;
    let mut keep: Vec<&str> = Vec::new();

    for part in line.split('#') {
        if part.matches('"').count() == 1 || part.matches('\'').count() == 1 {
            if in_quotes {
                in_quotes = false;
                keep.push(part);
            } else {
                in_quotes = true;
            }
        }

        if keep.is_empty() || in_quotes {
            keep.push(part);
        }
    }

    keep.join("#")
}

fn parse_value(value: &str) -> String {
    let value = value.trim_matches(' ');

    if value.len() < 2 {
        return value.to_string();
    }

    let double_quoted = value.starts_with('"') && value.ends_with('"');
    let single_quoted = value.starts_with('\'') && value.ends_with('\'');

    if double_quoted {
        unescape(&expand_newlines(&value[1..value.len() - 1]))
    } else if single_quoted {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

/// Replaces `\n` and `\r` escapes; every other escape pair is copied through.
fn expand_newlines(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// Drops the backslash from every escape pair except `\$`.
fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if next != '$' => {
                result.push(next);
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}

/// Configuration source adapter for one loaded env file.
///
/// # Examples
///
/// ```rust,no_run
/// use stratacfg::adapters::DotenvFile;
/// use stratacfg::ports::ConfigSource;
///
/// // Fails if the file is missing or malformed
/// let file = DotenvFile::from_file(".env").unwrap();
///
/// // Treats a missing file as empty
/// let file = DotenvFile::load_or_empty(".env").unwrap();
/// let port = file.get("HOST_PORT");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DotenvFile {
    /// Path the entries were read from, if any
    file_path: Option<PathBuf>,
    /// Parsed entries
    values: HashMap<String, String>,
}

impl DotenvFile {
    /// Creates an empty env file with no backing path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps already-parsed entries.
    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self {
            file_path: None,
            values,
        }
    }

    /// Reads and parses the env file at `path`.
    ///
    /// A missing file is `ConfigError::FileNotFound`; any other read failure is a
    /// `ConfigError::SourceError`, and a malformed line is a `ConfigError::ParseError`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();

        let metadata = fs::metadata(&file_path).map_err(|e| read_error(&file_path, e))?;
        if metadata.len() > MAX_ENV_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: "dotenv".to_string(),
                message: format!(
                    "Env file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_ENV_FILE_SIZE
                ),
                source: None,
            });
        }

        let content = fs::read_to_string(&file_path).map_err(|e| read_error(&file_path, e))?;
        let values = DotenvParser::new().parse(&content)?;

        tracing::debug!(
            "Loaded {} entries from env file {}",
            values.len(),
            file_path.display()
        );

        Ok(Self {
            file_path: Some(file_path),
            values,
        })
    }

    /// Reads the env file at `path`, treating a missing file as empty.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::from_file(path.as_ref()) {
            Err(e) if e.is_not_found() => {
                tracing::debug!("No env file at {}", path.as_ref().display());
                Ok(Self::empty())
            }
            other => other,
        }
    }

    /// Reads `.env` from the OS-appropriate configuration directory for the
    /// application, treating a missing file as empty.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| ConfigError::SourceError {
                source_name: "dotenv".to_string(),
                message: "Failed to determine project directories".to_string(),
                source: None,
            })?;

        Self::load_or_empty(proj_dirs.config_dir().join(DEFAULT_ENV_FILE))
    }

    /// Returns the path the entries were read from.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Returns the parsed entries.
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the file held no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_error(path: &Path, e: std::io::Error) -> ConfigError {
    if e.kind() == ErrorKind::NotFound {
        return ConfigError::FileNotFound {
            path: path.to_path_buf(),
        };
    }
    ConfigError::SourceError {
        source_name: "dotenv".to_string(),
        message: format!("Failed to read env file: {}", path.display()),
        source: Some(Box::new(e)),
    }
}

impl ConfigSource for DotenvFile {
    fn name(&self) -> &str {
        "dotenv"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
