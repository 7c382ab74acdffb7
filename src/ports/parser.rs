// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! A `ConfigParser` turns the text of a configuration file into a flat key/value map.
//! The env file adapter is the one in-tree implementation.

use crate::domain::Result;
use std::collections::HashMap;

/// A trait for parsing configuration files into flat key/value maps.
///
/// Parsing is all-or-nothing: the first malformed entry fails the whole parse.
///
/// # Examples
///
/// ```rust
/// use stratacfg::ports::ConfigParser;
/// use stratacfg::domain::Result;
/// use std::collections::HashMap;
///
/// struct ColonParser;
///
/// impl ConfigParser for ColonParser {
///     fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
///         Ok(content
///             .lines()
///             .filter_map(|line| line.split_once(':'))
///             .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
///             .collect())
///     }
/// }
///
/// let map = ColonParser.parse("HOST: example.org").unwrap();
/// assert_eq!(map.get("HOST"), Some(&"example.org".to_string()));
/// ```
pub trait ConfigParser {
    /// Parses configuration content into a flat key/value map.
    ///
    /// # Returns
    ///
    /// * `Ok(HashMap<String, String>)` - The parsed entries; later keys overwrite earlier ones
    /// * `Err(ConfigError)` - The content is malformed
    fn parse(&self, content: &str) -> Result<HashMap<String, String>>;
}
