// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp values and the layouts accepted for them.
//!
//! A [`Timestamp`] either holds an instant with its UTC offset or is *zero*, the
//! sentinel for "nothing parsed". Parsing never fails: input that matches none of the
//! recognized layouts yields the zero timestamp.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted layouts, tried in order. Several are prefixes of later ones, so the
/// order is significant.
const LAYOUTS: [Layout; 6] = [
    Layout::Date,
    Layout::DateTimeSpace,
    Layout::DateTimeT,
    Layout::DateTimeZulu,
    Layout::DateTimeAbbreviation,
    Layout::DateTimeOffset,
];

#[derive(Clone, Copy, Debug)]
enum Layout {
    /// `2006-01-02`
    Date,
    /// `2006-01-02 15:04:05`, seconds may carry a fraction in this and later layouts
    DateTimeSpace,
    /// `2006-01-02T15:04:05`
    DateTimeT,
    /// `2006-01-02T15:04:05Z`
    DateTimeZulu,
    /// `2006-01-02T15:04:05 MST`
    DateTimeAbbreviation,
    /// `2006-01-02T15:04:05-0700`
    DateTimeOffset,
}

impl Layout {
    fn parse(self, value: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            Layout::Date => {
                if value.len() != DATE_SHAPE.len() || !has_shape(value, None) {
                    return None;
                }
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(utc)
            }
            Layout::DateTimeSpace => naive(value, b' ', "%Y-%m-%d %H:%M:%S%.f").map(utc),
            Layout::DateTimeT => naive(value, b'T', "%Y-%m-%dT%H:%M:%S%.f").map(utc),
            Layout::DateTimeZulu => naive(value, b'T', "%Y-%m-%dT%H:%M:%S%.fZ").map(utc),
            Layout::DateTimeAbbreviation => {
                let (datetime, zone) = value.rsplit_once(' ')?;
                if !is_zone_abbreviation(zone) {
                    return None;
                }
                // Abbreviations carry no offset information of their own.
                naive(datetime, b'T', "%Y-%m-%dT%H:%M:%S%.f").map(utc)
            }
            Layout::DateTimeOffset => {
                if !has_shape(value, Some(b'T')) {
                    return None;
                }
                DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z").ok()
            }
        }
    }
}

/// Fixed-width date fields; `d` stands for one ASCII digit.
const DATE_SHAPE: &[u8] = b"dddd-dd-dd";

/// Fixed-width time fields following the date and its separator.
const TIME_SHAPE: &[u8] = b"dd:dd:dd";

/// Checks that `value` starts with the fixed-width date, and with `separator` and the
/// fixed-width time when a separator is given. `chrono` alone accepts short fields and
/// a missing separator.
fn has_shape(value: &str, separator: Option<u8>) -> bool {
    let mut shape = DATE_SHAPE.to_vec();
    if let Some(separator) = separator {
        shape.push(separator);
        shape.extend_from_slice(TIME_SHAPE);
    }

    let bytes = value.as_bytes();
    bytes.len() >= shape.len()
        && shape
            .iter()
            .zip(bytes)
            .all(|(&expected, &found)| match expected {
                b'd' => found.is_ascii_digit(),
                _ => expected == found,
            })
}

fn naive(value: &str, separator: u8, format: &str) -> Option<NaiveDateTime> {
    if !has_shape(value, Some(separator)) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, format).ok()
}

fn utc(datetime: NaiveDateTime) -> DateTime<FixedOffset> {
    datetime.and_utc().fixed_offset()
}

fn is_zone_abbreviation(zone: &str) -> bool {
    (3..=5).contains(&zone.len()) && zone.chars().all(|c| c.is_ascii_alphabetic())
}

/// A point in time parsed from configuration input, or the zero timestamp.
///
/// # Examples
///
/// ```
/// use stratacfg::domain::Timestamp;
///
/// let ts = Timestamp::parse("2006-01-02T15:04:05Z");
/// assert!(!ts.is_zero());
///
/// let zero = Timestamp::parse("yesterday");
/// assert!(zero.is_zero());
/// assert_eq!(zero, Timestamp::default());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp(Option<DateTime<FixedOffset>>);

impl Timestamp {
    /// Returns the zero timestamp.
    pub fn zero() -> Self {
        Timestamp(None)
    }

    /// Parses `value` against the recognized layouts; the first match wins.
    pub fn parse(value: &str) -> Self {
        let parsed = LAYOUTS.iter().find_map(|layout| layout.parse(value));
        if parsed.is_none() {
            tracing::trace!("'{}' matches no timestamp layout", value);
        }
        Timestamp(parsed)
    }

    /// Returns true if `value` matches one of the recognized layouts.
    pub fn is_timestamp(value: &str) -> bool {
        !Self::parse(value).is_zero()
    }

    /// Returns true for the zero timestamp.
    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the parsed instant, or `None` for the zero timestamp.
    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        self.0
    }

    /// Returns the instant in UTC, or `None` for the zero timestamp.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.0.map(|datetime| datetime.with_timezone(&Utc))
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Timestamp(Some(datetime))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Timestamp(Some(datetime.fixed_offset()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(datetime) => write!(f, "{}", datetime.to_rfc3339()),
            None => write!(f, "0001-01-01T00:00:00+00:00"),
        }
    }
}
