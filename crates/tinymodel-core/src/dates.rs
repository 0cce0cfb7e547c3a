//! Date/time casting between storage text and [`NaiveDateTime`].
//!
//! Date attributes are stored as text in the effective date format and handed
//! back to callers as [`Value::DateTime`]. Integers and purely numeric text are
//! read as Unix timestamps (seconds) on the local clock, the same clock
//! timestamps are stamped with.

use crate::error::{Error, InvalidFormatError, Result};
use crate::value::Value;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

/// Storage format used when neither the model nor the connection sets one.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn is_numeric(text: &str) -> bool {
    static NUMERIC: OnceLock<Option<Regex>> = OnceLock::new();
    NUMERIC
        .get_or_init(|| Regex::new(r"^[+-]?\d+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(text))
}

/// Check that `format` is a strftime format a naive date/time can be written
/// with.
///
/// Unknown specifiers and offset specifiers (`%z`, `%Z`) are rejected with
/// [`Error::InvalidFormat`], the format itself as the value.
pub fn check_format(format: &str) -> Result<()> {
    let invalid = || {
        Error::InvalidFormat(InvalidFormatError {
            value: format.to_owned(),
            format: format.to_owned(),
        })
    };

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }

    let sample = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)?;
    let mut out = String::new();
    write!(out, "{}", sample.format(format)).map_err(|_| invalid())
}

/// Converts attribute values between their stored and rich representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTransformer {
    dates: Vec<String>,
    format: String,
}

impl ValueTransformer {
    /// Build a transformer for the given date attributes and storage format.
    ///
    /// Fails with [`Error::InvalidFormat`] when `format` cannot be written, see
    /// [`check_format`].
    pub fn new(dates: Vec<String>, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        check_format(&format)?;
        Ok(Self { dates, format })
    }

    /// Same format, other date attributes.
    #[must_use]
    pub fn with_dates(mut self, dates: Vec<String>) -> Self {
        self.dates = dates;
        self
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn date_attributes(&self) -> &[String] {
        &self.dates
    }

    pub fn is_date_attribute(&self, key: &str) -> bool {
        self.dates.iter().any(|d| d == key)
    }

    /// Whether writing `value` under `key` goes through [`Self::to_storage`].
    pub fn casts_on_write(&self, key: &str, value: &Value) -> bool {
        !value.is_null() && (value.is_datetime() || self.is_date_attribute(key))
    }

    /// Interpret `value` as a date/time.
    pub fn as_datetime(&self, value: &Value) -> Result<NaiveDateTime> {
        if let Some(dt) = value.as_datetime() {
            return Ok(dt);
        }

        match value {
            Value::Int(secs) => return self.unix_seconds(i64::from(*secs), value),
            Value::BigInt(secs) => return self.unix_seconds(*secs, value),
            Value::Text(text) => {
                let text = text.trim();
                if is_numeric(text) {
                    let secs = text.parse::<i64>().map_err(|_| self.invalid(value))?;
                    return self.unix_seconds(secs, value);
                }
                if let Ok(dt) = NaiveDateTime::parse_from_str(text, &self.format) {
                    return Ok(dt);
                }
                // Date-only formats carry no time fields; midnight is implied.
                if let Some(dt) = NaiveDate::parse_from_str(text, &self.format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                {
                    return Ok(dt);
                }
            }
            _ => {}
        }

        Err(self.invalid(value))
    }

    /// Convert a value into its storage representation.
    ///
    /// Calendar values are formatted as text; everything else is stored as is.
    pub fn to_storage(&self, value: &Value) -> Value {
        match value.as_datetime() {
            Some(dt) => Value::Text(self.format_datetime(&dt)),
            None => value.clone(),
        }
    }

    /// Convert a stored value into the representation callers see.
    ///
    /// Date attributes come back as [`Value::DateTime`]; `Null` and every other
    /// attribute pass through.
    pub fn to_rich(&self, key: &str, value: &Value) -> Result<Value> {
        if value.is_null() || !self.is_date_attribute(key) {
            return Ok(value.clone());
        }
        self.as_datetime(value).map(Value::DateTime)
    }

    pub fn format_datetime(&self, dt: &NaiveDateTime) -> String {
        let mut out = String::new();
        // The format was checked in `new`; a failed write leaves the text empty.
        if write!(out, "{}", dt.format(&self.format)).is_err() {
            out.clear();
        }
        out
    }

    /// Whether two values format to the same storage text.
    ///
    /// Values that cannot be interpreted as dates are never equivalent.
    pub fn equivalent(&self, current: &Value, original: &Value) -> bool {
        match (self.as_datetime(current), self.as_datetime(original)) {
            (Ok(a), Ok(b)) => self.format_datetime(&a) == self.format_datetime(&b),
            _ => false,
        }
    }

    fn unix_seconds(&self, secs: i64, value: &Value) -> Result<NaiveDateTime> {
        DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.with_timezone(&Local).naive_local())
            .ok_or_else(|| self.invalid(value))
    }

    fn invalid(&self, value: &Value) -> Error {
        Error::InvalidFormat(InvalidFormatError {
            value: value.to_string(),
            format: self.format.clone(),
        })
    }
}
