//! Serializes calendar dates as `YYYY-MM-DD`.
//!
//! Use with `#[serde(with = "crate::date_format")]`.

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::validation::InvalidValue;

/// Date format used in requests, responses and query strings, e.g. "2025-01-31".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date sent by a client.
pub fn parse_date(field: &str, text: &str) -> Result<Date, InvalidValue> {
    Date::parse(text.trim(), DATE_FORMAT)
        .map_err(|_| InvalidValue(format!("{field} must be a valid date in the format YYYY-MM-DD")))
}

pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::parse_date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("date", "2025-01-05"), Ok(date!(2025 - 01 - 05)));
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_date("date", "05/01/2025").is_err());
        assert!(parse_date("date", "2025-02-30").is_err());
        assert!(parse_date("date", "").is_err());
    }
}
