//! Bulk import/export of events and non-working days.
//!
//! The wire shape is a single JSON object:
//!
//! ```json
//! { "events": [{ "id": 1, "name": "Launch", "date": "2025-03-14" }],
//!   "days":   [{ "id": 1, "name": "Holiday", "date": "2025-03-10" }] }
//! ```
//!
//! Validation is all-or-nothing and lenient about unrecognised fields, which
//! are ignored and not carried into the decoded data.

use crate::event::{Event, NonWorkingDay};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const EVENTS_FIELD: &str = "events";
pub const DAYS_FIELD: &str = "days";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeData {
    pub events: Vec<Event>,
    pub days: Vec<NonWorkingDay>,
}

impl ExchangeData {
    pub fn new(events: Vec<Event>, days: Vec<NonWorkingDay>) -> Self {
        Self { events, days }
    }
}

/// Why an import payload was rejected. `path` points at the offending value,
/// e.g. `events[2].date`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid data format: not valid JSON ({0})")]
    MalformedJson(String),
    #[error("invalid data format: {path} must be an object")]
    NotAnObject { path: String },
    #[error("invalid data format: missing field {path}")]
    MissingField { path: String },
    #[error("invalid data format: {path} must be an array")]
    NotAnArray { path: String },
    #[error("invalid data format: {path} must be a positive integer")]
    InvalidId { path: String },
    #[error("invalid data format: {path} must be a string")]
    InvalidName { path: String },
    #[error("invalid data format: {path} must be a YYYY-MM-DD date (got {value:?})")]
    MalformedDate { path: String, value: String },
}

/// Decode raw file contents and validate them.
pub fn parse_import(text: &str) -> Result<ExchangeData, ValidationError> {
    let raw: Value =
        serde_json::from_str(text).map_err(|err| ValidationError::MalformedJson(err.to_string()))?;
    validate(&raw)
}

pub fn validate(raw: &Value) -> Result<ExchangeData, ValidationError> {
    let root = raw.as_object().ok_or_else(|| ValidationError::NotAnObject {
        path: "$".to_string(),
    })?;

    let events = records(root, EVENTS_FIELD)?
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let record = Record::decode(value, &format!("{EVENTS_FIELD}[{idx}]"))?;
            Ok(Event::new(record.id, record.name, record.date))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    let days = records(root, DAYS_FIELD)?
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let record = Record::decode(value, &format!("{DAYS_FIELD}[{idx}]"))?;
            Ok(NonWorkingDay::new(record.id, record.name, record.date))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(ExchangeData { events, days })
}

/// Render `data` in the shape [`validate`] accepts.
pub fn serialize_export(data: &ExchangeData) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

fn records<'a>(root: &'a Map<String, Value>, field: &str) -> Result<&'a Vec<Value>, ValidationError> {
    root.get(field)
        .ok_or_else(|| ValidationError::MissingField {
            path: field.to_string(),
        })?
        .as_array()
        .ok_or_else(|| ValidationError::NotAnArray {
            path: field.to_string(),
        })
}

struct Record {
    id: i64,
    name: String,
    date: NaiveDate,
}

impl Record {
    fn decode(value: &Value, path: &str) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or_else(|| ValidationError::NotAnObject {
            path: path.to_string(),
        })?;

        let field = |name: &str| {
            object.get(name).ok_or_else(|| ValidationError::MissingField {
                path: format!("{path}.{name}"),
            })
        };

        let id = positive_id(field("id")?).ok_or_else(|| ValidationError::InvalidId {
            path: format!("{path}.id"),
        })?;

        let name = field("name")?
            .as_str()
            .ok_or_else(|| ValidationError::InvalidName {
                path: format!("{path}.name"),
            })?
            .to_string();

        let date_value = field("date")?;
        let date = date_value
            .as_str()
            .and_then(parse_calendar_date)
            .ok_or_else(|| ValidationError::MalformedDate {
                path: format!("{path}.date"),
                value: match date_value.as_str() {
                    Some(text) => text.to_string(),
                    None => date_value.to_string(),
                },
            })?;

        Ok(Self { id, name, date })
    }
}

/// Any whole JSON number in `1..=i64::MAX`, so `3` and `3.0` both decode to 3.
fn positive_id(value: &Value) -> Option<i64> {
    if let Some(id) = value.as_i64() {
        return (id > 0).then_some(id);
    }
    let id = value.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, which no longer fits.
    if id.fract() != 0.0 || id < 1.0 || id >= i64::MAX as f64 {
        return None;
    }
    Some(id as i64)
}

/// Parse exactly `YYYY-MM-DD`; chrono alone would also accept unpadded or signed fields.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != 4 && *idx != 7)
        .all(|(_, byte)| byte.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::parse_calendar_date;
    use chrono::NaiveDate;

    #[test]
    fn calendar_date_requires_padded_fields() {
        assert_eq!(
            parse_calendar_date("2025-03-09"),
            NaiveDate::from_ymd_opt(2025, 3, 9)
        );
        assert_eq!(parse_calendar_date("2025-3-9"), None);
        assert_eq!(parse_calendar_date("+2025-03-09"), None);
        assert_eq!(parse_calendar_date("2025/03/09"), None);
        assert_eq!(parse_calendar_date("2025-02-30"), None);
        assert_eq!(parse_calendar_date("2025-03-09T00:00:00"), None);
    }
}
