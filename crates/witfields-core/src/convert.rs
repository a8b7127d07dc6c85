//! Type conversion between loosely typed input and a field's value type.
//!
//! Server data is parsed strictly (invariant formats only). Local data, typed
//! by users or produced by code, additionally accepts a few common date
//! layouts and treats a blank string as null.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::field::FieldStatus;
use crate::field::storage::FieldType;
use crate::value::{FieldValue, ValueSource, ValueType};

/// Earliest date the server stores.
const MIN_YEAR: i32 = 1753;

const LOCAL_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];
const LOCAL_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A failed conversion.
///
/// `invalid_value` carries the best-effort value the field should still show
/// (typically the raw input text) so that users can correct it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot convert [{input}] to {target}: {status}")]
pub struct ConversionError {
    pub status: FieldStatus,
    pub invalid_value: Option<FieldValue>,
    pub input: String,
    pub target: ValueType,
}

impl ConversionError {
    fn new(status: FieldStatus, input: &FieldValue, target: ValueType) -> Self {
        // Non-finite doubles are kept as text so a repeated edit compares equal.
        let invalid_value = match input {
            FieldValue::Double(d) if !d.is_finite() => FieldValue::String(input.to_string()),
            _ => input.clone(),
        };
        Self {
            status,
            invalid_value: Some(invalid_value),
            input: input.to_string(),
            target,
        }
    }
}

/// Converter for one field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeConverter {
    field_type: FieldType,
}

impl TypeConverter {
    #[must_use]
    pub const fn for_field_type(field_type: FieldType) -> Self {
        Self { field_type }
    }

    #[must_use]
    pub const fn field_type(self) -> FieldType {
        self.field_type
    }

    #[must_use]
    pub const fn target(self) -> ValueType {
        self.field_type.value_type()
    }

    /// Converts `input` into this converter's value type.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] carrying the invalid status when the
    /// input cannot be represented in the target type.
    pub fn translate(
        self,
        input: Option<FieldValue>,
        source: ValueSource,
    ) -> Result<Option<FieldValue>, ConversionError> {
        let Some(input) = input else {
            return Ok(None);
        };

        if source == ValueSource::Local
            && self.target() != ValueType::String
            && input.as_str().is_some_and(|s| s.trim().is_empty())
        {
            return Ok(None);
        }

        match self.target() {
            ValueType::String => translate_string(&input, source),
            ValueType::Integer => translate_integer(&input),
            ValueType::Double => translate_double(&input),
            ValueType::DateTime => translate_datetime(&input, source),
            ValueType::Boolean => translate_boolean(&input),
            ValueType::Guid => translate_guid(&input),
        }
        .map_err(|status| ConversionError::new(status, &input, self.target()))
    }

    /// Server string form of a value. Null becomes the empty string.
    #[must_use]
    pub fn to_server_string(self, value: Option<&FieldValue>) -> String {
        value.map(FieldValue::to_server_string).unwrap_or_default()
    }
}

fn translate_string(input: &FieldValue, source: ValueSource) -> Result<Option<FieldValue>, FieldStatus> {
    let text = match input {
        FieldValue::String(s) => s.clone(),
        other => other.to_string(),
    };

    if source == ValueSource::Local && text.is_empty() {
        return Ok(None);
    }

    if text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\r' | '\n'))
    {
        return Err(FieldStatus::InvalidCharacters);
    }

    Ok(Some(FieldValue::String(text)))
}

fn translate_integer(input: &FieldValue) -> Result<Option<FieldValue>, FieldStatus> {
    match input {
        FieldValue::Integer(i) => Ok(Some(FieldValue::Integer(*i))),
        FieldValue::String(s) => s
            .trim()
            .parse::<i32>()
            .map(|i| Some(FieldValue::Integer(i)))
            .map_err(|_| FieldStatus::InvalidType),
        #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
        FieldValue::Double(d) if d.fract() == 0.0 && *d >= f64::from(i32::MIN) && *d <= f64::from(i32::MAX) => {
            Ok(Some(FieldValue::Integer(*d as i32)))
        }
        _ => Err(FieldStatus::InvalidType),
    }
}

fn translate_double(input: &FieldValue) -> Result<Option<FieldValue>, FieldStatus> {
    match input {
        FieldValue::Double(d) if d.is_finite() => Ok(Some(FieldValue::Double(*d))),
        FieldValue::Integer(i) => Ok(Some(FieldValue::Double(f64::from(*i)))),
        FieldValue::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .map(|d| Some(FieldValue::Double(d)))
            .ok_or(FieldStatus::InvalidType),
        _ => Err(FieldStatus::InvalidType),
    }
}

fn translate_datetime(input: &FieldValue, source: ValueSource) -> Result<Option<FieldValue>, FieldStatus> {
    let parsed = match input {
        FieldValue::DateTime(dt) => *dt,
        FieldValue::String(s) => parse_datetime(s.trim(), source).ok_or(FieldStatus::InvalidDate)?,
        _ => return Err(FieldStatus::InvalidType),
    };

    if parsed.year() < MIN_YEAR {
        return Err(FieldStatus::InvalidDate);
    }

    Ok(Some(FieldValue::DateTime(parsed)))
}

fn parse_datetime(text: &str, source: ValueSource) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    if source == ValueSource::Server {
        return None;
    }

    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            LOCAL_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn translate_boolean(input: &FieldValue) -> Result<Option<FieldValue>, FieldStatus> {
    match input {
        FieldValue::Boolean(b) => Ok(Some(FieldValue::Boolean(*b))),
        FieldValue::Integer(0) => Ok(Some(FieldValue::Boolean(false))),
        FieldValue::Integer(1) => Ok(Some(FieldValue::Boolean(true))),
        FieldValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(FieldValue::Boolean(true))),
            "false" | "0" => Ok(Some(FieldValue::Boolean(false))),
            _ => Err(FieldStatus::InvalidType),
        },
        _ => Err(FieldStatus::InvalidType),
    }
}

fn translate_guid(input: &FieldValue) -> Result<Option<FieldValue>, FieldStatus> {
    match input {
        FieldValue::Guid(g) => Ok(Some(FieldValue::Guid(*g))),
        FieldValue::String(s) => Uuid::parse_str(s.trim())
            .map(|g| Some(FieldValue::Guid(g)))
            .map_err(|_| FieldStatus::InvalidType),
        _ => Err(FieldStatus::InvalidType),
    }
}
