//! Normalizes the datetime slot of a booking into a [`CanonicalInstant`].
//!
//! The platform hands the slot over in whatever shape the agent was built
//! with: an ISO string, a structured `{year, month, day, hours, ...}` record,
//! or occasionally something else entirely. Everything here is pure so that
//! each shape can be tested in isolation.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};

use crate::models::CanonicalInstant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("datetime is missing")]
    MissingDatetime,
    #[error("datetime is not a valid calendar date/time")]
    UnparseableDatetime,
    #[error("datetime has an unsupported shape")]
    UnsupportedDatetimeShape,
}

use NormalizationError::*;

/// ISO-8601 layouts with an explicit offset that RFC 3339 is too strict for
/// (minute precision, `+0200`, `+02`). A trailing `Z` is rewritten to
/// `+00:00` before these are tried.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

/// Local date-time layouts accepted for strings without an offset.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Converts a datetime slot value into a canonical instant. Values that carry
/// no offset are read in `zone`.
pub fn normalize(value: Option<&Value>, zone: &Tz) -> Result<CanonicalInstant, NormalizationError> {
    match value {
        None | Some(Value::Null) => Err(MissingDatetime),
        Some(Value::String(raw)) => parse_datetime_str(raw, zone),
        Some(Value::Object(fields)) => StructuredDatetime::from_fields(fields)?.resolve(zone),
        Some(_) => Err(UnsupportedDatetimeShape),
    }
}

fn parse_datetime_str(raw: &str, zone: &Tz) -> Result<CanonicalInstant, NormalizationError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(CanonicalInstant::new(dt.with_timezone(&Utc)));
    }

    let zulu = s
        .strip_suffix(['Z', 'z'])
        .map(|head| format!("{head}+00:00"));
    let with_offset = zulu.as_deref().unwrap_or(s);
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(with_offset, format) {
            return Ok(CanonicalInstant::new(dt.with_timezone(&Utc)));
        }
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return localize(&naive, zone);
        }
    }

    // Date-only ISO strings name a UTC day, not a local one.
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or(UnparseableDatetime)?;
        return Ok(CanonicalInstant::new(midnight.and_utc()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(CanonicalInstant::new(dt.with_timezone(&Utc)));
    }

    Err(UnparseableDatetime)
}

fn localize(naive: &NaiveDateTime, zone: &Tz) -> Result<CanonicalInstant, NormalizationError> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
            Ok(CanonicalInstant::new(dt.with_timezone(&Utc)))
        }
        // Skipped by a DST transition.
        LocalResult::None => Err(UnparseableDatetime),
    }
}

/// Calendar components as the platform sends them for `@sys.date-time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuredDatetime {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
}

impl StructuredDatetime {
    fn from_fields(fields: &Map<String, Value>) -> Result<Self, NormalizationError> {
        Ok(Self {
            year: component(fields, "year")?,
            month: component(fields, "month")?,
            day: component(fields, "day")?,
            hours: component(fields, "hours")?,
            minutes: component(fields, "minutes")?,
            seconds: component(fields, "seconds")?,
        })
    }

    /// Applies the defaults (first month, first day, midnight) and checks the
    /// result is a real calendar date/time. A zero month or day counts as unset.
    pub fn to_naive(&self) -> Result<NaiveDateTime, NormalizationError> {
        let year = i32::try_from(self.year.ok_or(UnparseableDatetime)?)
            .map_err(|_| UnparseableDatetime)?;
        let month = unsigned(self.month.filter(|m| *m != 0).unwrap_or(1))?;
        let day = unsigned(self.day.filter(|d| *d != 0).unwrap_or(1))?;
        let hours = unsigned(self.hours.unwrap_or(0))?;
        let minutes = unsigned(self.minutes.unwrap_or(0))?;
        let seconds = unsigned(self.seconds.unwrap_or(0))?;

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hours, minutes, seconds))
            .ok_or(UnparseableDatetime)
    }

    pub fn resolve(&self, zone: &Tz) -> Result<CanonicalInstant, NormalizationError> {
        localize(&self.to_naive()?, zone)
    }
}

/// Reads one integer component. Numbers may come through as integral floats
/// (`2025.0`); anything fractional or non-numeric is rejected.
fn component(fields: &Map<String, Value>, key: &str) -> Result<Option<i64>, NormalizationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(Some(f as i64))
                }
                _ => Err(UnparseableDatetime),
            }
        }
        Some(_) => Err(UnparseableDatetime),
    }
}

fn unsigned(value: i64) -> Result<u32, NormalizationError> {
    u32::try_from(value).map_err(|_| UnparseableDatetime)
}
