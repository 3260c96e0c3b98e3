use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// An absolute point in time. Only produced by the datetime normalizer, and
/// always rendered as ISO-8601 UTC with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalInstant(DateTime<Utc>);

impl CanonicalInstant {
    pub(crate) fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for CanonicalInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Serialize for CanonicalInstant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

/// Payload forwarded to the booking relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub name: String,
    pub datetime: CanonicalInstant,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_rendering_has_millis_and_z() {
        let instant = CanonicalInstant::new(Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap());
        assert_eq!(instant.to_iso_string(), "2025-03-10T14:00:00.000Z");
        assert_eq!(instant.to_string(), "2025-03-10T14:00:00.000Z");
    }

    #[test]
    fn test_booking_request_json() {
        let booking = BookingRequest {
            name: "Alex".to_string(),
            datetime: CanonicalInstant::new(Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap()),
        };
        assert_eq!(
            serde_json::to_value(&booking).unwrap(),
            serde_json::json!({ "name": "Alex", "datetime": "2025-03-10T14:00:00.000Z" })
        );
    }
}
