use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::error::{CoreError, Result};

/// An RFC 3339 UTC timestamp as used in response envelopes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Utc(pub OffsetDateTime);

impl Utc {
    pub fn new(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }

    pub fn inner(&self) -> &OffsetDateTime {
        &self.0
    }

    pub fn timestamp(&self) -> i64 {
        self.0.unix_timestamp()
    }
}

impl fmt::Display for Utc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for Utc {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let datetime = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339)
            .map_err(|e| CoreError::configuration(format!("invalid timestamp '{s}': {e}")))?;
        Ok(Utc(datetime))
    }
}

impl Serialize for Utc {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for Utc {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Utc::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub fn now_utc() -> Utc {
    Utc(OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_display_rfc3339() {
        let ts = Utc::new(datetime!(2023-05-15 14:30:00 UTC));
        assert_eq!(ts.to_string(), "2023-05-15T14:30:00Z");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let ts = Utc::new(datetime!(2023-05-15 14:30:00 UTC));
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2023-05-15T14:30:00Z\"");
        let back: Utc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_parse_with_offset() {
        let ts = Utc::from_str("2023-05-15T14:30:00+02:00").unwrap();
        let expected = datetime!(2023-05-15 12:30:00 UTC);
        assert_eq!(ts.0.to_offset(time::UtcOffset::UTC), expected);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Utc::from_str("not-a-date").is_err());
        assert!(Utc::from_str("").is_err());
        assert!(Utc::from_str("2023-13-01T00:00:00Z").is_err());
    }

    #[test]
    fn test_now_utc_is_monotonic_enough() {
        let a = now_utc();
        let b = now_utc();
        assert!(b >= a);
    }

    #[test]
    fn test_ordering() {
        let a = Utc::new(datetime!(2023-05-15 14:30:00 UTC));
        let b = Utc::new(datetime!(2023-05-15 14:30:01 UTC));
        assert!(a < b);
    }
}
