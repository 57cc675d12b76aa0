//! Platform identifiers.
//!
//! Every guild, channel, user and message is addressed by a snowflake: a 64-bit
//! integer whose upper 42 bits are milliseconds since the platform epoch. The
//! wire format is a decimal string.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Milliseconds between the Unix epoch and the platform epoch (2015-01-01T00:00:00Z).
pub const PLATFORM_EPOCH_MS: u64 = 1_420_070_400_000;

const TIMESTAMP_SHIFT: u32 = 22;

/// A platform identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(u64);

impl Snowflake {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the creation time encoded in the identifier.
    #[must_use]
    pub fn timestamp(self) -> DateTime<Utc> {
        let unix_ms = (self.0 >> TIMESTAMP_SHIFT) + PLATFORM_EPOCH_MS;
        let unix_ms = i64::try_from(unix_ms).unwrap_or(i64::MAX);
        Utc.timestamp_millis_opt(unix_ms)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Returns the lowest identifier that could have been created at `time`.
    ///
    /// Times before the platform epoch clamp to zero, times past the 42-bit
    /// range clamp to the largest identifier. Useful as a `min_id` or `max_id`
    /// bound for searches.
    #[must_use]
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        let unix_ms = u64::try_from(time.timestamp_millis()).unwrap_or(0);
        unix_ms
            .saturating_sub(PLATFORM_EPOCH_MS)
            .checked_mul(1 << TIMESTAMP_SHIFT)
            .map_or(Self(u64::MAX), Self)
    }

    /// Parses user input, rejecting anything that is not a plain decimal number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSnowflake`] for empty, signed, or non-numeric input.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidSnowflake {
                value: value.to_string(),
            });
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| Error::InvalidSnowflake {
                value: value.to_string(),
            })
    }
}

impl FromStr for Snowflake {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u64> for Snowflake {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!(Snowflake::parse("").is_err());
        assert!(Snowflake::parse("12a4").is_err());
        assert!(Snowflake::parse("-5").is_err());
        assert!(Snowflake::parse("99999999999999999999999").is_err());
        assert_eq!(Snowflake::parse(" 42 ").unwrap().get(), 42);
    }

    #[test]
    fn test_timestamp_decoding() {
        // Created 2016-04-30T11:18:25.796Z
        let id = Snowflake::new(175_928_847_299_117_063);
        let ts = id.timestamp();
        assert_eq!(ts.format("%Y-%m-%d").to_string(), "2016-04-30");

        assert_eq!(
            Snowflake::new(0).timestamp().timestamp_millis(),
            1_420_070_400_000
        );
    }

    #[test]
    fn test_from_datetime_clamps_out_of_range() {
        let before_epoch = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Snowflake::from_datetime(before_epoch).get(), 0);

        // 42 bits of milliseconds run out in 2154
        let far_future = Utc.with_ymd_and_hms(2200, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Snowflake::from_datetime(far_future).get(), u64::MAX);

        let last_representable = Utc.with_ymd_and_hms(2150, 1, 1, 0, 0, 0).unwrap();
        let id = Snowflake::from_datetime(last_representable);
        assert!(id < Snowflake::new(u64::MAX));
        assert_eq!(id.timestamp(), last_representable);
    }

    #[test]
    fn test_from_datetime_roundtrips_to_millisecond() {
        let time = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        let id = Snowflake::from_datetime(time);
        assert_eq!(id.timestamp(), time);

        let before_epoch = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Snowflake::from_datetime(before_epoch).get(), 0);
    }

    #[test]
    fn test_serde_uses_strings() {
        let id: Snowflake = serde_json::from_str("\"123456789\"").unwrap();
        assert_eq!(id.get(), 123_456_789);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"123456789\"");
        assert!(serde_json::from_str::<Snowflake>("123").is_err());
    }
}
