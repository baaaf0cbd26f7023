pub mod analytics;
pub mod item;
pub mod supplier;
pub mod transaction;
pub mod user;

pub use analytics::*;
pub use item::*;
pub use supplier::*;
pub use transaction::*;
pub use user::*;

/// Timestamps arrive either as RFC 3339 or as a bare `YYYY-MM-DD` date.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|n| n.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    /// Fixed instant used by the bundled sample data.
    pub(crate) fn fixed(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(|n| n.and_utc())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::timestamp;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339_and_bare_date() {
        let full = timestamp::parse("2024-03-05T10:30:00+09:00").unwrap();
        assert_eq!(full.hour(), 1);

        let bare = timestamp::parse("2024-03-05").unwrap();
        assert_eq!((bare.year(), bare.month(), bare.day()), (2024, 3, 5));
        assert_eq!(bare.hour(), 0);

        let naive = timestamp::parse("2024-03-05T08:15:00.000").unwrap();
        assert_eq!(naive.minute(), 15);

        assert!(timestamp::parse("yesterday").is_none());
    }
}
