//! Fixed-offset timestamps.
//!
//! Results are stamped in Japan Standard Time as a constant UTC+9 offset.
//! No tz database is consulted and there is no DST, so the rendering depends
//! only on the instant, never on the host's local zone.

use chrono::{DateTime, FixedOffset, Utc};

/// UTC+9, in seconds.
pub const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Format used for persisted timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The JST offset.
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("UTC+9 is within the valid offset range")
}

/// Render `instant` as `YYYY-MM-DD HH:MM:SS` in JST.
pub fn format_jst(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&jst()).format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn midnight_utc_is_nine_am_jst() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_jst(instant), "2024-01-01 09:00:00");
    }

    #[test]
    fn crosses_date_boundary() {
        let instant = Utc.with_ymd_and_hms(2023, 12, 31, 15, 30, 5).unwrap();
        assert_eq!(format_jst(instant), "2024-01-01 00:30:05");
    }

    #[test]
    fn no_daylight_saving_shift() {
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 3, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 7, 15, 3, 0, 0).unwrap();
        assert_eq!(format_jst(winter), "2024-01-15 12:00:00");
        assert_eq!(format_jst(summer), "2024-07-15 12:00:00");
    }
}
