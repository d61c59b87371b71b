//! Display projections for countdowns and stored clock times

use chrono::{NaiveDateTime, NaiveTime};

/// Storage format for clock times (canonical 24-hour)
pub const STORED_TIME_FORMAT: &str = "%H:%M";

/// Storage format for calendar days
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a remaining-seconds countdown as `MM:SS`.
///
/// Negative values (overtime) keep their magnitude and get a leading `-`.
pub fn format_countdown(remaining_seconds: i64) -> String {
    let sign = if remaining_seconds < 0 { "-" } else { "" };
    let total = remaining_seconds.unsigned_abs();
    format!("{}{:02}:{:02}", sign, total / 60, total % 60)
}

/// Canonical `HH:MM` representation of a wall-clock instant
pub fn stored_time(at: NaiveDateTime) -> String {
    at.format(STORED_TIME_FORMAT).to_string()
}

/// Canonical `YYYY-MM-DD` representation of the day an instant falls on
pub fn stored_date(at: NaiveDateTime) -> String {
    at.format(STORED_DATE_FORMAT).to_string()
}

/// Project a stored `HH:MM` time for display.
///
/// With `use_24h` the stored value is returned as is; otherwise it becomes
/// `H:MM AM/PM`. Values that do not parse are returned unchanged.
pub fn display_time(stored: &str, use_24h: bool) -> String {
    if use_24h {
        return stored.to_string();
    }

    match NaiveTime::parse_from_str(stored, STORED_TIME_FORMAT) {
        Ok(time) => time.format("%-I:%M %p").to_string(),
        Err(_) => stored.to_string(),
    }
}

/// Canonical `HH:MM` form of a time as a client may echo it back, either
/// stored `HH:MM` or the 12-hour `H:MM AM/PM` projection. Anything else is
/// returned unchanged.
pub fn canonical_time(shown: &str) -> String {
    let shown = shown.trim();
    NaiveTime::parse_from_str(shown, STORED_TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(shown, "%I:%M %p"))
        .map(|time| time.format(STORED_TIME_FORMAT).to_string())
        .unwrap_or_else(|_| shown.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn countdown_pads_minutes_and_seconds() {
        assert_eq!(format_countdown(1500), "25:00");
        assert_eq!(format_countdown(65), "01:05");
        assert_eq!(format_countdown(0), "00:00");
    }

    #[test]
    fn countdown_shows_overtime_with_sign() {
        assert_eq!(format_countdown(-1), "-00:01");
        assert_eq!(format_countdown(-65), "-01:05");
    }

    #[test]
    fn twelve_hour_projection() {
        assert_eq!(display_time("13:05", false), "1:05 PM");
        assert_eq!(display_time("00:30", false), "12:30 AM");
        assert_eq!(display_time("12:00", false), "12:00 PM");
        assert_eq!(display_time("09:15", false), "9:15 AM");
    }

    #[test]
    fn twenty_four_hour_projection_is_identity() {
        assert_eq!(display_time("13:05", true), "13:05");
    }

    #[test]
    fn unparsable_time_is_left_alone() {
        assert_eq!(display_time("later", false), "later");
    }

    #[test]
    fn shown_times_map_back_to_stored_form() {
        assert_eq!(canonical_time("13:05"), "13:05");
        assert_eq!(canonical_time("1:05 PM"), "13:05");
        assert_eq!(canonical_time("12:30 AM"), "00:30");
        assert_eq!(canonical_time("9:15 AM"), "09:15");
        assert_eq!(canonical_time("later"), "later");
    }

    #[test]
    fn stored_forms() {
        let at = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(8, 4, 59)
            .unwrap();
        assert_eq!(stored_time(at), "08:04");
        assert_eq!(stored_date(at), "2026-03-07");
    }
}
