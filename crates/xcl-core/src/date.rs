//! Date handling
//!
//! Spreadsheets store dates as serial numbers (days since a base date, with the
//! time of day as the fraction). In the 1900 date system the historical
//! "1900 leap year" bug inserts a non-existent day 1900-02-29 as serial 60.
//! The 1904 system has no such quirk.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Largest serial Excel accepts (9999-12-31 in the 1900 system)
const MAX_SERIAL_1900: f64 = 2_958_465.0;

fn base_1900() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn base_1904() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1904, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn first_real_1900_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 3, 1).unwrap_or_default()
}

/// Convert a serial number to a date-time
///
/// Returns `None` for negative serials, serials past year 9999, and the
/// fictional 1900-02-29 (serial 60 in the 1900 system).
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_SERIAL_1900 + 1.0 {
        return None;
    }

    let days = serial.floor();
    let millis = ((serial - days) * SECONDS_PER_DAY * 1000.0).round() as i64;

    let (base, days) = if date_1904 {
        (base_1904(), days as i64)
    } else if days < 60.0 {
        // Before the fictional leap day the base is one day later
        (base_1900(), days as i64 + 1)
    } else if days < 61.0 {
        return None;
    } else {
        (base_1900(), days as i64)
    };

    base.checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Convert a date-time to a serial number
///
/// Returns `None` when the date cannot be represented (before the system's
/// base date or after year 9999).
pub fn datetime_to_serial(dt: &NaiveDateTime, date_1904: bool) -> Option<f64> {
    use chrono::Datelike;

    if dt.year() > 9999 {
        return None;
    }

    let base = if date_1904 { base_1904() } else { base_1900() };
    let mut days = dt.date().signed_duration_since(base.date()).num_days();

    if date_1904 {
        if days < 0 {
            return None;
        }
    } else {
        if dt.year() < 1900 {
            return None;
        }
        if dt.date() < first_real_1900_day() {
            days -= 1;
        }
    }

    let time = dt.time();
    let seconds = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;

    Some(days as f64 + seconds / SECONDS_PER_DAY)
}

/// Format a date-time as ISO-8601, dropping a midnight time
pub fn format_iso(dt: &NaiveDateTime) -> String {
    let time = dt.time();
    if time.num_seconds_from_midnight() == 0 && time.nanosecond() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

/// Parse an ISO-8601 date or date-time
pub fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_serial_to_datetime_1900() {
        assert_eq!(serial_to_datetime(1.0, false), Some(ymd(1900, 1, 1)));
        assert_eq!(serial_to_datetime(59.0, false), Some(ymd(1900, 2, 28)));
        assert_eq!(serial_to_datetime(60.0, false), None);
        assert_eq!(serial_to_datetime(61.0, false), Some(ymd(1900, 3, 1)));
        assert_eq!(serial_to_datetime(45322.0, false), Some(ymd(2024, 1, 31)));
    }

    #[test]
    fn test_serial_with_time() {
        let dt = serial_to_datetime(45322.5, false).unwrap();
        assert_eq!(dt, ymd(2024, 1, 31) + Duration::hours(12));
    }

    #[test]
    fn test_serial_to_datetime_1904() {
        assert_eq!(serial_to_datetime(0.0, true), Some(ymd(1904, 1, 1)));
        assert_eq!(serial_to_datetime(1.0, true), Some(ymd(1904, 1, 2)));
    }

    #[test]
    fn test_serial_out_of_range() {
        assert_eq!(serial_to_datetime(-1.0, false), None);
        assert_eq!(serial_to_datetime(f64::NAN, false), None);
        assert_eq!(serial_to_datetime(3_000_000.0, false), None);
    }

    #[test]
    fn test_datetime_to_serial() {
        assert_eq!(datetime_to_serial(&ymd(1900, 1, 1), false), Some(1.0));
        assert_eq!(datetime_to_serial(&ymd(1900, 2, 28), false), Some(59.0));
        assert_eq!(datetime_to_serial(&ymd(1900, 3, 1), false), Some(61.0));
        assert_eq!(datetime_to_serial(&ymd(2024, 1, 31), false), Some(45322.0));
        assert_eq!(datetime_to_serial(&ymd(1904, 1, 2), true), Some(1.0));
        assert_eq!(datetime_to_serial(&ymd(1899, 1, 1), false), None);
        assert_eq!(datetime_to_serial(&ymd(1903, 1, 1), true), None);
    }

    #[test]
    fn test_serial_roundtrip_with_time() {
        let dt = ymd(2023, 7, 14) + Duration::hours(18) + Duration::minutes(45);
        let serial = datetime_to_serial(&dt, false).unwrap();
        assert_eq!(serial_to_datetime(serial, false), Some(dt));
    }

    #[test]
    fn test_iso() {
        assert_eq!(parse_iso("2024-01-31"), Some(ymd(2024, 1, 31)));
        assert_eq!(
            parse_iso("2024-01-31T08:15:00"),
            Some(ymd(2024, 1, 31) + Duration::minutes(495))
        );
        assert_eq!(parse_iso("nope"), None);
        assert_eq!(format_iso(&ymd(2024, 1, 31)), "2024-01-31");
        assert_eq!(
            format_iso(&(ymd(2024, 1, 31) + Duration::hours(8))),
            "2024-01-31T08:00:00"
        );
    }
}
