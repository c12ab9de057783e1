use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

/// Day-first forms precede month-first ones, so an ambiguous "03/04/2025" reads as 3 April.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Spreadsheet serial dates count days from 1899-12-30, which absorbs the phantom
/// 29 February 1900 that spreadsheets inherited.
const SERIAL_UPPER_BOUND: f64 = 2_958_466.0;

/// Normalizes any accepted cell encoding into a calendar date. Returns `None` when no
/// form matches.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(serial) = value.parse::<f64>() {
        return from_serial(serial);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.date())
}

fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 || serial >= SERIAL_UPPER_BOUND {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Canonical `YYYY-MM-DD` rendering used in reports.
pub fn canonical(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn canonical_input_is_idempotent() {
        let date = normalize_date("2025-01-15").expect("iso");
        assert_eq!(canonical(date), "2025-01-15");
        assert_eq!(normalize_date(&canonical(date)), Some(date));
    }

    #[test]
    fn regional_forms_agree_with_iso() {
        let expected = Some(ymd(2025, 1, 15));
        assert_eq!(normalize_date("15/01/2025"), expected);
        assert_eq!(normalize_date("01/15/2025"), expected);
        assert_eq!(normalize_date("15-01-2025"), expected);
        assert_eq!(normalize_date("2025/01/15"), expected);
        assert_eq!(normalize_date("15.01.2025"), expected);
        assert_eq!(normalize_date("15 January 2025"), expected);
        assert_eq!(normalize_date("January 15, 2025"), expected);
        assert_eq!(normalize_date("15 Jan 2025"), expected);
        assert_eq!(normalize_date("Jan 15, 2025"), expected);
    }

    #[test]
    fn ambiguous_slash_dates_read_day_first() {
        assert_eq!(normalize_date("03/04/2025"), Some(ymd(2025, 4, 3)));
    }

    #[test]
    fn spreadsheet_serials_use_1899_epoch() {
        assert_eq!(normalize_date("45672"), Some(ymd(2025, 1, 15)));
        assert_eq!(normalize_date("45672.75"), Some(ymd(2025, 1, 15)));
        assert_eq!(normalize_date("61"), Some(ymd(1900, 3, 1)));
        assert_eq!(normalize_date("0"), None);
        assert_eq!(normalize_date("-3"), None);
    }

    #[test]
    fn datetime_strings_keep_the_date() {
        assert_eq!(normalize_date("2025-01-15T08:30:00Z"), Some(ymd(2025, 1, 15)));
        assert_eq!(normalize_date("2025-01-15 08:30:00"), Some(ymd(2025, 1, 15)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(normalize_date("next monday"), None);
        assert_eq!(normalize_date("2025-13-45"), None);
        assert_eq!(normalize_date("   "), None);
    }
}
