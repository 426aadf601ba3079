//! Local date and time helpers.
//!
//! All functions work in the machine's local timezone via [`chrono::Local`].
//! Layouts are `strftime` strings; the constants below cover the common ones.
//! Formatting with an invalid layout returns an error instead of panicking.

use crate::error::{Result, UtilsError};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// `2024-01-31 18:30:05.123`
pub const YYYY_MM_DD_HH_MM_SS_SSS: &str = "%Y-%m-%d %H:%M:%S%.3f";
/// `2024-01-31 18:30:05`
pub const YYYY_MM_DD_HH_MM_SS: &str = "%Y-%m-%d %H:%M:%S";
/// `2024-01-31`
pub const YYYY_MM_DD: &str = "%Y-%m-%d";
/// `31-01-2024`
pub const DD_MM_YYYY: &str = "%d-%m-%Y";
/// `31-01-2024 18:30:05`
pub const DD_MM_YYYY_HH_MM_SS: &str = "%d-%m-%Y %H:%M:%S";
/// `31-01-2024 18:30:05.123`
pub const DD_MM_YYYY_HH_MM_SS_SSS: &str = "%d-%m-%Y %H:%M:%S%.3f";

/// Which end of a day to snap to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBoundary {
    /// `00:00:00.000000000`
    Start,
    /// `23:59:59.999999999`
    End,
}

/// Current local time.
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Current Unix time in milliseconds.
pub fn current_millis() -> i64 {
    local_time_to_millis(&now())
}

/// Format the current local time.
pub fn now_to_string(format: &str) -> Result<String> {
    local_time_to_string(&now(), format)
}

/// Format a Unix millisecond timestamp as local time.
pub fn millis_to_string(millis: i64, format: &str) -> Result<String> {
    local_time_to_string(&millis_to_local_time(millis)?, format)
}

/// Format a local time.
pub fn local_time_to_string(time: &DateTime<Local>, format: &str) -> Result<String> {
    let items = StrftimeItems::new(format);
    if items.clone().any(|item| matches!(item, Item::Error)) {
        return Err(UtilsError::InvalidInput(format!(
            "Invalid datetime format: {:?}",
            format
        )));
    }
    Ok(time.format_with_items(items).to_string())
}

/// Parse `value` with `format` as a local time.
///
/// A date-only layout resolves to local midnight.
pub fn string_to_local_time(value: &str, format: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(value, format)
        .or_else(|_| {
            NaiveDate::parse_from_str(value, format).map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|e| {
            UtilsError::InvalidInput(format!(
                "Failed to parse datetime {:?} with format {:?}: {}",
                value, format, e
            ))
        })?;
    Ok(resolve_local(naive))
}

/// Parse `value` with `format` and return Unix milliseconds.
pub fn string_to_millis(value: &str, format: &str) -> Result<i64> {
    string_to_local_time(value, format).map(|time| local_time_to_millis(&time))
}

/// Unix milliseconds of a local time.
pub fn local_time_to_millis(time: &DateTime<Local>) -> i64 {
    time.timestamp_millis()
}

/// Local time of a Unix millisecond timestamp.
pub fn millis_to_local_time(millis: i64) -> Result<DateTime<Local>> {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| UtilsError::InvalidInput(format!("Timestamp out of range: {}", millis)))
}

/// Current year.
pub fn year() -> i32 {
    now().year()
}

/// Current day of the year, from 1.
pub fn day_of_year() -> u32 {
    now().ordinal()
}

/// Current day of the month, from 1.
pub fn day_of_month() -> u32 {
    now().day()
}

/// Current month, from 1 to 12.
pub fn month_of_year() -> u32 {
    now().month()
}

/// January 1st, 00:00 of the current year.
pub fn start_of_year() -> DateTime<Local> {
    start_of_year_of(&now())
}

/// December 31st, 23:59:59.999999999 of the current year.
pub fn end_of_year() -> DateTime<Local> {
    end_of_year_of(&now())
}

/// First day of the current month, 00:00.
pub fn start_of_month() -> DateTime<Local> {
    start_of_month_of(&now())
}

/// Last day of the current month, 23:59:59.999999999.
pub fn end_of_month() -> DateTime<Local> {
    end_of_month_of(&now())
}

/// Midnight at the start of today.
pub fn start_of_day() -> DateTime<Local> {
    start_of_day_of(&now())
}

/// The last nanosecond of today.
pub fn end_of_day() -> DateTime<Local> {
    end_of_day_of(&now())
}

/// January 1st, 00:00 of the year containing `time`.
pub fn start_of_year_of(time: &DateTime<Local>) -> DateTime<Local> {
    let date = time.date_naive();
    start_of_date(date.with_ordinal(1).unwrap_or(date))
}

/// December 31st, 23:59:59.999999999 of the year containing `time`.
pub fn end_of_year_of(time: &DateTime<Local>) -> DateTime<Local> {
    let date = time.date_naive();
    let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
    end_of_date(last)
}

/// First day of the month containing `time`, 00:00.
pub fn start_of_month_of(time: &DateTime<Local>) -> DateTime<Local> {
    let date = time.date_naive();
    start_of_date(date.with_day(1).unwrap_or(date))
}

/// Last day of the month containing `time`, 23:59:59.999999999.
pub fn end_of_month_of(time: &DateTime<Local>) -> DateTime<Local> {
    let date = time.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date);
    end_of_date(last)
}

/// Midnight at the start of the day containing `time`.
pub fn start_of_day_of(time: &DateTime<Local>) -> DateTime<Local> {
    start_of_date(time.date_naive())
}

/// The last nanosecond of the day containing `time`.
pub fn end_of_day_of(time: &DateTime<Local>) -> DateTime<Local> {
    end_of_date(time.date_naive())
}

/// The day `days` before `time`, snapped to `boundary`.
pub fn days_before(time: &DateTime<Local>, days: i64, boundary: DayBoundary) -> Result<DateTime<Local>> {
    shift_days(time, days.saturating_neg(), boundary)
}

/// The day `days` after `time`, snapped to `boundary`.
pub fn days_after(time: &DateTime<Local>, days: i64, boundary: DayBoundary) -> Result<DateTime<Local>> {
    shift_days(time, days, boundary)
}

/// Milliseconds from `start` to `end`; negative when `end` is earlier.
pub fn millis_between(start: &DateTime<Local>, end: &DateTime<Local>) -> i64 {
    (*end - *start).num_milliseconds()
}

fn shift_days(time: &DateTime<Local>, days: i64, boundary: DayBoundary) -> Result<DateTime<Local>> {
    let date = Duration::try_days(days)
        .and_then(|delta| time.date_naive().checked_add_signed(delta))
        .ok_or_else(|| {
            UtilsError::InvalidInput(format!("Shifting {} by {} days is out of range", time, days))
        })?;
    Ok(match boundary {
        DayBoundary::Start => start_of_date(date),
        DayBoundary::End => end_of_date(date),
    })
}

fn start_of_date(date: NaiveDate) -> DateTime<Local> {
    resolve_local(date.and_time(NaiveTime::MIN))
}

fn end_of_date(date: NaiveDate) -> DateTime<Local> {
    let end = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    resolve_local(date.and_time(end))
}

/// Map a wall-clock time onto the local timezone.
///
/// Ambiguous times take the earlier instant; times skipped by a DST jump
/// are read as UTC.
fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(time) => time,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => Local.from_utc_datetime(&naive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Local> {
        resolve_local(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap(),
        )
    }

    #[test]
    fn test_format_layouts() {
        let time = local(2021, 3, 7, 9, 5, 1);
        assert_eq!(local_time_to_string(&time, YYYY_MM_DD).unwrap(), "2021-03-07");
        assert_eq!(local_time_to_string(&time, DD_MM_YYYY).unwrap(), "07-03-2021");
        assert_eq!(
            local_time_to_string(&time, YYYY_MM_DD_HH_MM_SS).unwrap(),
            "2021-03-07 09:05:01"
        );
        assert_eq!(
            local_time_to_string(&time, DD_MM_YYYY_HH_MM_SS_SSS).unwrap(),
            "07-03-2021 09:05:01.000"
        );
    }

    #[test]
    fn test_invalid_format_is_an_error() {
        let time = local(2021, 3, 7, 9, 5, 1);
        assert!(local_time_to_string(&time, "%Y-%").is_err());
        assert!(now_to_string("%Q").is_err());
    }

    #[test]
    fn test_parse_round_trip() {
        let parsed = string_to_local_time("2021-03-07 09:05:01.250", YYYY_MM_DD_HH_MM_SS_SSS).unwrap();
        assert_eq!(
            local_time_to_string(&parsed, YYYY_MM_DD_HH_MM_SS_SSS).unwrap(),
            "2021-03-07 09:05:01.250"
        );
    }

    #[test]
    fn test_parse_date_only() {
        let parsed = string_to_local_time("07-03-2021", DD_MM_YYYY).unwrap();
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.day(), 7);
        assert_eq!(parsed.month(), 3);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(string_to_local_time("2021-13-01", YYYY_MM_DD).is_err());
        assert!(string_to_millis("not a date", YYYY_MM_DD).is_err());
    }

    #[test]
    fn test_millis_round_trip() {
        let millis = 1_615_107_901_250;
        let time = millis_to_local_time(millis).unwrap();
        assert_eq!(local_time_to_millis(&time), millis);

        let text = millis_to_string(millis, YYYY_MM_DD_HH_MM_SS_SSS).unwrap();
        assert_eq!(string_to_millis(&text, YYYY_MM_DD_HH_MM_SS_SSS).unwrap(), millis);
    }

    #[test]
    fn test_millis_out_of_range() {
        assert!(millis_to_local_time(i64::MAX).is_err());
    }

    #[test]
    fn test_current_values() {
        let before = current_millis();
        let now = now();
        assert!(local_time_to_millis(&now) >= before);
        assert!((1..=12).contains(&month_of_year()));
        assert!((1..=31).contains(&day_of_month()));
        assert!((1..=366).contains(&day_of_year()));
        assert!(year() >= 2021);
    }

    #[test]
    fn test_current_period_boundaries() {
        let now = now();
        assert!(start_of_day() <= now && now <= end_of_day());
        assert!(start_of_month() <= start_of_day());
        assert!(end_of_day() <= end_of_month());
        assert!(start_of_year() <= start_of_month());
        assert!(end_of_month() <= end_of_year());
        assert_eq!((start_of_year().month(), start_of_year().day()), (1, 1));
        assert_eq!((end_of_year().month(), end_of_year().day()), (12, 31));
    }

    #[test]
    fn test_year_boundaries() {
        let time = local(2020, 6, 15, 12, 30, 0);
        assert_eq!(
            local_time_to_string(&start_of_year_of(&time), YYYY_MM_DD_HH_MM_SS_SSS).unwrap(),
            "2020-01-01 00:00:00.000"
        );
        let end = end_of_year_of(&time);
        assert_eq!(
            local_time_to_string(&end, YYYY_MM_DD_HH_MM_SS_SSS).unwrap(),
            "2020-12-31 23:59:59.999"
        );
        assert_eq!(end.nanosecond(), 999_999_999);
    }

    #[test]
    fn test_month_boundaries() {
        let leap = local(2020, 2, 10, 8, 0, 0);
        assert_eq!(start_of_month_of(&leap).day(), 1);
        assert_eq!(end_of_month_of(&leap).day(), 29);

        let december = local(2021, 12, 3, 8, 0, 0);
        let end = end_of_month_of(&december);
        assert_eq!((end.year(), end.month(), end.day()), (2021, 12, 31));

        let april = local(2021, 4, 30, 8, 0, 0);
        assert_eq!(end_of_month_of(&april).day(), 30);
    }

    #[test]
    fn test_day_boundaries() {
        let time = local(2021, 3, 7, 9, 5, 1);
        let start = start_of_day_of(&time);
        let end = end_of_day_of(&time);
        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(start.day(), 7);
        assert_eq!(end.day(), 7);
    }

    #[test]
    fn test_days_before_and_after() {
        let time = local(2021, 3, 1, 9, 5, 1);

        let before = days_before(&time, 1, DayBoundary::Start).unwrap();
        assert_eq!(
            local_time_to_string(&before, YYYY_MM_DD_HH_MM_SS).unwrap(),
            "2021-02-28 00:00:00"
        );

        let after = days_after(&time, 31, DayBoundary::End).unwrap();
        assert_eq!(
            local_time_to_string(&after, YYYY_MM_DD_HH_MM_SS).unwrap(),
            "2021-04-01 23:59:59"
        );

        let same = days_after(&time, 0, DayBoundary::Start).unwrap();
        assert_eq!(same, start_of_day_of(&time));
    }

    #[test]
    fn test_days_shift_out_of_range() {
        let time = local(2021, 3, 1, 9, 5, 1);
        assert!(days_after(&time, i64::MAX, DayBoundary::Start).is_err());
    }

    #[test]
    fn test_millis_between() {
        let start = millis_to_local_time(1_000).unwrap();
        let end = millis_to_local_time(3_500).unwrap();
        assert_eq!(millis_between(&start, &end), 2_500);
        assert_eq!(millis_between(&end, &start), -2_500);
    }
}
