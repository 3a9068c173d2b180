//! Unit tests for the temporal module
//!
//! Tests cover Timezone boundaries, anniversary arithmetic and clocks.

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::temporal::{add_days, anniversary};
use core_kernel::{Clock, FixedClock, SystemClock, TemporalError, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod timezone {
    use super::*;

    #[test]
    fn test_default_is_utc() {
        let tz = Timezone::default();
        assert_eq!(tz.name(), "UTC");
        assert_eq!(
            tz.start_of_day(date(2024, 1, 10)),
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let result = "Mars/Olympus".parse::<Timezone>();
        assert_eq!(result, Err(TemporalError::UnknownTimezone("Mars/Olympus".to_string())));
    }

    #[test]
    fn test_start_of_day_west_of_utc() {
        let tz: Timezone = "America/New_York".parse().unwrap();
        assert_eq!(
            tz.start_of_day(date(2024, 1, 10)),
            Utc.with_ymd_and_hms(2024, 1, 10, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_inside_dst_gap() {
        // Midnight does not exist in Santiago on 2022-09-11.
        let tz: Timezone = "America/Santiago".parse().unwrap();
        let start = tz.start_of_day(date(2022, 9, 11));
        assert_eq!(tz.date_of(start), date(2022, 9, 11));
    }

    #[test]
    fn test_end_of_day_precedes_next_start() {
        let tz = Timezone::default();
        let end = tz.end_of_day(date(2024, 1, 10));
        assert_eq!(tz.date_of(end), date(2024, 1, 10));
        assert!(end < tz.start_of_day(date(2024, 1, 11)));
    }

    #[test]
    fn test_has_begun_is_strict() {
        let tz = Timezone::default();
        let midnight = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert!(!tz.has_begun(date(2024, 1, 10), midnight));
        assert!(tz.has_begun(date(2024, 1, 10), midnight + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_serde_round_trip_by_name() {
        let tz: Timezone = serde_json::from_str("\"Asia/Tokyo\"").unwrap();
        assert_eq!(serde_json::to_string(&tz).unwrap(), "\"Asia/Tokyo\"");
    }
}

mod calendar {
    use super::*;

    #[test]
    fn test_anniversary_zero_is_start() {
        assert_eq!(anniversary(date(2022, 1, 10), 0), Some(date(2022, 1, 10)));
    }

    #[test]
    fn test_anniversaries_measured_from_start() {
        let start = date(2020, 2, 29);
        assert_eq!(anniversary(start, 1), Some(date(2021, 2, 28)));
        assert_eq!(anniversary(start, 3), Some(date(2023, 2, 28)));
        assert_eq!(anniversary(start, 4), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_add_days_crosses_month() {
        assert_eq!(add_days(date(2024, 1, 25), 15).unwrap(), date(2024, 2, 9));
    }

    #[test]
    fn test_add_days_out_of_range() {
        assert!(matches!(
            add_days(NaiveDate::MAX, 1),
            Err(TemporalError::OutOfRange(_))
        ));
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::at_date(date(2024, 6, 1), 0);
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}

mod calendar_date_serde {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Dated {
        #[serde(with = "core_kernel::temporal::calendar_date")]
        on: NaiveDate,
        #[serde(default, with = "core_kernel::temporal::calendar_date::option")]
        since: Option<NaiveDate>,
    }

    #[test]
    fn test_reads_plain_date() {
        let d: Dated = serde_json::from_str(r#"{"on": "2024-01-10"}"#).unwrap();
        assert_eq!(d.on, date(2024, 1, 10));
        assert_eq!(d.since, None);
    }

    #[test]
    fn test_reads_timestamp_prefix() {
        let d: Dated =
            serde_json::from_str(r#"{"on": "2022-01-10T00:00:00.000Z", "since": "2021-05-01T10:00:00Z"}"#)
                .unwrap();
        assert_eq!(d.on, date(2022, 1, 10));
        assert_eq!(d.since, Some(date(2021, 5, 1)));
    }

    #[test]
    fn test_blank_optional_is_none() {
        let d: Dated = serde_json::from_str(r#"{"on": "2024-01-10", "since": ""}"#).unwrap();
        assert_eq!(d.since, None);
    }

    #[test]
    fn test_writes_iso_date() {
        let d = Dated { on: date(2024, 3, 5), since: None };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["on"], "2024-03-05");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Dated>(r#"{"on": "10/01/2024"}"#).is_err());
    }
}
