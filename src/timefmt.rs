//! ==============================================================================
//! timefmt.rs - observed-timestamp conversion for the panel clock field
//! ==============================================================================
//!
//! the cloud api reports "observed" as a utc string like
//! "2024-07-27T14:05:00.000Z". the panel shows it as local us-eastern
//! "HH:MM MM/DD" under the fixed us daylight-saving rule: eastern daylight
//! time from 2:00 am local on the second sunday of march until 2:00 am local
//! on the first sunday of november, eastern standard time otherwise.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

const EST_OFFSET_SECS: i32 = -5 * 3600;
const EDT_OFFSET_SECS: i32 = -4 * 3600;

/// parse the cloud's observed string and render the panel clock field
pub fn to_local_display(observed_utc: &str) -> Result<String, chrono::ParseError> {
    let utc = NaiveDateTime::parse_from_str(observed_utc, "%Y-%m-%dT%H:%M:%S%.3fZ")?;
    let offset_secs = if in_daylight_time(utc) {
        EDT_OFFSET_SECS
    } else {
        EST_OFFSET_SECS
    };
    // both offsets are well-formed constants
    let offset = FixedOffset::east_opt(offset_secs).unwrap();
    let local = offset.from_utc_datetime(&utc);
    Ok(local.format("%H:%M %m/%d").to_string())
}

/// us-eastern dst test, evaluated on the utc instant.
/// transitions land at 07:00 utc (2 am est) and 06:00 utc (2 am edt).
fn in_daylight_time(utc: NaiveDateTime) -> bool {
    let year = chrono::Datelike::year(&utc);

    let second_sunday_march = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)
        .and_then(|d| d.and_hms_opt(7, 0, 0));
    let first_sunday_november = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)
        .and_then(|d| d.and_hms_opt(6, 0, 0));

    match (second_sunday_march, first_sunday_november) {
        (Some(start), Some(end)) => utc >= start && utc < end,
        _ => false,
    }
}

/// current utc instant in the cloud's observed format; used by tests and the
/// chart history axis
pub fn now_observed() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summer_timestamp_uses_edt() {
        assert_eq!(
            to_local_display("2024-07-27T14:05:00.000Z").unwrap(),
            "10:05 07/27"
        );
    }

    #[test]
    fn winter_timestamp_uses_est() {
        assert_eq!(
            to_local_display("2024-01-15T14:05:00.000Z").unwrap(),
            "09:05 01/15"
        );
    }

    #[test]
    fn spring_transition_boundary() {
        // dst began 2024-03-10 at 07:00 utc
        assert_eq!(
            to_local_display("2024-03-10T06:59:00.000Z").unwrap(),
            "01:59 03/10"
        );
        assert_eq!(
            to_local_display("2024-03-10T07:00:00.000Z").unwrap(),
            "03:00 03/10"
        );
    }

    #[test]
    fn autumn_transition_boundary() {
        // dst ended 2024-11-03 at 06:00 utc
        assert_eq!(
            to_local_display("2024-11-03T05:59:00.000Z").unwrap(),
            "01:59 11/03"
        );
        assert_eq!(
            to_local_display("2024-11-03T06:00:00.000Z").unwrap(),
            "01:00 11/03"
        );
    }

    #[test]
    fn malformed_timestamp_is_an_error() {
        assert!(to_local_display("not-a-timestamp").is_err());
    }
}
