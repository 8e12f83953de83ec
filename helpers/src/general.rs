use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

/// Hour of day (UTC) at which championship rounds start.
pub const ROUND_START_HOUR: i64 = 20;

/// start_of_day returns the given instant truncated to midnight of the same day.
pub fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t - Duration::seconds(t.num_seconds_from_midnight() as i64)
        - Duration::nanoseconds(t.nanosecond() as i64)
}

/// next_saturday returns the next Saturday strictly after the day of `now`, at the round start
/// hour. If `now` already is a Saturday, the Saturday one week later is returned.
pub fn next_saturday(now: DateTime<Utc>) -> DateTime<Utc> {
    let weekday = now.weekday().num_days_from_sunday() as i64;
    let mut days_until = (6 - weekday + 7) % 7;
    if days_until == 0 {
        days_until = 7;
    }

    start_of_day(now) + Duration::days(days_until) + Duration::hours(ROUND_START_HOUR)
}

/// add_days returns `date` shifted by the given number of days.
pub fn add_days(date: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    date + Duration::days(days)
}

/// season_label returns the quarter based season label, e.g. 2026-S4.
pub fn season_label(now: DateTime<Utc>) -> String {
    format!("{}-S{}", now.year(), now.month0() / 3 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    #[test]
    fn next_saturday_from_friday() {
        let friday = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 12).unwrap();
        let sat = next_saturday(friday);
        assert_eq!(sat, Utc.with_ymd_and_hms(2026, 10, 17, 20, 0, 0).unwrap());
        assert_eq!(sat.weekday(), Weekday::Sat);
    }

    #[test]
    fn next_saturday_from_saturday_skips_a_week() {
        let saturday = Utc.with_ymd_and_hms(2026, 10, 17, 21, 0, 0).unwrap();
        assert_eq!(
            next_saturday(saturday),
            Utc.with_ymd_and_hms(2026, 10, 24, 20, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_saturday_from_sunday() {
        let sunday = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        assert_eq!(
            next_saturday(sunday),
            Utc.with_ymd_and_hms(2026, 10, 24, 20, 0, 0).unwrap()
        );
    }

    #[test]
    fn season_label_uses_quarters() {
        let jan = Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap();
        let oct = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        assert_eq!(season_label(jan), "2026-S1");
        assert_eq!(season_label(oct), "2026-S4");
    }
}
