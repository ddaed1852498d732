use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Hour after which a Saturday's meetup counts as over.
const MEETUP_CUTOFF_HOUR: u32 = 10;

/// The Saturday the event card advertises: today if it is Saturday before
/// 10:00, otherwise the coming Saturday.
pub fn next_saturday(now: NaiveDateTime) -> NaiveDate {
    let today = now.date();
    let days_until = (7 + Weekday::Sat.num_days_from_sunday()
        - today.weekday().num_days_from_sunday())
        % 7;

    if days_until == 0 && now.hour() >= MEETUP_CUTOFF_HOUR {
        today + Duration::days(7)
    } else {
        today + Duration::days(i64::from(days_until))
    }
}
