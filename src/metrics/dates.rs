use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::TimeSlot;

/// Canonical hour-of-day (UTC) for each schedule slot. Timing variance is
/// measured against these fixed anchors, not against user-local clock time.
pub fn slot_hour(slot: TimeSlot) -> u32 {
    match slot {
        TimeSlot::Morning => 9,
        TimeSlot::Afternoon => 13,
        TimeSlot::Evening => 18,
        TimeSlot::Night => 22,
    }
}

/// Every calendar day from start to end, inclusive. Empty when start > end.
pub fn each_day_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

/// The canonical slot time on a given calendar day.
pub fn canonical_slot_time(day: NaiveDate, slot: TimeSlot) -> DateTime<Utc> {
    day.and_hms_opt(slot_hour(slot), 0, 0)
        .expect("slot hour is < 24")
        .and_utc()
}

/// Absolute distance in minutes, rounded to the nearest minute.
pub fn abs_minutes_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let secs = (a - b).num_seconds().abs();
    (secs + 30) / 60
}
