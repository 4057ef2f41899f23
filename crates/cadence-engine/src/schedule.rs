use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::{
    clock::truncate_to_minute,
    error::{Result, ScheduleError},
    types::{Recurrence, RecurrenceType},
    validate::validate,
};

/// Day-by-day scans for a weekday or month day give up after this many days.
pub const MAX_DAY_SCAN: u64 = 5000;

/// Upper bound on interval steps when catching up to "now".
pub const MAX_STEP_ITERATIONS: u64 = 1_000_000;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Calendar granularity a recurrence advances by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl StepUnit {
    /// `None` for `Once`, which never steps.
    pub fn for_type(kind: RecurrenceType) -> Option<Self> {
        match kind {
            RecurrenceType::Once => None,
            RecurrenceType::Minutes => Some(Self::Minute),
            RecurrenceType::Hours => Some(Self::Hour),
            RecurrenceType::Days => Some(Self::Day),
            RecurrenceType::Weeks => Some(Self::Week),
            RecurrenceType::Months => Some(Self::Month),
        }
    }

    /// Fixed length of `count` units, `None` for months.
    fn fixed_width(self, count: i64) -> Option<Duration> {
        match self {
            Self::Minute => Some(Duration::minutes(count)),
            Self::Hour => Some(Duration::hours(count)),
            Self::Day => Some(Duration::days(count)),
            Self::Week => Some(Duration::weeks(count)),
            Self::Month => None,
        }
    }

    fn advance(self, from: NaiveDateTime, count: i64) -> Option<NaiveDateTime> {
        match self.fixed_width(count) {
            Some(width) => from.checked_add_signed(width),
            None => {
                let months = u32::try_from(count).ok()?;
                from.checked_add_months(Months::new(months))
            }
        }
    }
}

/// Earliest occurrence for a job that has never fired.
///
/// `from_date` picks the calendar day and `time_of_day_minutes` the minute of
/// that day; the two are combined before any alignment.
pub fn first_occurrence(
    rule: &Recurrence,
    from_date: NaiveDate,
    time_of_day_minutes: u32,
    now: NaiveDateTime,
) -> Result<NaiveDateTime> {
    validate(rule)?;
    let kind = mapped_type(rule)?;
    if time_of_day_minutes >= MINUTES_PER_DAY {
        return Err(ScheduleError::InvalidTimeOfDay {
            minutes: time_of_day_minutes,
        });
    }

    let now = truncate_to_minute(now);
    let candidate =
        from_date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(time_of_day_minutes));

    let first = match kind {
        RecurrenceType::Once => {
            if candidate > now {
                candidate
            } else {
                warn!(%candidate, %now, "single execution requested in the past");
                return Err(ScheduleError::ScheduledInPast { at: candidate });
            }
        }
        RecurrenceType::Weeks => {
            let day = rule.day.unwrap_or_default();
            scan_days(candidate, now, |d| {
                i64::from(d.weekday().num_days_from_sunday()) == day
            })?
        }
        RecurrenceType::Months => {
            let day = rule.day.unwrap_or_default();
            scan_days(candidate, now, |d| i64::from(d.day()) == day)?
        }
        RecurrenceType::Minutes | RecurrenceType::Hours | RecurrenceType::Days => {
            if candidate > now {
                candidate
            } else {
                next_scheduled_time(rule, candidate, now)?
            }
        }
    };

    debug!(kind = %kind, %first, "first occurrence computed");
    Ok(truncate_to_minute(first))
}

/// Occurrence following a firing at `from`.
///
/// A single execution already in the past is due immediately; one still in
/// the future stays where it is.
pub fn next_occurrence(
    rule: &Recurrence,
    from: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<NaiveDateTime> {
    validate(rule)?;
    let kind = mapped_type(rule)?;
    let now = truncate_to_minute(now);
    let from = truncate_to_minute(from);

    match kind {
        RecurrenceType::Once => Ok(if from < now { now } else { from }),
        _ => next_scheduled_time(rule, from, now),
    }
}

/// Step `from` forward by whole intervals until it reaches `now`. A `from`
/// equal to `now` always takes one step, so the result never repeats it.
///
/// Monthly rules are realigned to their anchor day afterwards, stopping at the
/// end of a month that is too short to hold it.
pub fn next_scheduled_time(
    rule: &Recurrence,
    from: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<NaiveDateTime> {
    validate(rule)?;
    let kind = mapped_type(rule)?;
    let unit = StepUnit::for_type(kind).ok_or(ScheduleError::UnmappedType { code: rule.kind })?;
    // validated: present and in 1..=1000 for every stepping type
    let interval = rule.interval.unwrap_or(1);

    let now = truncate_to_minute(now);
    let start = truncate_to_minute(from);
    let out_of_range = || ScheduleError::DateOutOfRange { from: start };

    let mut next = start;
    let mut stepped = false;

    // Jump over whole elapsed intervals when the step has a fixed width.
    if let Some(width) = unit.fixed_width(interval) {
        if next < now {
            let behind = (now - next).num_minutes();
            let skip = behind / width.num_minutes();
            if skip > 0 {
                let jump = unit.fixed_width(interval * skip).ok_or_else(out_of_range)?;
                next = next.checked_add_signed(jump).ok_or_else(out_of_range)?;
                stepped = true;
            }
        }
    }

    let mut iterations = 0u64;
    while next < now || (next == now && !stepped) {
        iterations += 1;
        if iterations > MAX_STEP_ITERATIONS {
            warn!(kind = %kind, %start, %now, "step limit exceeded");
            return Err(ScheduleError::IterationLimit {
                limit: MAX_STEP_ITERATIONS,
                from: start,
            });
        }
        next = unit.advance(next, interval).ok_or_else(out_of_range)?;
        stepped = true;
    }

    if kind == RecurrenceType::Months {
        if let Some(day) = rule.day {
            next = align_month_day(next, day);
        }
    }

    debug!(kind = %kind, %start, %next, "next scheduled time computed");
    Ok(truncate_to_minute(next))
}

/// Walk forward to `day` within the current month, settling on the month's
/// last day when it is shorter.
fn align_month_day(mut at: NaiveDateTime, day: i64) -> NaiveDateTime {
    while i64::from(at.day()) < day {
        match at.checked_add_signed(Duration::days(1)) {
            Some(tomorrow) if tomorrow.month() == at.month() => at = tomorrow,
            _ => break,
        }
    }
    at
}

fn scan_days(
    mut candidate: NaiveDateTime,
    now: NaiveDateTime,
    matches: impl Fn(&NaiveDateTime) -> bool,
) -> Result<NaiveDateTime> {
    let start = candidate;
    let mut iterations = 0u64;

    while !(matches(&candidate) && candidate >= now) {
        candidate = candidate
            .checked_add_signed(Duration::days(1))
            .ok_or(ScheduleError::DateOutOfRange { from: start })?;

        iterations += 1;
        if iterations > MAX_DAY_SCAN {
            warn!(%start, %now, "no matching day within scan limit");
            return Err(ScheduleError::IterationLimit {
                limit: MAX_DAY_SCAN,
                from: start,
            });
        }
    }
    Ok(candidate)
}

fn mapped_type(rule: &Recurrence) -> Result<RecurrenceType> {
    rule.recurrence_type()
        .ok_or(ScheduleError::UnmappedType { code: rule.kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn step_units_cover_recurring_types() {
        assert_eq!(StepUnit::for_type(RecurrenceType::Once), None);
        assert_eq!(StepUnit::for_type(RecurrenceType::Months), Some(StepUnit::Month));
    }

    #[test]
    fn align_stops_at_short_month_end() {
        assert_eq!(align_month_day(dt(2015, 2, 28, 9, 0), 31), dt(2015, 2, 28, 9, 0));
        assert_eq!(align_month_day(dt(2016, 2, 28, 9, 0), 31), dt(2016, 2, 29, 9, 0));
        assert_eq!(align_month_day(dt(2015, 4, 28, 9, 0), 30), dt(2015, 4, 30, 9, 0));
    }

    #[test]
    fn fast_forward_matches_single_stepping() {
        let rule = Recurrence::every(45, RecurrenceType::Minutes);
        let from = dt(2015, 9, 20, 10, 41);
        let now = dt(2015, 9, 23, 10, 30);
        let next = next_scheduled_time(&rule, from, now).unwrap();

        let mut expected = from;
        while expected < now {
            expected += Duration::minutes(45);
        }
        assert_eq!(next, expected);
    }

    #[test]
    fn landing_exactly_on_now_after_catching_up_is_kept() {
        let rule = Recurrence::every(1, RecurrenceType::Hours);
        let next = next_scheduled_time(&rule, dt(2015, 9, 23, 7, 30), dt(2015, 9, 23, 10, 30)).unwrap();
        assert_eq!(next, dt(2015, 9, 23, 10, 30));
    }

    #[test]
    fn inputs_with_seconds_are_truncated() {
        let rule = Recurrence::every(3, RecurrenceType::Hours);
        let from = dt(2015, 9, 23, 18, 25) + Duration::seconds(42);
        let next = next_scheduled_time(&rule, from, dt(2015, 9, 23, 18, 25)).unwrap();
        assert_eq!(next, dt(2015, 9, 23, 21, 25));
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn once_has_no_step_unit() {
        let err = next_scheduled_time(&Recurrence::once(), dt(2015, 9, 23, 0, 0), dt(2015, 9, 23, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::UnmappedType { code: 0 }));
    }

    #[test]
    fn time_of_day_out_of_range() {
        let rule = Recurrence::every(1, RecurrenceType::Days);
        let day = NaiveDate::from_ymd_opt(2015, 9, 23).unwrap();
        let err = first_occurrence(&rule, day, 1440, dt(2015, 9, 23, 0, 0)).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTimeOfDay { minutes: 1440 }));
    }
}
