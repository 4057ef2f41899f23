//! English rendering of a job's schedule, e.g.
//! `Every 16 weeks from 10/12/2016 on Wed, until 15/12/2017`.

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{EndType, EndValue, JobDescription, RecurrenceType};

const NOT_SET: &str = "Not set";
const DATE_FORMAT: &str = "%-d/%-m/%Y";
const TIME_FORMAT: &str = "%-I:%M";
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Where the start clause takes its trailing comma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comma {
    None,
    AfterToday,
    AtEnd,
}

/// Describe `job` relative to `now`, which only decides whether the start
/// date reads as "Today".
pub fn describe(job: &JobDescription, now: NaiveDateTime) -> String {
    let today = now.date();
    let kind = job.recurrence.recurrence_type();

    let mut words: Vec<String> = Vec::new();

    if kind == Some(RecurrenceType::Once) {
        words.push("Single execution scheduled for".to_string());
        words.extend(start_clause(job, kind, today, Comma::None));
        return words.join(" ");
    }

    words.push("Every".to_string());
    match (job.recurrence.interval, kind) {
        (Some(1), Some(kind)) => words.push(kind.singular().to_string()),
        (interval, kind) => {
            words.push(interval.map_or_else(|| NOT_SET.to_string(), |i| i.to_string()));
            words.push(kind.map_or(NOT_SET, RecurrenceType::plural).to_string());
        }
    }
    words.push("from".to_string());

    let end = end_clause(job);
    let comma = if end.is_empty() {
        Comma::AfterToday
    } else {
        Comma::AtEnd
    };
    words.extend(start_clause(job, kind, today, comma));
    words.extend(end);

    words.join(" ")
}

fn start_clause(
    job: &JobDescription,
    kind: Option<RecurrenceType>,
    today: NaiveDate,
    comma: Comma,
) -> Vec<String> {
    let Some(start) = job.start_date else {
        return vec![NOT_SET.to_string()];
    };

    let mut words = Vec::new();
    if start.date() == today {
        let label = if comma == Comma::AfterToday {
            "Today,"
        } else {
            "Today"
        };
        words.push(label.to_string());
        words.push(start.format(TIME_FORMAT).to_string());
    } else {
        words.push(start.format(DATE_FORMAT).to_string());
    }

    if let Some(kind @ (RecurrenceType::Weeks | RecurrenceType::Months)) = kind {
        words.push("on".to_string());
        words.push(day_name(kind, job.recurrence.day));
    }

    if comma == Comma::AtEnd {
        if let Some(last) = words.last_mut() {
            last.push(',');
        }
    }
    words
}

fn end_clause(job: &JobDescription) -> Vec<String> {
    if job.end_type == Some(EndType::Unlimited) {
        return Vec::new();
    }

    let value = match (job.end_type, &job.end_value) {
        (Some(EndType::EndDate), Some(EndValue::Date(date))) => date.format(DATE_FORMAT).to_string(),
        (Some(EndType::NumberOfOccurrences), Some(EndValue::Count(n))) if *n > 0 => {
            format!("after {n} occurrences")
        }
        _ => NOT_SET.to_string(),
    };
    vec!["until".to_string(), value]
}

fn day_name(kind: RecurrenceType, day: Option<i64>) -> String {
    match (kind, day) {
        (RecurrenceType::Weeks, Some(d @ 0..=6)) => WEEKDAYS[d as usize].to_string(),
        (RecurrenceType::Months, Some(d @ 1..=31)) => ordinal(d),
        _ => NOT_SET.to_string(),
    }
}

fn ordinal(n: i64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Recurrence;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2015, 9, 23, 10, 30)
    }

    fn today_at(h: u32, mi: u32) -> NaiveDateTime {
        at(2015, 9, 23, h, mi)
    }

    fn months(day: Option<i64>) -> Recurrence {
        Recurrence {
            kind: RecurrenceType::Months.code(),
            interval: Some(6),
            day,
        }
    }

    #[test]
    fn ordinals() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31].into_iter().map(ordinal).collect();
        assert_eq!(
            got,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "31st"]
        );
    }

    #[test]
    fn minutes_today_until_date() {
        let job = JobDescription::new(Recurrence::every(5, RecurrenceType::Minutes))
            .starting(today_at(8, 20))
            .ending(EndType::EndDate, Some(EndValue::Date(at(2015, 9, 8, 0, 0))));
        assert_eq!(describe(&job, now()), "Every 5 minutes from Today 8:20, until 8/9/2015");
    }

    #[test]
    fn single_execution_today() {
        let job = JobDescription::new(Recurrence::once()).starting(today_at(9, 29));
        assert_eq!(describe(&job, now()), "Single execution scheduled for Today 9:29");
    }

    #[test]
    fn single_execution_other_day_and_unset() {
        let job = JobDescription::new(Recurrence::once()).starting(at(2015, 11, 5, 14, 0));
        assert_eq!(describe(&job, now()), "Single execution scheduled for 5/11/2015");

        let job = JobDescription::new(Recurrence::once());
        assert_eq!(describe(&job, now()), "Single execution scheduled for Not set");
    }

    #[test]
    fn weeks_with_end_date() {
        let job = JobDescription::new(Recurrence::every(16, RecurrenceType::Weeks).on_day(3))
            .starting(at(2016, 12, 10, 0, 0))
            .ending(EndType::EndDate, Some(EndValue::Date(at(2017, 12, 15, 0, 0))));
        assert_eq!(
            describe(&job, now()),
            "Every 16 weeks from 10/12/2016 on Wed, until 15/12/2017"
        );
    }

    #[test]
    fn weeks_sunday_is_named() {
        let job = JobDescription::new(Recurrence::every(2, RecurrenceType::Weeks).on_day(0))
            .starting(at(2016, 12, 10, 0, 0))
            .ending(EndType::Unlimited, None);
        assert_eq!(describe(&job, now()), "Every 2 weeks from 10/12/2016 on Sun");
    }

    #[test]
    fn months_until_date() {
        let job = JobDescription::new(months(Some(1)))
            .starting(at(2015, 11, 5, 0, 0))
            .ending(EndType::EndDate, Some(EndValue::Date(at(2015, 11, 6, 0, 0))));
        assert_eq!(
            describe(&job, now()),
            "Every 6 months from 5/11/2015 on 1st, until 6/11/2015"
        );
    }

    #[test]
    fn absent_end_type_reads_as_unset_bound() {
        let job = JobDescription::new(months(Some(2))).starting(at(2015, 11, 5, 0, 0));
        assert_eq!(
            describe(&job, now()),
            "Every 6 months from 5/11/2015 on 2nd, until Not set"
        );
    }

    #[test]
    fn absent_start_has_no_comma() {
        let job = JobDescription::new(months(None))
            .ending(EndType::EndDate, Some(EndValue::Date(at(2015, 11, 6, 0, 0))));
        assert_eq!(describe(&job, now()), "Every 6 months from Not set until 6/11/2015");
    }

    #[test]
    fn absent_day_is_not_set() {
        let job = JobDescription::new(months(None)).starting(at(2015, 11, 5, 0, 0));
        assert_eq!(
            describe(&job, now()),
            "Every 6 months from 5/11/2015 on Not set, until Not set"
        );
    }

    #[test]
    fn occurrence_count() {
        let job = JobDescription::new(months(None))
            .starting(at(2015, 11, 5, 0, 0))
            .ending(EndType::NumberOfOccurrences, Some(EndValue::Count(5)));
        assert_eq!(
            describe(&job, now()),
            "Every 6 months from 5/11/2015 on Not set, until after 5 occurrences"
        );
    }

    #[test]
    fn unlimited_has_no_end_clause() {
        let job = JobDescription::new(months(Some(28)))
            .starting(at(2015, 11, 5, 0, 0))
            .ending(EndType::Unlimited, None);
        assert_eq!(describe(&job, now()), "Every 6 months from 5/11/2015 on 28th");
    }

    #[test]
    fn today_with_day_and_count() {
        let job = JobDescription::new(Recurrence::every(3, RecurrenceType::Months).on_day(3))
            .starting(today_at(9, 29))
            .ending(EndType::NumberOfOccurrences, Some(EndValue::Count(1)));
        assert_eq!(
            describe(&job, now()),
            "Every 3 months from Today 9:29 on 3rd, until after 1 occurrences"
        );
    }

    #[test]
    fn every_single_day_today_unlimited() {
        let job = JobDescription::new(Recurrence::every(1, RecurrenceType::Days))
            .starting(today_at(9, 29))
            .ending(EndType::Unlimited, None);
        assert_eq!(describe(&job, now()), "Every day from Today, 9:29");
    }

    #[test]
    fn afternoon_uses_twelve_hour_clock() {
        let job = JobDescription::new(Recurrence::every(1, RecurrenceType::Hours))
            .starting(today_at(18, 25))
            .ending(EndType::Unlimited, None);
        assert_eq!(describe(&job, now()), "Every hour from Today, 6:25");
    }

    #[test]
    fn missing_interval_is_not_set() {
        let rule = Recurrence {
            kind: RecurrenceType::Days.code(),
            interval: None,
            day: None,
        };
        let job = JobDescription::new(rule)
            .starting(at(2015, 11, 5, 0, 0))
            .ending(EndType::Unlimited, None);
        assert_eq!(describe(&job, now()), "Every Not set days from 5/11/2015");
    }

    #[test]
    fn bounded_without_value_is_not_set() {
        let job = JobDescription::new(Recurrence::every(2, RecurrenceType::Days))
            .starting(at(2015, 11, 5, 0, 0))
            .ending(EndType::EndDate, None);
        assert_eq!(describe(&job, now()), "Every 2 days from 5/11/2015, until Not set");
    }
}
