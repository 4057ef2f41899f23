use serde_json::Value;

use crate::error::ValidationError;
use crate::types::{Recurrence, RecurrenceType};

pub const MIN_INTERVAL: i64 = 1;
pub const MAX_INTERVAL: i64 = 1000;

/// Check a rule's structural and range invariants.
///
/// Checks run in a fixed order and stop at the first failure: type, interval,
/// then the anchor day for weekly and monthly rules. An `Interval` on a
/// `Once` rule is tolerated but still range-checked.
pub fn validate(rule: &Recurrence) -> Result<(), ValidationError> {
    if !(0..=RecurrenceType::MAX_CODE).contains(&rule.kind) {
        return Err(ValidationError::InvalidType);
    }
    let kind = RecurrenceType::from_code(rule.kind);

    match rule.interval {
        None if kind != Some(RecurrenceType::Once) => {
            return Err(ValidationError::IntervalRequired);
        }
        None => {}
        Some(interval) => check_range("Interval", interval, MIN_INTERVAL, MAX_INTERVAL)?,
    }

    match kind {
        Some(RecurrenceType::Weeks) => check_day(rule.day, 0, 6),
        Some(RecurrenceType::Months) => check_day(rule.day, 1, 31),
        _ => Ok(()),
    }
}

/// Normalize and validate an untyped JSON rule in one pass.
pub fn validate_json(value: &Value) -> Result<Recurrence, ValidationError> {
    let rule = Recurrence::from_json(value)?;
    validate(&rule)?;
    Ok(rule)
}

fn check_day(day: Option<i64>, min: i64, max: i64) -> Result<(), ValidationError> {
    match day {
        Some(day) => check_range("Day", day, min, max),
        None => Err(ValidationError::OutOfRange {
            field: "Day",
            min,
            max,
        }),
    }
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, min, max })
    }
}
