use chrono::NaiveDateTime;
use thiserror::Error;

/// Rule-level problems reported back to whoever authored the recurrence.
///
/// These are ordinary return values: a rule is either fully valid or rejected
/// with the first failing check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Recurrence is required.")]
    Required,

    #[error("Invalid recurrence type.")]
    InvalidType,

    #[error("Interval is required for this type.")]
    IntervalRequired,

    #[error("Invalid \"{field}\" value - it must be an integer in the range from {min} to {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// A field was present but could not be read as an integer.
    #[error("Invalid \"{field}\" value - expected an integer, got {value}")]
    Malformed { field: &'static str, value: String },
}

/// Errors that abort an occurrence calculation.
///
/// Apart from `InvalidRecurrence` these only surface for rules that should
/// never have reached the calculator, or for a single execution requested in
/// the past.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Cannot calculate next on an invalid recurrence. {0}")]
    InvalidRecurrence(#[from] ValidationError),

    #[error("Cannot schedule a single execution in the past: {at}")]
    ScheduledInPast { at: NaiveDateTime },

    #[error("Cannot calculate next time from {from}: no match within {limit} iterations")]
    IterationLimit { limit: u64, from: NaiveDateTime },

    #[error("Recurrence type {code} has no step unit")]
    UnmappedType { code: i64 },

    #[error("Time of day must be between 0 and 1439 minutes, got {minutes}")]
    InvalidTimeOfDay { minutes: u32 },

    #[error("Date arithmetic out of range from {from}")]
    DateOutOfRange { from: NaiveDateTime },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
