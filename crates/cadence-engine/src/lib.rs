//! `cadence-engine`: recurrence rules for scheduled jobs.
//!
//! # Overview
//!
//! A [`Recurrence`] says how often a job repeats. The [`RecurrenceEngine`]
//! validates rules, works out when a job first fires and when it fires next,
//! and phrases the schedule in English. All times are naive calendar times on
//! minute boundaries; zone handling belongs to the caller.
//!
//! # Recurrence types
//!
//! | Code | Type      | Step      | `Day`                         |
//! |------|-----------|-----------|-------------------------------|
//! | 0    | `Once`    | none      | unused                        |
//! | 1    | `Minutes` | N minutes | unused                        |
//! | 2    | `Hours`   | N hours   | unused                        |
//! | 3    | `Days`    | N days    | unused                        |
//! | 4    | `Weeks`   | N weeks   | day of week, 0 = Sunday       |
//! | 5    | `Months`  | N months  | day of month, clamped to the month's end |
//! | 6    | reserved  | none      | -                             |

pub mod clock;
pub mod describe;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod types;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::RecurrenceEngine;
pub use error::{Result, ScheduleError, ValidationError};
pub use types::{EndType, EndValue, JobDescription, RawRecurrence, Recurrence, RecurrenceType};
