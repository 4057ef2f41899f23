use std::sync::Arc;

use cadence_core::config::EngineConfig;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::{
    clock::{truncate_to_minute, Clock, FixedClock, SystemClock},
    describe::describe,
    error::{Result, ValidationError},
    schedule,
    types::{JobDescription, Recurrence},
    validate::validate,
};

/// Stateless recurrence service bound to a clock.
///
/// Cloning is cheap and clones share the clock, so one engine can be handed to
/// every caller that needs it.
#[derive(Clone)]
pub struct RecurrenceEngine {
    clock: Arc<dyn Clock>,
}

impl RecurrenceEngine {
    /// Engine reading the local wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Engine over a clock the caller keeps a handle to (e.g. a [`FixedClock`]
    /// a test advances between calls).
    pub fn with_shared_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Pinned clock when `config.now` is set, wall clock otherwise.
    pub fn from_config(config: &EngineConfig) -> Self {
        match config.now {
            Some(now) => {
                info!(%now, "engine clock pinned by configuration");
                Self::with_clock(FixedClock::new(now))
            }
            None => Self::new(),
        }
    }

    /// Current time, truncated to the minute.
    pub fn now(&self) -> NaiveDateTime {
        truncate_to_minute(self.clock.now())
    }

    pub fn validate(&self, rule: &Recurrence) -> std::result::Result<(), ValidationError> {
        validate(rule)
    }

    /// See [`schedule::first_occurrence`].
    pub fn first_occurrence(
        &self,
        rule: &Recurrence,
        from_date: NaiveDate,
        time_of_day_minutes: u32,
    ) -> Result<NaiveDateTime> {
        schedule::first_occurrence(rule, from_date, time_of_day_minutes, self.now())
    }

    /// See [`schedule::next_occurrence`].
    pub fn next_occurrence(&self, rule: &Recurrence, from: NaiveDateTime) -> Result<NaiveDateTime> {
        schedule::next_occurrence(rule, from, self.now())
    }

    /// See [`schedule::next_scheduled_time`].
    pub fn next_scheduled_time(&self, rule: &Recurrence, from: NaiveDateTime) -> Result<NaiveDateTime> {
        schedule::next_scheduled_time(rule, from, self.now())
    }

    pub fn describe(&self, job: &JobDescription) -> String {
        describe(job, self.now())
    }
}

impl Default for RecurrenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecurrenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecurrenceEngine")
            .field("now", &self.now())
            .finish()
    }
}
