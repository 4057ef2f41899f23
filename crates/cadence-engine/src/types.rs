use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// How a job repeats. The numeric codes are the persisted representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecurrenceType {
    Once,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl RecurrenceType {
    /// Highest code accepted by validation. Code 6 is reserved and maps to no
    /// variant.
    pub const MAX_CODE: i64 = 6;

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Once),
            1 => Some(Self::Minutes),
            2 => Some(Self::Hours),
            3 => Some(Self::Days),
            4 => Some(Self::Weeks),
            5 => Some(Self::Months),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Once => 0,
            Self::Minutes => 1,
            Self::Hours => 2,
            Self::Days => 3,
            Self::Weeks => 4,
            Self::Months => 5,
        }
    }

    /// Lower-case unit name used in descriptions ("every 3 hours").
    pub fn plural(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }

    /// Unit name for an interval of one ("every day").
    pub fn singular(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Minutes => "minute",
            Self::Hours => "hour",
            Self::Days => "day",
            Self::Weeks => "week",
            Self::Months => "month",
        }
    }
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecurrenceType::Once => "Once",
            RecurrenceType::Minutes => "Minutes",
            RecurrenceType::Hours => "Hours",
            RecurrenceType::Days => "Days",
            RecurrenceType::Weeks => "Weeks",
            RecurrenceType::Months => "Months",
        };
        write!(f, "{s}")
    }
}

/// A recurrence rule as persisted by the caller.
///
/// Fields hold plain integers so that out-of-range values survive until
/// validation reports them; see [`crate::validate::validate`].
/// Deserialization goes through [`RawRecurrence`], so numeric strings such as
/// `"Interval": "3"` are accepted and anything else non-integer is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecurrence")]
pub struct Recurrence {
    #[serde(rename = "Type")]
    pub kind: i64,
    #[serde(rename = "Interval", skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(rename = "Day", skip_serializing_if = "Option::is_none")]
    pub day: Option<i64>,
}

impl Recurrence {
    pub fn once() -> Self {
        Self {
            kind: RecurrenceType::Once.code(),
            interval: None,
            day: None,
        }
    }

    pub fn every(interval: i64, kind: RecurrenceType) -> Self {
        Self {
            kind: kind.code(),
            interval: Some(interval),
            day: None,
        }
    }

    /// Anchor day: day-of-week (0 = Sunday) for weekly rules, day-of-month for
    /// monthly rules.
    pub fn on_day(mut self, day: i64) -> Self {
        self.day = Some(day);
        self
    }

    /// The typed recurrence kind, `None` for the reserved or unknown codes.
    pub fn recurrence_type(&self) -> Option<RecurrenceType> {
        RecurrenceType::from_code(self.kind)
    }

    /// Normalize an untyped JSON rule. `null` means no rule was supplied.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Null => Err(ValidationError::Required),
            Value::Object(map) => RawRecurrence::from_map(map).try_into(),
            other => Err(ValidationError::Malformed {
                field: "Recurrence",
                value: other.to_string(),
            }),
        }
    }
}

/// Loosely typed rule as it may come out of storage: every field is optional
/// and may be a number or a numeric string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecurrence {
    #[serde(rename = "Type", default)]
    pub kind: Option<Value>,
    #[serde(rename = "Interval", default)]
    pub interval: Option<Value>,
    #[serde(rename = "Day", default)]
    pub day: Option<Value>,
}

impl RawRecurrence {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            kind: map.get("Type").cloned(),
            interval: map.get("Interval").cloned(),
            day: map.get("Day").cloned(),
        }
    }
}

impl TryFrom<RawRecurrence> for Recurrence {
    type Error = ValidationError;

    fn try_from(raw: RawRecurrence) -> Result<Self, Self::Error> {
        let kind = read_int("Type", raw.kind.as_ref())
            .ok()
            .flatten()
            .ok_or(ValidationError::InvalidType)?;

        Ok(Self {
            kind,
            interval: read_int("Interval", raw.interval.as_ref())?,
            day: read_int("Day", raw.day.as_ref())?,
        })
    }
}

/// Read an optional integer field, accepting JSON integers, integral floats
/// and numeric strings.
fn read_int(field: &'static str, value: Option<&Value>) -> Result<Option<i64>, ValidationError> {
    let malformed = |v: &Value| ValidationError::Malformed {
        field,
        value: v.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(malformed(v)),
            }
        }
        Some(v @ Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| malformed(v)),
        Some(v) => Err(malformed(v)),
    }
}

/// How a job's run series ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndType {
    Unlimited,
    EndDate,
    NumberOfOccurrences,
}

/// Payload matching [`EndType`]: a last date or a run count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndValue {
    Count(u32),
    Date(NaiveDateTime),
}

/// Everything the describer needs to phrase a job's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDescription {
    pub recurrence: Recurrence,
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    /// Absent is treated as bounded, not as `Unlimited`.
    #[serde(default)]
    pub end_type: Option<EndType>,
    #[serde(default)]
    pub end_value: Option<EndValue>,
}

impl JobDescription {
    pub fn new(recurrence: Recurrence) -> Self {
        Self {
            recurrence,
            start_date: None,
            end_type: None,
            end_value: None,
        }
    }

    pub fn starting(mut self, start: NaiveDateTime) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn ending(mut self, end_type: EndType, end_value: Option<EndValue>) -> Self {
        self.end_type = Some(end_type);
        self.end_value = end_value;
        self
    }
}
