//! Domain records consumed and produced by the slot generator.
//!
//! Every input entity checks its invariants in `new`. Records that arrive
//! through serde skip that constructor, so the generator re-checks them with
//! [`AvailabilityRule::validate`] and [`Blackout::is_well_formed`] before use.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

fn enabled_by_default() -> bool {
    true
}

/// Map a 0-based weekday index (0 = Monday … 6 = Sunday) to a chrono [`Weekday`].
pub fn weekday_from_index(index: i64) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// A weekly recurring availability window for one operator, at one laboratory,
/// for one exam type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: String,
    pub operator_id: String,
    pub laboratory_id: String,
    pub exam_type_id: String,
    #[serde(default)]
    pub operator_name: String,
    #[serde(default)]
    pub laboratory_name: String,
    #[serde(default)]
    pub exam_type_name: String,
    /// First date the rule applies to (inclusive).
    pub valid_from_date: NaiveDate,
    /// Last date the rule applies to (inclusive).
    pub valid_to_date: NaiveDate,
    /// Day of week, 0 = Monday … 6 = Sunday. Out-of-range values (negative
    /// included) deserialize and then fail [`validate`](Self::validate).
    pub weekday: i64,
    pub day_start_time: NaiveTime,
    pub day_end_time: NaiveTime,
    /// Must be positive; see [`validate`](Self::validate).
    pub slot_duration_minutes: i64,
    /// Dead time between consecutive slots on the same day.
    #[serde(default)]
    pub pause_minutes: i64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl AvailabilityRule {
    /// Build an enabled rule with empty scope ids and display names.
    ///
    /// Use [`with_scope`](Self::with_scope) and [`with_names`](Self::with_names)
    /// to attach the operator / laboratory / exam type it belongs to.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidRule` when the validity dates are inverted,
    /// the daily window is empty or inverted, or the slot duration is zero.
    pub fn new(
        id: impl Into<String>,
        valid_dates: (NaiveDate, NaiveDate),
        weekday: Weekday,
        day_hours: (NaiveTime, NaiveTime),
        slot_duration_minutes: u32,
        pause_minutes: u32,
    ) -> Result<Self> {
        let rule = Self {
            id: id.into(),
            operator_id: String::new(),
            laboratory_id: String::new(),
            exam_type_id: String::new(),
            operator_name: String::new(),
            laboratory_name: String::new(),
            exam_type_name: String::new(),
            valid_from_date: valid_dates.0,
            valid_to_date: valid_dates.1,
            weekday: i64::from(weekday.num_days_from_monday()),
            day_start_time: day_hours.0,
            day_end_time: day_hours.1,
            slot_duration_minutes: i64::from(slot_duration_minutes),
            pause_minutes: i64::from(pause_minutes),
            enabled: true,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn with_scope(
        mut self,
        operator_id: impl Into<String>,
        laboratory_id: impl Into<String>,
        exam_type_id: impl Into<String>,
    ) -> Self {
        self.operator_id = operator_id.into();
        self.laboratory_id = laboratory_id.into();
        self.exam_type_id = exam_type_id.into();
        self
    }

    pub fn with_names(
        mut self,
        operator_name: impl Into<String>,
        laboratory_name: impl Into<String>,
        exam_type_name: impl Into<String>,
    ) -> Self {
        self.operator_name = operator_name.into();
        self.laboratory_name = laboratory_name.into();
        self.exam_type_name = exam_type_name.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The rule's weekday, or `None` when the stored index is out of range.
    pub fn day_of_week(&self) -> Option<Weekday> {
        weekday_from_index(self.weekday)
    }

    /// Check the rule invariants.
    ///
    /// Numeric fields are signed, so out-of-range values read from JSON fail
    /// here for the offending rule instead of failing deserialization.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.valid_from_date > self.valid_to_date {
            format!(
                "valid_from_date {} is after valid_to_date {}",
                self.valid_from_date, self.valid_to_date
            )
        } else if self.day_start_time >= self.day_end_time {
            format!(
                "day_start_time {} is not before day_end_time {}",
                self.day_start_time, self.day_end_time
            )
        } else if self.slot_duration_minutes <= 0 {
            "slot_duration_minutes must be positive".to_string()
        } else if self.pause_minutes < 0 {
            "pause_minutes must not be negative".to_string()
        } else if self.day_of_week().is_none() {
            format!("weekday {} is outside 0..=6", self.weekday)
        } else {
            return Ok(());
        };

        Err(SlotError::InvalidRule {
            rule_id: self.id.clone(),
            reason,
        })
    }
}

/// A time range during which slots are suppressed for one scope (a laboratory
/// or an operator).
///
/// The range is treated as half-open: a slot that ends exactly when the
/// blackout starts, or starts exactly when it ends, does not overlap it.
pub trait Blackout {
    /// The laboratory or operator this blackout applies to. `None` marks a
    /// malformed record that never matches any slot.
    fn scope_id(&self) -> Option<&str>;
    fn start(&self) -> NaiveDateTime;
    fn end(&self) -> NaiveDateTime;

    fn is_well_formed(&self) -> bool {
        self.scope_id().is_some_and(|id| !id.is_empty()) && self.start() < self.end()
    }

    /// Strict overlap test against `[start, end)`.
    fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end() && end > self.start()
    }
}

fn check_interval(start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
    if start < end {
        Ok(())
    } else {
        Err(SlotError::InvalidInterval { start, end })
    }
}

/// A period during which a laboratory is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaboratoryClosure {
    #[serde(default)]
    pub laboratory_id: Option<String>,
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
}

impl LaboratoryClosure {
    pub fn new(
        laboratory_id: impl Into<String>,
        start_datetime: NaiveDateTime,
        end_datetime: NaiveDateTime,
    ) -> Result<Self> {
        check_interval(start_datetime, end_datetime)?;
        Ok(Self {
            laboratory_id: Some(laboratory_id.into()),
            start_datetime,
            end_datetime,
        })
    }
}

impl Blackout for LaboratoryClosure {
    fn scope_id(&self) -> Option<&str> {
        self.laboratory_id.as_deref()
    }

    fn start(&self) -> NaiveDateTime {
        self.start_datetime
    }

    fn end(&self) -> NaiveDateTime {
        self.end_datetime
    }
}

/// A period during which an operator is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorAbsence {
    #[serde(default)]
    pub operator_id: Option<String>,
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
}

impl OperatorAbsence {
    pub fn new(
        operator_id: impl Into<String>,
        start_datetime: NaiveDateTime,
        end_datetime: NaiveDateTime,
    ) -> Result<Self> {
        check_interval(start_datetime, end_datetime)?;
        Ok(Self {
            operator_id: Some(operator_id.into()),
            start_datetime,
            end_datetime,
        })
    }
}

impl Blackout for OperatorAbsence {
    fn scope_id(&self) -> Option<&str> {
        self.operator_id.as_deref()
    }

    fn start(&self) -> NaiveDateTime {
        self.start_datetime
    }

    fn end(&self) -> NaiveDateTime {
        self.end_datetime
    }
}

/// An existing reservation of one slot produced by `rule_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedBooking {
    pub rule_id: String,
    pub date: NaiveDate,
    pub slot_start_time: NaiveTime,
    pub slot_end_time: NaiveTime,
    /// `false` once the booking has been rejected; inactive bookings free the slot.
    #[serde(default = "enabled_by_default")]
    pub active: bool,
}

impl ConfirmedBooking {
    pub fn new(
        rule_id: impl Into<String>,
        date: NaiveDate,
        slot_start_time: NaiveTime,
        slot_end_time: NaiveTime,
    ) -> Result<Self> {
        let rule_id = rule_id.into();
        if slot_start_time >= slot_end_time {
            return Err(SlotError::InvalidBooking {
                rule_id,
                reason: format!(
                    "slot_start_time {} is not before slot_end_time {}",
                    slot_start_time, slot_end_time
                ),
            });
        }
        Ok(Self {
            rule_id,
            date,
            slot_start_time,
            slot_end_time,
            active: true,
        })
    }

    /// Mark the booking as rejected.
    pub fn rejected(mut self) -> Self {
        self.active = false;
        self
    }
}

/// A bookable slot. Built fresh on every generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSlot {
    pub rule_id: String,
    pub exam_type_id: String,
    pub laboratory_id: String,
    pub operator_id: String,
    pub exam_type_name: String,
    pub laboratory_name: String,
    pub operator_name: String,
    pub date: NaiveDate,
    pub slot_start_time: NaiveTime,
    pub slot_end_time: NaiveTime,
}

impl GeneratedSlot {
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.slot_start_time)
    }

    pub fn end_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.slot_end_time)
    }
}
