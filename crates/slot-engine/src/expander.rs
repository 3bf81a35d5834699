//! Rule expansion -- turns one weekly availability rule into concrete candidate slots.
//!
//! Expansion is lazy: [`expand_rule`] returns a [`RuleExpansion`] iterator that
//! walks the rule's weekday one week at a time and cuts each working day into
//! `slot_duration_minutes` slots separated by `pause_minutes`. Time-of-day
//! arithmetic never wraps past midnight; a slot that would cross it ends the day.

use std::iter::FusedIterator;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

use crate::error::Result;
use crate::model::AvailabilityRule;

/// A slot produced by expansion, before any conflict filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl CandidateSlot {
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    pub fn end_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.end)
    }
}

/// Add whole minutes to a time of day. `None` when the result would cross
/// midnight in either direction.
pub fn add_minutes(time: NaiveTime, minutes: i64) -> Option<NaiveTime> {
    let (shifted, overflow) = time.overflowing_add_signed(TimeDelta::try_minutes(minutes)?);
    (overflow == 0).then_some(shifted)
}

/// First date on or after `date` that falls on `weekday`.
///
/// Returns `date` itself when it already matches.
pub fn align_to_weekday(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let current = date.weekday().num_days_from_monday();
    let shift = (weekday.num_days_from_monday() + 7 - current) % 7;
    date.checked_add_days(Days::new(u64::from(shift)))
}

/// Lazy, finite iterator over the candidate slots of one rule.
///
/// Cloning the iterator, or calling [`restart`](Self::restart), yields an
/// independent pass over the same sequence.
#[derive(Debug, Clone)]
pub struct RuleExpansion {
    day_start: NaiveTime,
    day_end: NaiveTime,
    duration_minutes: i64,
    pause_minutes: i64,
    first: Option<NaiveDate>,
    limit: NaiveDate,
    cursor: Option<NaiveDate>,
    next_start: Option<NaiveTime>,
}

impl RuleExpansion {
    fn empty(rule: &AvailabilityRule) -> Self {
        Self {
            day_start: rule.day_start_time,
            day_end: rule.day_end_time,
            duration_minutes: rule.slot_duration_minutes,
            pause_minutes: rule.pause_minutes,
            first: None,
            limit: rule.valid_to_date,
            cursor: None,
            next_start: None,
        }
    }

    /// A fresh iterator positioned at the first matching week.
    pub fn restart(&self) -> Self {
        Self {
            cursor: self.first,
            next_start: Some(self.day_start),
            ..self.clone()
        }
    }

    fn next_week(&mut self) {
        self.cursor = self
            .cursor
            .and_then(|date| date.checked_add_days(Days::new(7)))
            .filter(|date| *date <= self.limit);
        self.next_start = Some(self.day_start);
    }
}

impl Iterator for RuleExpansion {
    type Item = CandidateSlot;

    fn next(&mut self) -> Option<CandidateSlot> {
        loop {
            let date = self.cursor?;

            if let Some(start) = self.next_start.filter(|start| *start < self.day_end) {
                if let Some(end) =
                    add_minutes(start, self.duration_minutes).filter(|end| *end <= self.day_end)
                {
                    self.next_start = add_minutes(end, self.pause_minutes);
                    return Some(CandidateSlot { date, start, end });
                }
            }

            // Day exhausted (window too short, or the next slot would cross midnight).
            self.next_week();
        }
    }
}

impl FusedIterator for RuleExpansion {}

/// Expand a rule into its candidate slots within an optional datetime window.
///
/// The window bounds only narrow the range of *dates* walked:
/// expansion starts on `max(valid_from_date, window_from.date())` and stops after
/// `min(valid_to_date, window_to.date())`. Finer time-of-day filtering against
/// `window_from` is the generator's job.
///
/// Disabled rules, and windows that do not intersect the validity range,
/// expand to an empty sequence.
///
/// # Errors
/// Returns `SlotError::InvalidRule` if the rule breaks one of its invariants.
pub fn expand_rule(
    rule: &AvailabilityRule,
    window_from: Option<NaiveDateTime>,
    window_to: Option<NaiveDateTime>,
) -> Result<RuleExpansion> {
    rule.validate()?;

    let mut expansion = RuleExpansion::empty(rule);
    if !rule.enabled {
        return Ok(expansion);
    }

    let cursor = window_from
        .map(|from| from.date().max(rule.valid_from_date))
        .unwrap_or(rule.valid_from_date);
    let limit = window_to
        .map(|to| to.date().min(rule.valid_to_date))
        .unwrap_or(rule.valid_to_date);

    expansion.limit = limit;
    expansion.first = rule
        .day_of_week()
        .and_then(|weekday| align_to_weekday(cursor, weekday))
        .filter(|date| *date <= limit);
    Ok(expansion.restart())
}
