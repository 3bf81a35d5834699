//! Booking window policy -- how far ahead patients may book.
//!
//! Slots are offered from midnight of the day `min_lead` after "now" up to
//! midnight of the day `max_horizon` after "now". Requested bounds are clamped
//! into that range.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// A resolved, non-inverted query window (both bounds inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl QueryWindow {
    /// # Errors
    /// Returns `SlotError::InvalidWindow` if `from > to`.
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Result<Self> {
        if from > to {
            return Err(SlotError::InvalidWindow { from, to });
        }
        Ok(Self { from, to })
    }
}

/// Minimum lead time and maximum horizon for bookable slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    min_lead: TimeDelta,
    max_horizon: TimeDelta,
}

impl Default for BookingWindow {
    /// Bookable from tomorrow up to one year ahead.
    fn default() -> Self {
        Self {
            min_lead: TimeDelta::days(1),
            max_horizon: TimeDelta::days(365),
        }
    }
}

impl BookingWindow {
    /// # Errors
    /// Returns `SlotError::InvalidConfig` if either duration is negative or the
    /// lead time exceeds the horizon.
    pub fn new(min_lead: TimeDelta, max_horizon: TimeDelta) -> Result<Self> {
        if min_lead < TimeDelta::zero() || max_horizon < TimeDelta::zero() {
            return Err(SlotError::InvalidConfig(
                "min_lead and max_horizon must not be negative".to_string(),
            ));
        }
        if min_lead > max_horizon {
            return Err(SlotError::InvalidConfig(format!(
                "min_lead ({}) exceeds max_horizon ({})",
                min_lead, max_horizon
            )));
        }
        Ok(Self {
            min_lead,
            max_horizon,
        })
    }

    pub fn from_days(min_lead_days: u32, max_horizon_days: u32) -> Result<Self> {
        Self::new(
            TimeDelta::days(i64::from(min_lead_days)),
            TimeDelta::days(i64::from(max_horizon_days)),
        )
    }

    pub fn min_lead(&self) -> TimeDelta {
        self.min_lead
    }

    pub fn max_horizon(&self) -> TimeDelta {
        self.max_horizon
    }

    /// Midnight of the first bookable day.
    pub fn earliest(&self, now: NaiveDateTime) -> NaiveDateTime {
        midnight_after(now, self.min_lead)
    }

    /// Midnight of the last bookable day.
    pub fn latest(&self, now: NaiveDateTime) -> NaiveDateTime {
        midnight_after(now, self.max_horizon)
    }

    /// Clamp the requested bounds into the booking window.
    ///
    /// Missing bounds default to [`earliest`](Self::earliest) and
    /// [`latest`](Self::latest).
    ///
    /// # Errors
    /// Returns `SlotError::InvalidWindow` if the clamped window is inverted.
    pub fn resolve(
        &self,
        now: NaiveDateTime,
        requested_from: Option<NaiveDateTime>,
        requested_to: Option<NaiveDateTime>,
    ) -> Result<QueryWindow> {
        let earliest = self.earliest(now);
        let latest = self.latest(now);

        let from = requested_from.map_or(earliest, |from| from.max(earliest));
        let to = requested_to.map_or(latest, |to| to.min(latest));
        QueryWindow::new(from, to)
    }
}

fn midnight_after(now: NaiveDateTime, offset: TimeDelta) -> NaiveDateTime {
    now.checked_add_signed(offset)
        .unwrap_or(NaiveDateTime::MAX)
        .date()
        .and_time(NaiveTime::MIN)
}
