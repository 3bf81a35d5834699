//! Conflict filters -- decide whether a candidate slot must be withheld.
//!
//! Closures and absences exclude a slot when they overlap it; overlap is strict,
//! so a blackout that ends exactly when a slot starts (or starts exactly when it
//! ends) is NOT a conflict. Bookings exclude a slot only on an exact
//! `(rule_id, date, slot_start_time)` match, and only while they are active.
//!
//! An empty collection never excludes anything. Malformed records (missing
//! scope id, inverted interval) never match.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use tracing::warn;

use crate::model::{
    Blackout, ConfirmedBooking, GeneratedSlot, LaboratoryClosure, OperatorAbsence,
};

/// True if any well-formed blackout scoped to `scope_id` overlaps the slot.
fn blackout_conflict<B: Blackout>(scope_id: &str, slot: &GeneratedSlot, blackouts: &[B]) -> bool {
    let (start, end) = (slot.start_datetime(), slot.end_datetime());
    blackouts.iter().any(|b| {
        b.is_well_formed() && b.scope_id() == Some(scope_id) && b.overlaps(start, end)
    })
}

/// True if the slot's laboratory is closed at any point during the slot.
pub fn closure_conflict(slot: &GeneratedSlot, closures: &[LaboratoryClosure]) -> bool {
    blackout_conflict(&slot.laboratory_id, slot, closures)
}

/// True if the slot's operator is absent at any point during the slot.
pub fn absence_conflict(slot: &GeneratedSlot, absences: &[OperatorAbsence]) -> bool {
    blackout_conflict(&slot.operator_id, slot, absences)
}

/// True if an active booking already holds this exact slot.
pub fn booking_conflict(slot: &GeneratedSlot, bookings: &[ConfirmedBooking]) -> bool {
    bookings.iter().any(|b| {
        b.active
            && b.rule_id == slot.rule_id
            && b.date == slot.date
            && b.slot_start_time == slot.slot_start_time
    })
}

type BookingKey<'a> = (&'a str, NaiveDate, NaiveTime);

/// Blackouts grouped by scope id and active bookings keyed by slot, built once
/// per generation call.
///
/// Gives the same answers as the three predicates above, without scanning every
/// record for every candidate slot.
#[derive(Debug, Default)]
pub struct ConflictIndex<'a> {
    closures: HashMap<&'a str, Vec<&'a LaboratoryClosure>>,
    absences: HashMap<&'a str, Vec<&'a OperatorAbsence>>,
    bookings: HashSet<BookingKey<'a>>,
}

fn group_by_scope<'a, B: Blackout>(kind: &str, blackouts: &'a [B]) -> HashMap<&'a str, Vec<&'a B>> {
    let mut grouped: HashMap<&'a str, Vec<&'a B>> = HashMap::new();
    for blackout in blackouts {
        match blackout.scope_id() {
            Some(scope) if blackout.is_well_formed() => {
                grouped.entry(scope).or_default().push(blackout);
            }
            _ => warn!(
                kind,
                scope = ?blackout.scope_id(),
                start = %blackout.start(),
                end = %blackout.end(),
                "ignoring malformed blackout"
            ),
        }
    }
    grouped
}

impl<'a> ConflictIndex<'a> {
    pub fn new(
        closures: &'a [LaboratoryClosure],
        absences: &'a [OperatorAbsence],
        bookings: &'a [ConfirmedBooking],
    ) -> Self {
        let bookings = bookings
            .iter()
            .filter(|b| b.active)
            .map(|b| (b.rule_id.as_str(), b.date, b.slot_start_time))
            .collect();

        Self {
            closures: group_by_scope("closure", closures),
            absences: group_by_scope("absence", absences),
            bookings,
        }
    }

    pub fn is_closed(&self, slot: &GeneratedSlot) -> bool {
        let (start, end) = (slot.start_datetime(), slot.end_datetime());
        self.closures
            .get(slot.laboratory_id.as_str())
            .is_some_and(|found| found.iter().any(|c| c.overlaps(start, end)))
    }

    pub fn is_absent(&self, slot: &GeneratedSlot) -> bool {
        let (start, end) = (slot.start_datetime(), slot.end_datetime());
        self.absences
            .get(slot.operator_id.as_str())
            .is_some_and(|found| found.iter().any(|a| a.overlaps(start, end)))
    }

    pub fn is_booked(&self, slot: &GeneratedSlot) -> bool {
        self.bookings
            .contains(&(slot.rule_id.as_str(), slot.date, slot.slot_start_time))
    }

    /// True if any of the three filters withholds the slot.
    pub fn excludes(&self, slot: &GeneratedSlot) -> bool {
        self.is_closed(slot) || self.is_absent(slot) || self.is_booked(slot)
    }
}
