//! Slot generation across many rules.
//!
//! Expands every rule, drops candidates that start before the lower bound,
//! then runs the closure / absence / booking filters on what is left. Output
//! keeps rule input order, and chronological order within each rule.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::conflict::ConflictIndex;
use crate::expander::{expand_rule, CandidateSlot};
use crate::model::{
    AvailabilityRule, Blackout, ConfirmedBooking, GeneratedSlot, LaboratoryClosure,
    OperatorAbsence,
};

/// Optional scope criteria narrowing which rules (and blackouts) take part in
/// a generation call. Absent criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub exam_type_id: Option<String>,
    pub operator_id: Option<String>,
    pub laboratory_id: Option<String>,
}

fn criterion_matches(criterion: Option<&str>, value: &str) -> bool {
    criterion.is_none_or(|wanted| wanted == value)
}

impl RuleFilter {
    pub fn is_empty(&self) -> bool {
        self.exam_type_id.is_none() && self.operator_id.is_none() && self.laboratory_id.is_none()
    }

    pub fn matches(&self, rule: &AvailabilityRule) -> bool {
        criterion_matches(self.exam_type_id.as_deref(), &rule.exam_type_id)
            && criterion_matches(self.operator_id.as_deref(), &rule.operator_id)
            && criterion_matches(self.laboratory_id.as_deref(), &rule.laboratory_id)
    }

    /// Rules that are enabled and satisfy every present criterion, in input order.
    pub fn select(&self, rules: &[AvailabilityRule]) -> Vec<AvailabilityRule> {
        rules
            .iter()
            .filter(|rule| rule.enabled && self.matches(rule))
            .cloned()
            .collect()
    }

    /// Closures for the requested laboratory (all of them when none was requested).
    pub fn select_closures(&self, closures: &[LaboratoryClosure]) -> Vec<LaboratoryClosure> {
        select_scoped(self.laboratory_id.as_deref(), closures)
    }

    /// Absences for the requested operator (all of them when none was requested).
    pub fn select_absences(&self, absences: &[OperatorAbsence]) -> Vec<OperatorAbsence> {
        select_scoped(self.operator_id.as_deref(), absences)
    }
}

fn select_scoped<B: Blackout + Clone>(scope: Option<&str>, blackouts: &[B]) -> Vec<B> {
    blackouts
        .iter()
        .filter(|b| scope.is_none() || b.scope_id() == scope)
        .cloned()
        .collect()
}

fn to_slot(rule: &AvailabilityRule, candidate: CandidateSlot) -> GeneratedSlot {
    GeneratedSlot {
        rule_id: rule.id.clone(),
        exam_type_id: rule.exam_type_id.clone(),
        laboratory_id: rule.laboratory_id.clone(),
        operator_id: rule.operator_id.clone(),
        exam_type_name: rule.exam_type_name.clone(),
        laboratory_name: rule.laboratory_name.clone(),
        operator_name: rule.operator_name.clone(),
        date: candidate.date,
        slot_start_time: candidate.start,
        slot_end_time: candidate.end,
    }
}

/// Generate every bookable slot for `rules` inside the optional window.
///
/// - `datetime_from` -- inclusive lower bound compared against each slot's full
///   start datetime.
/// - `datetime_to` -- inclusive upper bound on the slot *date*.
/// - `closures` / `absences` / `bookings` -- `None` or an empty slice disables
///   the corresponding filter.
///
/// Invalid rules are logged and skipped; they never prevent other rules from
/// producing slots. A rule whose id was already seen is skipped as well, so
/// each id contributes its slots once. An inverted window yields no slots.
pub fn generate_slots(
    rules: &[AvailabilityRule],
    datetime_from: Option<NaiveDateTime>,
    datetime_to: Option<NaiveDateTime>,
    closures: Option<&[LaboratoryClosure]>,
    absences: Option<&[OperatorAbsence]>,
    bookings: Option<&[ConfirmedBooking]>,
) -> Vec<GeneratedSlot> {
    if let (Some(from), Some(to)) = (datetime_from, datetime_to) {
        if from > to {
            debug!(%from, %to, "inverted window, no slots generated");
            return Vec::new();
        }
    }

    let index = ConflictIndex::new(
        closures.unwrap_or_default(),
        absences.unwrap_or_default(),
        bookings.unwrap_or_default(),
    );

    let mut seen = HashSet::new();
    let mut slots = Vec::new();
    for rule in rules {
        if !seen.insert(rule.id.as_str()) {
            warn!(rule_id = %rule.id, "skipping duplicate rule");
            continue;
        }

        let expansion = match expand_rule(rule, datetime_from, datetime_to) {
            Ok(expansion) => expansion,
            Err(err) => {
                warn!(rule_id = %rule.id, "skipping rule: {err}");
                continue;
            }
        };

        let before = slots.len();
        slots.extend(
            expansion
                .filter(|candidate| datetime_from.is_none_or(|from| candidate.start_datetime() >= from))
                .map(|candidate| to_slot(rule, candidate))
                .filter(|slot| !index.excludes(slot)),
        );
        debug!(rule_id = %rule.id, slots = slots.len() - before, "rule expanded");
    }

    debug!(total = slots.len(), rules = rules.len(), "slot generation finished");
    slots
}
