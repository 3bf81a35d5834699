//! Tests for multi-rule slot generation and pagination.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use slot_engine::{
    generate_slots, paginate, AvailabilityRule, ConfirmedBooking, GeneratedSlot,
    LaboratoryClosure, OperatorAbsence, RuleFilter, SlotError,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// A datetime on Monday 2026-03-02.
fn monday_at(h: u32, m: u32) -> NaiveDateTime {
    date(2026, 3, 2).and_time(time(h, m))
}

/// Single-Monday rule 09:00-10:10, 30 min slots, 10 min pause.
fn pause_rule() -> AvailabilityRule {
    AvailabilityRule::new(
        "rule-1",
        (date(2026, 3, 2), date(2026, 3, 2)),
        Weekday::Mon,
        (time(9, 0), time(10, 10)),
        30,
        10,
    )
    .unwrap()
    .with_scope("op-1", "lab-1", "mri")
    .with_names("Dr. Rossi", "North", "MRI")
}

fn starts(slots: &[GeneratedSlot]) -> Vec<(NaiveDate, NaiveTime)> {
    slots.iter().map(|s| (s.date, s.slot_start_time)).collect()
}

fn generate(rules: &[AvailabilityRule]) -> Vec<GeneratedSlot> {
    generate_slots(rules, None, None, None, None, None)
}

// ── Basic generation ────────────────────────────────────────────────────────

#[test]
fn slots_carry_rule_scope_and_names() {
    let slots = generate(&[pause_rule()]);

    assert_eq!(slots.len(), 2);
    let first = &slots[0];
    assert_eq!(first.rule_id, "rule-1");
    assert_eq!(first.operator_id, "op-1");
    assert_eq!(first.laboratory_id, "lab-1");
    assert_eq!(first.exam_type_id, "mri");
    assert_eq!(first.operator_name, "Dr. Rossi");
    assert_eq!(first.laboratory_name, "North");
    assert_eq!(first.exam_type_name, "MRI");
    assert_eq!(first.start_datetime(), monday_at(9, 0));
    assert_eq!(first.end_datetime(), monday_at(9, 30));
    assert_eq!(slots[1].slot_start_time, time(9, 40));
    assert_eq!(slots[1].slot_end_time, time(10, 10));
}

#[test]
fn rule_order_is_preserved_without_cross_rule_sort() {
    let late = AvailabilityRule::new(
        "late",
        (date(2026, 3, 2), date(2026, 3, 2)),
        Weekday::Mon,
        (time(14, 0), time(15, 0)),
        60,
        0,
    )
    .unwrap();
    let slots = generate(&[late, pause_rule()]);

    let ids: Vec<&str> = slots.iter().map(|s| s.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["late", "rule-1", "rule-1"]);
}

#[test]
fn generation_is_deterministic() {
    let rules = vec![pause_rule()];
    let closures = vec![LaboratoryClosure::new("lab-1", monday_at(9, 15), monday_at(9, 20)).unwrap()];

    let a = generate_slots(&rules, None, None, Some(&closures), None, None);
    let b = generate_slots(&rules, None, None, Some(&closures), None, None);
    assert_eq!(a, b);
}

// ── Filters ─────────────────────────────────────────────────────────────────

#[test]
fn closure_removes_only_overlapping_slot() {
    let closures = vec![LaboratoryClosure::new("lab-1", monday_at(9, 15), monday_at(9, 35)).unwrap()];
    let slots = generate_slots(&[pause_rule()], None, None, Some(&closures), None, None);

    assert_eq!(starts(&slots), vec![(date(2026, 3, 2), time(9, 40))]);
}

#[test]
fn closure_spanning_both_slots_removes_both() {
    // 09:15-09:45 overlaps 09:00-09:30 and also 09:40-10:10.
    let closures = vec![LaboratoryClosure::new("lab-1", monday_at(9, 15), monday_at(9, 45)).unwrap()];
    let slots = generate_slots(&[pause_rule()], None, None, Some(&closures), None, None);

    assert!(slots.is_empty());
}

#[test]
fn absence_removes_operator_slots() {
    let absences = vec![OperatorAbsence::new("op-1", monday_at(9, 30), monday_at(18, 0)).unwrap()];
    let slots = generate_slots(&[pause_rule()], None, None, None, Some(&absences), None);

    assert_eq!(starts(&slots), vec![(date(2026, 3, 2), time(9, 0))]);
}

#[test]
fn active_booking_removes_exactly_its_slot() {
    let bookings =
        vec![ConfirmedBooking::new("rule-1", date(2026, 3, 2), time(9, 0), time(9, 30)).unwrap()];
    let slots = generate_slots(&[pause_rule()], None, None, None, None, Some(&bookings));

    assert_eq!(starts(&slots), vec![(date(2026, 3, 2), time(9, 40))]);
}

#[test]
fn rejected_booking_does_not_remove_slot() {
    let bookings = vec![ConfirmedBooking::new("rule-1", date(2026, 3, 2), time(9, 0), time(9, 30))
        .unwrap()
        .rejected()];
    let slots = generate_slots(&[pause_rule()], None, None, None, None, Some(&bookings));

    assert_eq!(slots.len(), 2);
}

#[test]
fn empty_filter_collections_behave_like_absent_ones() {
    let with_empty = generate_slots(&[pause_rule()], None, None, Some(&[]), Some(&[]), Some(&[]));
    assert_eq!(with_empty, generate(&[pause_rule()]));
}

// ── Window ──────────────────────────────────────────────────────────────────

#[test]
fn datetime_from_compares_full_datetime() {
    let slots = generate_slots(&[pause_rule()], Some(monday_at(9, 20)), None, None, None, None);
    assert_eq!(starts(&slots), vec![(date(2026, 3, 2), time(9, 40))]);
}

#[test]
fn datetime_from_is_inclusive() {
    let slots = generate_slots(&[pause_rule()], Some(monday_at(9, 40)), None, None, None, None);
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].slot_start_time, time(9, 40));
}

#[test]
fn inverted_window_yields_no_slots() {
    let slots = generate_slots(
        &[pause_rule()],
        Some(monday_at(12, 0)),
        Some(monday_at(8, 0)),
        None,
        None,
        None,
    );
    assert!(slots.is_empty());
}

// ── Invalid and disabled rules ──────────────────────────────────────────────

#[test]
fn invalid_rule_is_skipped_without_affecting_others() {
    let mut broken = pause_rule();
    broken.id = "broken".to_string();
    broken.day_end_time = time(8, 0);

    let slots = generate(&[broken, pause_rule()]);
    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|s| s.rule_id == "rule-1"));
}

#[test]
fn repeated_rule_is_generated_once() {
    let slots = generate(&[pause_rule(), pause_rule()]);
    assert_eq!(starts(&slots), vec![(date(2026, 3, 2), time(9, 0)), (date(2026, 3, 2), time(9, 40))]);
}

#[test]
fn first_rule_wins_when_ids_collide() {
    let mut later = pause_rule();
    later.day_start_time = time(14, 0);
    later.day_end_time = time(15, 0);

    let slots = generate(&[pause_rule(), later]);
    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|s| s.slot_start_time < time(11, 0)));
}

#[test]
fn negative_duration_or_pause_skips_only_that_rule() {
    let mut negative_duration = pause_rule();
    negative_duration.id = "neg-duration".to_string();
    negative_duration.slot_duration_minutes = -30;
    let mut negative_pause = pause_rule();
    negative_pause.id = "neg-pause".to_string();
    negative_pause.pause_minutes = -10;

    let slots = generate(&[negative_duration, negative_pause, pause_rule()]);
    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|s| s.rule_id == "rule-1"));
}

#[test]
fn negative_numbers_deserialize_and_fail_validation() {
    let rule: AvailabilityRule = serde_json::from_value(serde_json::json!({
        "id": "neg",
        "operator_id": "op-1",
        "laboratory_id": "lab-1",
        "exam_type_id": "mri",
        "valid_from_date": "2026-03-02",
        "valid_to_date": "2026-03-02",
        "weekday": 0,
        "day_start_time": "09:00:00",
        "day_end_time": "10:00:00",
        "slot_duration_minutes": -30
    }))
    .unwrap();

    assert!(rule.validate().is_err());
    assert!(generate(&[rule]).is_empty());
}

#[test]
fn disabled_rule_produces_nothing() {
    let slots = generate(&[pause_rule().disabled()]);
    assert!(slots.is_empty());
}

// ── Rule filter ─────────────────────────────────────────────────────────────

#[test]
fn rule_filter_selects_matching_enabled_rules() {
    let mut other = pause_rule().with_scope("op-2", "lab-1", "ct");
    other.id = "rule-2".to_string();
    let rules = vec![pause_rule(), other, pause_rule().disabled()];

    let by_lab = RuleFilter {
        laboratory_id: Some("lab-1".to_string()),
        ..RuleFilter::default()
    };
    assert_eq!(by_lab.select(&rules).len(), 2);

    let by_exam = RuleFilter {
        exam_type_id: Some("ct".to_string()),
        ..RuleFilter::default()
    };
    let selected = by_exam.select(&rules);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, "rule-2");

    assert!(RuleFilter::default().is_empty());
    assert_eq!(RuleFilter::default().select(&rules).len(), 2);
}

#[test]
fn rule_filter_narrows_blackouts() {
    let closures = vec![
        LaboratoryClosure::new("lab-1", monday_at(9, 0), monday_at(10, 0)).unwrap(),
        LaboratoryClosure::new("lab-2", monday_at(9, 0), monday_at(10, 0)).unwrap(),
    ];
    let absences = vec![
        OperatorAbsence::new("op-1", monday_at(9, 0), monday_at(10, 0)).unwrap(),
        OperatorAbsence::new("op-2", monday_at(9, 0), monday_at(10, 0)).unwrap(),
    ];
    let filter = RuleFilter {
        operator_id: Some("op-2".to_string()),
        laboratory_id: Some("lab-1".to_string()),
        ..RuleFilter::default()
    };

    let kept_closures = filter.select_closures(&closures);
    assert_eq!(kept_closures.len(), 1);
    assert_eq!(kept_closures[0].laboratory_id.as_deref(), Some("lab-1"));

    let kept_absences = filter.select_absences(&absences);
    assert_eq!(kept_absences.len(), 1);
    assert_eq!(kept_absences[0].operator_id.as_deref(), Some("op-2"));
}

// ── Pagination ──────────────────────────────────────────────────────────────

#[test]
fn second_page_of_one_returns_second_slot() {
    let slots = generate(&[pause_rule()]);
    let page = paginate(slots.clone(), 1, 1).unwrap();

    assert_eq!(page.offset, 1);
    assert_eq!(page.limit, 1);
    assert_eq!(page.total_slots, 2);
    assert_eq!(page.slots, vec![slots[1].clone()]);
}

#[test]
fn offset_past_end_returns_empty_page() {
    let page = paginate(generate(&[pause_rule()]), 5, 10).unwrap();

    assert_eq!(page.total_slots, 2);
    assert!(page.slots.is_empty());
}

#[test]
fn partial_trailing_page_is_allowed() {
    let page = paginate(generate(&[pause_rule()]), 1, 10).unwrap();
    assert_eq!(page.slots.len(), 1);
}

#[test]
fn zero_limit_is_an_input_error() {
    let result = paginate(generate(&[pause_rule()]), 0, 0);
    assert!(matches!(result, Err(SlotError::InvalidPage(_))));
}

#[test]
fn page_serializes_with_envelope_field_names() {
    let page = paginate(generate(&[pause_rule()]), 0, 1).unwrap();
    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["offset"], 0);
    assert_eq!(json["limit"], 1);
    assert_eq!(json["total_slots"], 2);
    assert_eq!(json["slots"][0]["date"], "2026-03-02");
    assert_eq!(json["slots"][0]["slot_start_time"], "09:00:00");
    assert_eq!(json["slots"][0]["slot_end_time"], "09:30:00");
}
