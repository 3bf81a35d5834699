use std::hint::black_box;

use chrono::{NaiveDate, NaiveTime, TimeDelta, Weekday};
use criterion::{criterion_group, criterion_main, Criterion};
use slot_engine::{
    generate_slots, AvailabilityRule, ConfirmedBooking, LaboratoryClosure, OperatorAbsence,
};

const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// 10 labs x 5 weekdays of 08:00-18:00 availability over one year.
fn year_of_rules() -> Vec<AvailabilityRule> {
    let from = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
    let hours = (
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    );

    (0..10)
        .flat_map(|lab| {
            WEEKDAYS.iter().map(move |weekday| {
                AvailabilityRule::new(format!("rule-{lab}-{weekday}"), (from, to), *weekday, hours, 20, 5)
                    .unwrap()
                    .with_scope(format!("op-{lab}"), format!("lab-{lab}"), "exam")
            })
        })
        .collect()
}

fn bench_generation(c: &mut Criterion) {
    let rules = year_of_rules();
    let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap().and_time(NaiveTime::MIN);

    let closures: Vec<LaboratoryClosure> = (0..200)
        .map(|i| {
            let start = day + TimeDelta::days(i) + TimeDelta::hours(10);
            LaboratoryClosure::new(format!("lab-{}", i % 10), start, start + TimeDelta::hours(2)).unwrap()
        })
        .collect();
    let absences: Vec<OperatorAbsence> = (0..200)
        .map(|i| {
            let start = day + TimeDelta::days(i) + TimeDelta::hours(14);
            OperatorAbsence::new(format!("op-{}", i % 10), start, start + TimeDelta::hours(1)).unwrap()
        })
        .collect();
    let bookings: Vec<ConfirmedBooking> = generate_slots(&rules, None, None, None, None, None)
        .iter()
        .step_by(3)
        .map(|s| {
            ConfirmedBooking::new(s.rule_id.clone(), s.date, s.slot_start_time, s.slot_end_time).unwrap()
        })
        .collect();

    c.bench_function("expand_only", |b| {
        b.iter(|| generate_slots(black_box(&rules), None, None, None, None, None))
    });

    c.bench_function("expand_and_filter", |b| {
        b.iter(|| {
            generate_slots(
                black_box(&rules),
                Some(day),
                None,
                Some(&closures),
                Some(&absences),
                Some(&bookings),
            )
        })
    });
}

criterion_group!(benches, bench_generation);
criterion_main!(benches);
