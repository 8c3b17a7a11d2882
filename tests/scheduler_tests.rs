use beach_planner::booking::scheduler::{
    apply_practice, apply_tournament, reapply_practices, ApplyOutcome, Horizon,
};
use beach_planner::booking::slot::Court;
use beach_planner::booking::store::{BookingStore, SlotValue};
use beach_planner::roster::{PracticeDef, TournamentDef};
use chrono::{Datelike, NaiveDate, Weekday};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monday_practice() -> PracticeDef {
    PracticeDef {
        weekday: "Lundi".to_string(),
        start: "18:00".to_string(),
        end: "20:00".to_string(),
        coach: "A".to_string(),
        level: "Débutant".to_string(),
        gender: "Mixte".to_string(),
        court1: true,
        court2: false,
    }
}

#[test]
fn collision_free_practice_blocks_every_matching_slot_and_nothing_else() {
    let mut store = BookingStore::new();
    let horizon = Horizon::year(2026);

    let outcome = apply_practice(&mut store, &monday_practice(), &horizon).unwrap();
    // 52 Mondays x 2 hours x 1 court.
    assert_eq!(outcome, ApplyOutcome::Applied { slots_written: 104 });

    let expected = SlotValue::parse("ENTRAINEMENT|A|Mixte|Débutant");
    for day in horizon.days() {
        for hour in 0..14u8 {
            let on_monday_evening =
                day.weekday() == Weekday::Mon && (hour == 10 || hour == 11);
            let value = store.court(day, hour, Court::One);
            if on_monday_evening {
                assert_eq!(value, expected, "{} hour {}", day, hour);
            } else {
                assert!(value.is_free(), "{} hour {} should be free", day, hour);
            }
            // Court 2 was not requested and must never be touched.
            assert!(store.court(day, hour, Court::Two).is_free());
        }
    }
}

#[test]
fn reapplying_the_same_practice_reports_every_slot_as_conflict() {
    let mut store = BookingStore::new();
    let horizon = Horizon::year(2026);
    let def = monday_practice();

    apply_practice(&mut store, &def, &horizon).unwrap();
    let snapshot = store.clone();

    match apply_practice(&mut store, &def, &horizon).unwrap() {
        ApplyOutcome::Rejected(conflicts) => {
            assert_eq!(conflicts.len(), 104);
            // First Monday of 2026 is January 5th; scan order is
            // date, then hour, then court.
            assert_eq!(conflicts[0].to_string(), "5/1/2026 - Terrain 1 - 18h");
            assert_eq!(conflicts[1].to_string(), "5/1/2026 - Terrain 1 - 19h");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(store, snapshot, "a rejected application must not write");
}

#[test]
fn one_occupied_slot_rejects_the_whole_year() {
    let mut store = BookingStore::new();
    let horizon = Horizon::year(2026);

    // A staffer already runs court 1 on one Monday evening in October.
    store
        .assign_staffer(date(2026, 10, 12), 10, Court::One, "Jean Dupont")
        .unwrap();
    let snapshot = store.clone();

    match apply_practice(&mut store, &monday_practice(), &horizon).unwrap() {
        ApplyOutcome::Rejected(conflicts) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].to_string(), "12/10/2026 - Terrain 1 - 18h");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(store, snapshot, "no key in the horizon may change");
}

#[test]
fn practice_respects_a_custom_horizon() {
    let mut store = BookingStore::new();
    // Two weeks only: exactly two Mondays (June 1st and 8th).
    let horizon = Horizon::new(date(2026, 6, 1), date(2026, 6, 14)).unwrap();

    let outcome = apply_practice(&mut store, &monday_practice(), &horizon).unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied { slots_written: 4 });
    assert!(store.court(date(2026, 6, 1), 10, Court::One).is_block());
    assert!(store.court(date(2026, 6, 15), 10, Court::One).is_free());
}

#[test]
fn unknown_weekday_fails_before_any_write() {
    let mut store = BookingStore::new();
    let mut def = monday_practice();
    def.weekday = "Mondaze".to_string();
    assert!(apply_practice(&mut store, &def, &Horizon::year(2026)).is_err());
    assert_eq!(store, BookingStore::new());
}

#[test]
fn tournament_blocks_both_courts_for_one_day_only() {
    let mut store = BookingStore::new();
    let def = TournamentDef {
        date: date(2026, 7, 18),
        start: "09:00".to_string(),
        end: "18:00".to_string(),
        level: "S1".to_string(),
        gender: "Mixte".to_string(),
        court1: true,
        court2: true,
    };

    let outcome = apply_tournament(&mut store, &def).unwrap();
    // 9 hours x 2 courts.
    assert_eq!(outcome, ApplyOutcome::Applied { slots_written: 18 });

    let expected = SlotValue::parse("TOURNOI|S1|Mixte");
    for hour in 1..10u8 {
        assert_eq!(store.court(date(2026, 7, 18), hour, Court::One), expected);
        assert_eq!(store.court(date(2026, 7, 18), hour, Court::Two), expected);
    }
    assert!(store.court(date(2026, 7, 18), 0, Court::One).is_free());
    assert!(store.court(date(2026, 7, 18), 10, Court::One).is_free());
    assert!(store.court(date(2026, 7, 19), 1, Court::One).is_free());

    // A second application is a full conflict, nothing changes.
    let snapshot = store.clone();
    match apply_tournament(&mut store, &def).unwrap() {
        ApplyOutcome::Rejected(conflicts) => assert_eq!(conflicts.len(), 18),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(store, snapshot);
}

#[test]
fn empty_hour_range_is_a_validation_error_not_a_silent_noop() {
    let mut store = BookingStore::new();
    let mut def = monday_practice();
    def.end = "18:00".to_string();
    assert!(apply_practice(&mut store, &def, &Horizon::year(2026)).is_err());
    assert_eq!(store, BookingStore::new());
}

#[test]
fn reapply_counts_applied_and_rejected_definitions() {
    let mut store = BookingStore::new();
    let horizon = Horizon::year(2026);

    let monday = monday_practice();
    let mut tuesday = monday_practice();
    tuesday.weekday = "Mardi".to_string();

    // Occupy one Tuesday slot so only the Monday definition applies.
    store
        .assign_staffer(date(2026, 1, 6), 10, Court::One, "Jean Dupont")
        .unwrap();

    let summary = reapply_practices(&mut store, &[monday, tuesday], &horizon);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.rejected, 1);
}
