mod common;

use chrono::{Duration, NaiveDate, Utc};
use rxaide::models::dose::{DoseHistory, DoseStatus};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn insert_requires_existing_medication() {
    let (_dir, db) = common::setup_db();
    let orphan = DoseHistory::new(7, DoseStatus::Taken, Utc::now());
    assert!(db.insert_dose(&orphan).is_err());
}

#[test]
fn insert_and_get_roundtrip() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let mut dose = common::make_dose(med, DoseStatus::Taken, day(2026, 8, 1));
    dose.action_time = Some(common::noon(day(2026, 8, 1)) + Duration::minutes(7));
    dose.notes = "with water".to_string();
    let id = db.insert_dose(&dose).unwrap();
    assert!(id > 0);

    let stored = db.get_dose(id).unwrap().unwrap();
    assert_eq!(stored.medication_id, med);
    assert_eq!(stored.schedule_id, None);
    assert_eq!(stored.status, DoseStatus::Taken);
    assert_eq!(stored.scheduled_time, dose.scheduled_time);
    assert_eq!(stored.action_time, dose.action_time);
    assert_eq!(stored.notes, "with water");
}

#[test]
fn history_is_newest_first() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    db.insert_dose(&common::make_dose(med, DoseStatus::Taken, day(2026, 8, 1))).unwrap();
    db.insert_dose(&common::make_dose(med, DoseStatus::Missed, day(2026, 8, 3))).unwrap();
    db.insert_dose(&common::make_dose(med, DoseStatus::Taken, day(2026, 8, 2))).unwrap();

    let history = db.history_for_medication(med).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].scheduled_time.date_naive(), day(2026, 8, 3));
    assert_eq!(history[1].scheduled_time.date_naive(), day(2026, 8, 2));
    assert_eq!(history[2].scheduled_time.date_naive(), day(2026, 8, 1));
}

#[test]
fn history_between_is_inclusive() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    for d in 1..=5 {
        db.insert_dose(&common::make_dose(med, DoseStatus::Taken, day(2026, 8, d))).unwrap();
    }

    let from = common::noon(day(2026, 8, 2));
    let to = common::noon(day(2026, 8, 4));
    let ranged = db.history_between(from, to).unwrap();
    assert_eq!(ranged.len(), 3);
    assert!(ranged.iter().all(|d| {
        let date = d.scheduled_time.date_naive();
        date >= day(2026, 8, 2) && date <= day(2026, 8, 4)
    }));
}

#[test]
fn all_history_spans_medications() {
    let (_dir, db) = common::setup_db();

    let a = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let b = db.insert_medication(&common::make_medication("Metformin")).unwrap();
    db.insert_dose(&common::make_dose(a, DoseStatus::Taken, day(2026, 8, 1))).unwrap();
    db.insert_dose(&common::make_dose(b, DoseStatus::Missed, day(2026, 8, 2))).unwrap();

    assert_eq!(db.all_history().unwrap().len(), 2);
}

#[test]
fn counts_by_status_and_medication() {
    let (_dir, db) = common::setup_db();

    let a = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let b = db.insert_medication(&common::make_medication("Metformin")).unwrap();

    db.insert_dose(&common::make_dose(a, DoseStatus::Taken, day(2026, 8, 1))).unwrap();
    db.insert_dose(&common::make_dose(a, DoseStatus::Taken, day(2026, 8, 2))).unwrap();
    db.insert_dose(&common::make_dose(a, DoseStatus::Missed, day(2026, 8, 3))).unwrap();
    db.insert_dose(&common::make_dose(b, DoseStatus::Taken, day(2026, 8, 1))).unwrap();
    db.insert_dose(&common::make_dose(b, DoseStatus::Skipped, day(2026, 8, 2))).unwrap();

    assert_eq!(db.total_taken_count().unwrap(), 3);
    assert_eq!(db.total_missed_count().unwrap(), 1);
    assert_eq!(db.count_with_status(DoseStatus::Skipped).unwrap(), 1);
    assert_eq!(db.count_for_medication_with_status(a, DoseStatus::Taken).unwrap(), 2);
    assert_eq!(db.count_for_medication_with_status(a, DoseStatus::Missed).unwrap(), 1);
    assert_eq!(db.count_for_medication_with_status(b, DoseStatus::Taken).unwrap(), 1);
    assert_eq!(db.count_for_medication_with_status(b, DoseStatus::Missed).unwrap(), 0);
}

#[test]
fn delete_dose() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let id = db.insert_dose(&common::make_dose(med, DoseStatus::Taken, day(2026, 8, 1))).unwrap();

    assert!(db.delete_dose_by_id(id).unwrap());
    assert!(db.get_dose(id).unwrap().is_none());
    assert!(!db.delete_dose_by_id(id).unwrap());
}
