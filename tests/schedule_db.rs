mod common;

use chrono::Utc;
use rxaide::models::dose::DoseStatus;
use rxaide::models::schedule::Schedule;

#[test]
fn insert_requires_existing_medication() {
    let (_dir, db) = common::setup_db();
    let orphan = Schedule::new(99, 8, 0);
    assert!(db.insert_schedule(&orphan).is_err());
}

#[test]
fn insert_and_query_for_medication() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let mut evening = Schedule::new(med, 20, 30);
    evening.days = "1,3,5".parse().unwrap();
    let morning_id = db.insert_schedule(&Schedule::new(med, 8, 0)).unwrap();
    db.insert_schedule(&evening).unwrap();

    let schedules = db.schedules_for_medication(med).unwrap();
    assert_eq!(schedules.len(), 2);
    // ordered by time of day
    assert_eq!(schedules[0].id, morning_id);
    assert_eq!(schedules[0].time(), "08:00");
    assert_eq!(schedules[1].time(), "20:30");
    assert_eq!(schedules[1].days.to_string(), "1,3,5");
}

#[test]
fn insert_batch_assigns_ids() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let batch = vec![
        Schedule::new(med, 8, 0),
        Schedule::new(med, 14, 0),
        Schedule::new(med, 20, 0),
    ];
    let ids = db.insert_schedules(&batch).unwrap();
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(|&id| id > 0));
    assert_eq!(db.schedules_for_medication(med).unwrap().len(), 3);
}

#[test]
fn insert_with_existing_id_replaces_row() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let id = db.insert_schedule(&Schedule::new(med, 8, 0)).unwrap();

    let mut replacement = Schedule::new(med, 21, 15);
    replacement.id = id;
    replacement.enabled = false;
    assert_eq!(db.insert_schedule(&replacement).unwrap(), id);

    let stored = db.get_schedule(id).unwrap().unwrap();
    assert_eq!(stored.time(), "21:15");
    assert!(!stored.enabled);
    assert_eq!(db.schedules_for_medication(med).unwrap().len(), 1);
}

#[test]
fn update_unknown_id_is_silent_noop() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let mut ghost = Schedule::new(med, 7, 0);
    ghost.id = 123;
    db.update_schedule(&ghost).unwrap();
    assert!(db.get_schedule(123).unwrap().is_none());
}

#[test]
fn enabled_filter() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let on_id = db.insert_schedule(&Schedule::new(med, 8, 0)).unwrap();
    let mut off = Schedule::new(med, 20, 0);
    off.enabled = false;
    db.insert_schedule(&off).unwrap();

    let enabled = db.enabled_schedules().unwrap();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].id, on_id);
}

#[test]
fn delete_schedule_nulls_history_link() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let sid = db.insert_schedule(&Schedule::new(med, 8, 0)).unwrap();

    let today = Utc::now().date_naive();
    let mut dose = common::make_dose(med, DoseStatus::Taken, today);
    dose.schedule_id = Some(sid);
    dose.notes = "with breakfast".to_string();
    let dose_id = db.insert_dose(&dose).unwrap();

    assert!(db.delete_schedule_by_id(sid).unwrap());

    // the adherence record survives with the link cleared
    let survived = db.get_dose(dose_id).unwrap().unwrap();
    assert_eq!(survived.schedule_id, None);
    assert_eq!(survived.status, DoseStatus::Taken);
    assert_eq!(survived.medication_id, med);
    assert_eq!(survived.notes, "with breakfast");
    assert_eq!(survived.scheduled_time, dose.scheduled_time);
}

#[test]
fn delete_with_explicit_ids_nulls_only_that_link() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let mut slot = Schedule::new(med, 8, 0);
    slot.id = 5;
    assert_eq!(db.insert_schedule(&slot).unwrap(), 5);
    let mut other = Schedule::new(med, 20, 0);
    other.id = 6;
    db.insert_schedule(&other).unwrap();

    let today = Utc::now().date_naive();
    let mut linked = common::make_dose(med, DoseStatus::Taken, today);
    linked.schedule_id = Some(5);
    let linked_id = db.insert_dose(&linked).unwrap();
    let mut unrelated = common::make_dose(med, DoseStatus::Missed, today);
    unrelated.schedule_id = Some(6);
    let unrelated_id = db.insert_dose(&unrelated).unwrap();

    assert!(db.delete_schedule_by_id(5).unwrap());

    assert_eq!(db.get_dose(linked_id).unwrap().unwrap().schedule_id, None);
    assert_eq!(db.get_dose(unrelated_id).unwrap().unwrap().schedule_id, Some(6));
}

#[test]
fn delete_all_for_medication() {
    let (_dir, db) = common::setup_db();

    let med = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let other = db.insert_medication(&common::make_medication("Metformin")).unwrap();
    db.insert_schedule(&Schedule::new(med, 8, 0)).unwrap();
    db.insert_schedule(&Schedule::new(med, 20, 0)).unwrap();
    db.insert_schedule(&Schedule::new(other, 9, 0)).unwrap();

    assert_eq!(db.delete_schedules_for_medication(med).unwrap(), 2);
    assert!(db.schedules_for_medication(med).unwrap().is_empty());
    assert_eq!(db.schedules_for_medication(other).unwrap().len(), 1);
}
