mod common;

use chrono::{Duration, Utc};
use rxaide::models::dose::DoseStatus;
use rxaide::models::medication::{DosageUnit, MealRelation, Medication, MedicationForm};
use rxaide::models::schedule::Schedule;

// ---------------------------------------------------------------------------
// insert / get
// ---------------------------------------------------------------------------

#[test]
fn insert_assigns_store_id() {
    let (_dir, db) = common::setup_db();

    let med = common::make_medication("Amoxicillin");
    assert_eq!(med.id, 0);
    let id = db.insert_medication(&med).unwrap();
    assert!(id > 0);

    let stored = db.get_medication(id).unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.name, "Amoxicillin");
    assert_eq!(stored.dosage, "500");
    assert_eq!(stored.dosage_unit, DosageUnit::Mg);
    assert!(stored.active);
}

#[test]
fn first_insert_gets_id_one() {
    let (_dir, db) = common::setup_db();
    let id = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    assert_eq!(id, 1);
}

#[test]
fn insert_roundtrips_all_fields() {
    let (_dir, db) = common::setup_db();

    let mut med = Medication::new("Ventolin", "2", DosageUnit::Puff);
    med.form = MedicationForm::Inhaler;
    med.frequency = "As needed".to_string();
    med.meal_relation = MealRelation::NoRelation;
    med.instructions = "Shake before use".to_string();
    med.notes = "Blue inhaler".to_string();
    med.end_date = Some(med.start_date + Duration::days(30));
    med.prescription_image_path = Some("/tmp/rx.jpg".to_string());

    let id = db.insert_medication(&med).unwrap();
    let stored = db.get_medication(id).unwrap().unwrap();

    assert_eq!(stored.form, MedicationForm::Inhaler);
    assert_eq!(stored.frequency, "As needed");
    assert_eq!(stored.instructions, "Shake before use");
    assert_eq!(stored.notes, "Blue inhaler");
    assert_eq!(stored.end_date, med.end_date);
    assert_eq!(
        stored.prescription_image_path.as_deref(),
        Some("/tmp/rx.jpg")
    );
}

#[test]
fn get_missing_medication_is_none() {
    let (_dir, db) = common::setup_db();
    assert!(db.get_medication(99).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// upsert on id collision
// ---------------------------------------------------------------------------

#[test]
fn insert_with_existing_id_replaces_row() {
    let (_dir, db) = common::setup_db();

    let id = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();

    let mut replacement = Medication::new("Metformin", "850", DosageUnit::Mg);
    replacement.id = id;
    let returned = db.insert_medication(&replacement).unwrap();
    assert_eq!(returned, id);

    let stored = db.get_medication(id).unwrap().unwrap();
    assert_eq!(stored.name, "Metformin");
    assert_eq!(stored.dosage, "850");
    assert_eq!(db.list_medications(true).unwrap().len(), 1);
}

#[test]
fn replacing_medication_keeps_its_schedules() {
    let (_dir, db) = common::setup_db();

    let id = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    db.insert_schedule(&Schedule::new(id, 8, 0)).unwrap();

    let mut replacement = common::make_medication("Amoxicillin");
    replacement.id = id;
    replacement.dosage = "250".to_string();
    db.insert_medication(&replacement).unwrap();

    assert_eq!(db.schedules_for_medication(id).unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[test]
fn update_existing_row() {
    let (_dir, db) = common::setup_db();

    let id = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let mut stored = db.get_medication(id).unwrap().unwrap();
    stored.notes = "after breakfast".to_string();
    stored.active = false;
    db.update_medication(&stored).unwrap();

    let reread = db.get_medication(id).unwrap().unwrap();
    assert_eq!(reread.notes, "after breakfast");
    assert!(!reread.active);
}

#[test]
fn update_unknown_id_is_silent_noop() {
    let (_dir, db) = common::setup_db();

    let mut ghost = common::make_medication("Ghost");
    ghost.id = 42;
    db.update_medication(&ghost).unwrap();
    assert!(db.get_medication(42).unwrap().is_none());
    assert!(db.list_medications(true).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// delete + cascade
// ---------------------------------------------------------------------------

#[test]
fn delete_returns_whether_row_existed() {
    let (_dir, db) = common::setup_db();
    let id = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    assert!(db.delete_medication_by_id(id).unwrap());
    assert!(!db.delete_medication_by_id(id).unwrap());
}

#[test]
fn delete_cascades_to_schedules_and_history() {
    let (_dir, db) = common::setup_db();

    let id = db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let sid = db.insert_schedule(&Schedule::new(id, 8, 0)).unwrap();
    db.insert_schedule(&Schedule::new(id, 20, 0)).unwrap();

    let today = Utc::now().date_naive();
    let mut dose = common::make_dose(id, DoseStatus::Taken, today);
    dose.schedule_id = Some(sid);
    db.insert_dose(&dose).unwrap();

    // an unrelated medication must be untouched
    let other = db.insert_medication(&common::make_medication("Metformin")).unwrap();
    db.insert_schedule(&Schedule::new(other, 9, 30)).unwrap();

    assert!(db.delete_medication_by_id(id).unwrap());

    assert!(db.get_medication(id).unwrap().is_none());
    assert!(db.schedules_for_medication(id).unwrap().is_empty());
    assert!(db.history_for_medication(id).unwrap().is_empty());
    assert_eq!(db.schedules_for_medication(other).unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// queries
// ---------------------------------------------------------------------------

#[test]
fn list_filters_inactive() {
    let (_dir, db) = common::setup_db();

    db.insert_medication(&common::make_medication("Active1")).unwrap();
    db.insert_medication(&common::make_medication("Active2")).unwrap();
    let mut stopped = common::make_medication("Stopped");
    stopped.active = false;
    db.insert_medication(&stopped).unwrap();

    assert_eq!(db.list_medications(false).unwrap().len(), 2);
    assert_eq!(db.list_medications(true).unwrap().len(), 3);
}

#[test]
fn list_orders_newest_first() {
    let (_dir, db) = common::setup_db();

    let mut older = common::make_medication("Older");
    older.created_at = Utc::now() - Duration::days(2);
    let mut newer = common::make_medication("Newer");
    newer.created_at = Utc::now();

    db.insert_medication(&older).unwrap();
    db.insert_medication(&newer).unwrap();

    let listed = db.list_medications(true).unwrap();
    assert_eq!(listed[0].name, "Newer");
    assert_eq!(listed[1].name, "Older");
}

#[test]
fn active_count_tracks_flag() {
    let (_dir, db) = common::setup_db();

    let a = db.insert_medication(&common::make_medication("A")).unwrap();
    db.insert_medication(&common::make_medication("B")).unwrap();
    assert_eq!(db.active_medication_count().unwrap(), 2);

    let mut med = db.get_medication(a).unwrap().unwrap();
    med.active = false;
    db.update_medication(&med).unwrap();
    assert_eq!(db.active_medication_count().unwrap(), 1);
}

#[test]
fn lookup_by_name_prefers_active() {
    let (_dir, db) = common::setup_db();

    let mut stopped = common::make_medication("Amoxicillin");
    stopped.active = false;
    db.insert_medication(&stopped).unwrap();

    assert!(db.get_medication_by_name("Amoxicillin").unwrap().is_none());
    let any = db.get_medication_by_name_any("Amoxicillin").unwrap().unwrap();
    assert!(!any.active);

    db.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let active = db.get_medication_by_name("Amoxicillin").unwrap().unwrap();
    assert!(active.active);
    let preferred = db.get_medication_by_name_any("Amoxicillin").unwrap().unwrap();
    assert!(preferred.active);
}
