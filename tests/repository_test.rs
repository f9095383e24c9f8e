mod common;

use chrono::Duration;
use rxaide::core::repository::MedicationRepository;
use rxaide::models::schedule::Schedule;

fn setup_repo() -> (tempfile::TempDir, MedicationRepository) {
    let (dir, db) = common::setup_db();
    (dir, MedicationRepository::new(db))
}

// ---------------------------------------------------------------------------
// boundary validation
// ---------------------------------------------------------------------------

#[test]
fn rejects_empty_name() {
    let (_dir, repo) = setup_repo();
    let med = common::make_medication("   ");
    let err = repo.insert_medication(&med).unwrap_err();
    assert!(err.to_string().contains("name"));
}

#[test]
fn rejects_empty_dosage() {
    let (_dir, repo) = setup_repo();
    let mut med = common::make_medication("Amoxicillin");
    med.dosage = String::new();
    let err = repo.insert_medication(&med).unwrap_err();
    assert!(err.to_string().contains("dosage"));
}

#[test]
fn rejects_end_before_start() {
    let (_dir, repo) = setup_repo();
    let mut med = common::make_medication("Amoxicillin");
    med.end_date = Some(med.start_date - Duration::days(1));
    let err = repo.insert_medication(&med).unwrap_err();
    assert!(err.to_string().contains("end date"));
}

#[test]
fn accepts_end_equal_to_start() {
    let (_dir, repo) = setup_repo();
    let mut med = common::make_medication("Amoxicillin");
    med.end_date = Some(med.start_date);
    assert!(repo.insert_medication(&med).is_ok());
}

#[test]
fn update_is_validated_too() {
    let (_dir, repo) = setup_repo();
    let id = repo.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    let mut med = repo.get_medication(id).unwrap().unwrap();
    med.name = String::new();
    assert!(repo.update_medication(&med).is_err());
}

#[test]
fn rejects_out_of_range_schedule_times() {
    let (_dir, repo) = setup_repo();
    let med = repo.insert_medication(&common::make_medication("Amoxicillin")).unwrap();

    let bad_hour = Schedule::new(med, 24, 0);
    assert!(repo.insert_schedule(&bad_hour).is_err());

    let bad_minute = Schedule::new(med, 8, 60);
    assert!(repo.insert_schedule(&bad_minute).is_err());

    let fine = Schedule::new(med, 23, 59);
    assert!(repo.insert_schedule(&fine).is_ok());
}

#[test]
fn rejects_duplicate_time_slot() {
    let (_dir, repo) = setup_repo();
    let med = repo.insert_medication(&common::make_medication("Amoxicillin")).unwrap();

    repo.insert_schedule(&Schedule::new(med, 8, 0)).unwrap();
    let err = repo.insert_schedule(&Schedule::new(med, 8, 0)).unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // the same slot on a different medication is fine
    let other = repo.insert_medication(&common::make_medication("Metformin")).unwrap();
    assert!(repo.insert_schedule(&Schedule::new(other, 8, 0)).is_ok());
}

#[test]
fn compound_insert_rejects_duplicate_slots_in_batch() {
    let (_dir, repo) = setup_repo();
    let med = common::make_medication("Amoxicillin");
    let schedules = vec![Schedule::new(0, 8, 0), Schedule::new(0, 8, 0)];
    assert!(repo.insert_medication_with_schedules(&med, &schedules).is_err());
    assert!(repo.all_medications().unwrap().is_empty());
}

#[test]
fn compound_insert_validates_every_schedule() {
    let (_dir, repo) = setup_repo();

    let med = common::make_medication("Amoxicillin");
    let schedules = vec![Schedule::new(0, 8, 0), Schedule::new(0, 25, 0)];
    assert!(repo.insert_medication_with_schedules(&med, &schedules).is_err());

    // nothing was persisted
    assert!(repo.all_medications().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// pass-through reads and writes
// ---------------------------------------------------------------------------

#[test]
fn facade_covers_the_read_surface() {
    let (_dir, repo) = setup_repo();

    let id = repo.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    repo.insert_schedule(&Schedule::new(id, 8, 0)).unwrap();

    assert_eq!(repo.all_medications().unwrap().len(), 1);
    assert_eq!(repo.active_medications().unwrap().len(), 1);
    assert_eq!(repo.active_medication_count().unwrap(), 1);
    assert_eq!(repo.schedules_for_medication(id).unwrap().len(), 1);
    assert_eq!(repo.enabled_schedules().unwrap().len(), 1);
    assert!(repo.get_medication_by_name("Amoxicillin").unwrap().is_some());
    assert_eq!(repo.total_taken_count().unwrap(), 0);
    assert_eq!(repo.total_missed_count().unwrap(), 0);
}

#[test]
fn scenario_insert_schedule_delete_cascade() {
    let (_dir, repo) = setup_repo();

    // insert Amoxicillin 500 mg -> first id
    let med_id = repo.insert_medication(&common::make_medication("Amoxicillin")).unwrap();
    assert_eq!(med_id, 1);

    // one schedule at 08:00
    repo.insert_schedule(&Schedule::new(med_id, 8, 0)).unwrap();
    let schedules = repo.schedules_for_medication(med_id).unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].time(), "08:00");

    // delete the medication: schedule query is now empty
    assert!(repo.delete_medication_by_id(med_id).unwrap());
    assert!(repo.schedules_for_medication(med_id).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// compound insert
// ---------------------------------------------------------------------------

#[test]
fn compound_insert_rewrites_placeholder_ids() {
    let (_dir, repo) = setup_repo();

    let med = common::make_medication("Amoxicillin");
    // deliberately wrong placeholder owner ids
    let schedules = vec![Schedule::new(999, 8, 0), Schedule::new(999, 20, 0)];

    let med_id = repo.insert_medication_with_schedules(&med, &schedules).unwrap();

    let meds = repo.all_medications().unwrap();
    assert_eq!(meds.len(), 1);
    assert_eq!(meds[0].id, med_id);

    let stored = repo.schedules_for_medication(med_id).unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|s| s.medication_id == med_id));
    // nothing ended up under the placeholder id
    assert!(repo.schedules_for_medication(999).unwrap().is_empty());
}

#[test]
fn compound_insert_with_no_schedules() {
    let (_dir, repo) = setup_repo();
    let med_id = repo
        .insert_medication_with_schedules(&common::make_medication("Amoxicillin"), &[])
        .unwrap();
    assert!(med_id > 0);
    assert!(repo.schedules_for_medication(med_id).unwrap().is_empty());
}
