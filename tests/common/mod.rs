#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rxaide::db::Database;
use rxaide::models::dose::{DoseHistory, DoseStatus};
use rxaide::models::medication::{DosageUnit, Medication};
use tempfile::TempDir;

/// Create a temporary database for testing.
pub fn setup_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).unwrap();
    (dir, db)
}

/// A minimal valid medication.
pub fn make_medication(name: &str) -> Medication {
    Medication::new(name, "500", DosageUnit::Mg)
}

/// Noon UTC on a given date.
pub fn noon(date: NaiveDate) -> DateTime<Utc> {
    let dt = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    Utc.from_utc_datetime(&dt)
}

/// A dose record scheduled at noon on `date`.
pub fn make_dose(medication_id: i64, status: DoseStatus, date: NaiveDate) -> DoseHistory {
    DoseHistory::new(medication_id, status, noon(date))
}
