use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

use crate::db::Database;
use crate::live::Live;
use crate::models::dose::{DoseHistory, DoseStatus};
use crate::models::medication::Medication;
use crate::models::schedule::Schedule;

/// Facade over the per-entity data access surfaces. Clients of the data layer
/// go through this type rather than touching `Database` queries directly.
///
/// Unlike a purely mechanical re-export, writes are validated here: required
/// fields, date ordering and time ranges are checked before anything reaches
/// the store.
#[derive(Clone)]
pub struct MedicationRepository {
    db: Database,
}

fn validate_medication(med: &Medication) -> Result<()> {
    if med.name.trim().is_empty() {
        bail!("medication name must not be empty");
    }
    if med.dosage.trim().is_empty() {
        bail!("medication dosage must not be empty");
    }
    if let Some(end) = med.end_date
        && end < med.start_date
    {
        bail!(
            "end date {} is before start date {}",
            end.format("%Y-%m-%d"),
            med.start_date.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn validate_schedule(schedule: &Schedule) -> Result<()> {
    if schedule.hour > 23 {
        bail!("schedule hour out of range (0-23): {}", schedule.hour);
    }
    if schedule.minute > 59 {
        bail!("schedule minute out of range (0-59): {}", schedule.minute);
    }
    Ok(())
}

impl MedicationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // -- medications ---------------------------------------------------------

    pub fn insert_medication(&self, med: &Medication) -> Result<i64> {
        validate_medication(med)?;
        self.db.insert_medication(med)
    }

    pub fn update_medication(&self, med: &Medication) -> Result<()> {
        validate_medication(med)?;
        self.db.update_medication(med)
    }

    pub fn delete_medication(&self, med: &Medication) -> Result<bool> {
        self.db.delete_medication(med)
    }

    pub fn delete_medication_by_id(&self, id: i64) -> Result<bool> {
        self.db.delete_medication_by_id(id)
    }

    pub fn get_medication(&self, id: i64) -> Result<Option<Medication>> {
        self.db.get_medication(id)
    }

    pub fn get_medication_by_name(&self, name: &str) -> Result<Option<Medication>> {
        self.db.get_medication_by_name(name)
    }

    pub fn get_medication_by_name_any(&self, name: &str) -> Result<Option<Medication>> {
        self.db.get_medication_by_name_any(name)
    }

    pub fn all_medications(&self) -> Result<Vec<Medication>> {
        self.db.list_medications(true)
    }

    pub fn active_medications(&self) -> Result<Vec<Medication>> {
        self.db.list_medications(false)
    }

    pub fn active_medication_count(&self) -> Result<i64> {
        self.db.active_medication_count()
    }

    pub fn all_medications_live(&self) -> Live<Vec<Medication>> {
        self.db.list_medications_live(true)
    }

    pub fn active_medications_live(&self) -> Live<Vec<Medication>> {
        self.db.list_medications_live(false)
    }

    pub fn get_medication_live(&self, id: i64) -> Live<Option<Medication>> {
        self.db.get_medication_live(id)
    }

    pub fn active_medication_count_live(&self) -> Live<i64> {
        self.db.active_medication_count_live()
    }

    /// Insert a medication and its schedules atomically; returns the assigned
    /// medication id, which every schedule is rewritten to reference.
    pub fn insert_medication_with_schedules(
        &self,
        med: &Medication,
        schedules: &[Schedule],
    ) -> Result<i64> {
        validate_medication(med)?;
        for schedule in schedules {
            validate_schedule(schedule)?;
        }
        Self::ensure_no_duplicate_slots(schedules)?;
        self.db.insert_medication_with_schedules(med, schedules)
    }

    // -- schedules -----------------------------------------------------------

    /// Reject a brand-new slot that duplicates an existing one for the same
    /// medication. Explicit-id upserts may replace their own row.
    fn ensure_slot_free(&self, schedule: &Schedule) -> Result<()> {
        if schedule.id != 0 {
            return Ok(());
        }
        let existing = self.db.schedules_for_medication(schedule.medication_id)?;
        if existing
            .iter()
            .any(|s| s.hour == schedule.hour && s.minute == schedule.minute)
        {
            bail!(
                "a schedule at {} already exists for this medication",
                schedule.time()
            );
        }
        Ok(())
    }

    fn ensure_no_duplicate_slots(schedules: &[Schedule]) -> Result<()> {
        for (i, a) in schedules.iter().enumerate() {
            if schedules[..i]
                .iter()
                .any(|b| b.hour == a.hour && b.minute == a.minute)
            {
                bail!("duplicate schedule slot {}", a.time());
            }
        }
        Ok(())
    }

    pub fn insert_schedule(&self, schedule: &Schedule) -> Result<i64> {
        validate_schedule(schedule)?;
        self.ensure_slot_free(schedule)?;
        self.db.insert_schedule(schedule)
    }

    pub fn insert_schedules(&self, schedules: &[Schedule]) -> Result<Vec<i64>> {
        for schedule in schedules {
            validate_schedule(schedule)?;
            self.ensure_slot_free(schedule)?;
        }
        Self::ensure_no_duplicate_slots(schedules)?;
        self.db.insert_schedules(schedules)
    }

    pub fn update_schedule(&self, schedule: &Schedule) -> Result<()> {
        validate_schedule(schedule)?;
        self.db.update_schedule(schedule)
    }

    pub fn delete_schedule(&self, schedule: &Schedule) -> Result<bool> {
        self.db.delete_schedule(schedule)
    }

    pub fn delete_schedule_by_id(&self, id: i64) -> Result<bool> {
        self.db.delete_schedule_by_id(id)
    }

    pub fn delete_schedules_for_medication(&self, medication_id: i64) -> Result<usize> {
        self.db.delete_schedules_for_medication(medication_id)
    }

    pub fn get_schedule(&self, id: i64) -> Result<Option<Schedule>> {
        self.db.get_schedule(id)
    }

    pub fn schedules_for_medication(&self, medication_id: i64) -> Result<Vec<Schedule>> {
        self.db.schedules_for_medication(medication_id)
    }

    pub fn enabled_schedules(&self) -> Result<Vec<Schedule>> {
        self.db.enabled_schedules()
    }

    pub fn schedules_for_medication_live(&self, medication_id: i64) -> Live<Vec<Schedule>> {
        self.db.schedules_for_medication_live(medication_id)
    }

    pub fn enabled_schedules_live(&self) -> Live<Vec<Schedule>> {
        self.db.enabled_schedules_live()
    }

    // -- dose history --------------------------------------------------------

    pub fn insert_dose(&self, dose: &DoseHistory) -> Result<i64> {
        self.db.insert_dose(dose)
    }

    pub fn delete_dose(&self, dose: &DoseHistory) -> Result<bool> {
        self.db.delete_dose(dose)
    }

    pub fn delete_dose_by_id(&self, id: i64) -> Result<bool> {
        self.db.delete_dose_by_id(id)
    }

    pub fn get_dose(&self, id: i64) -> Result<Option<DoseHistory>> {
        self.db.get_dose(id)
    }

    pub fn all_history(&self) -> Result<Vec<DoseHistory>> {
        self.db.all_history()
    }

    pub fn history_for_medication(&self, medication_id: i64) -> Result<Vec<DoseHistory>> {
        self.db.history_for_medication(medication_id)
    }

    pub fn history_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DoseHistory>> {
        self.db.history_between(start, end)
    }

    pub fn count_with_status(&self, status: DoseStatus) -> Result<i64> {
        self.db.count_with_status(status)
    }

    pub fn count_for_medication_with_status(
        &self,
        medication_id: i64,
        status: DoseStatus,
    ) -> Result<i64> {
        self.db.count_for_medication_with_status(medication_id, status)
    }

    pub fn total_taken_count(&self) -> Result<i64> {
        self.db.total_taken_count()
    }

    pub fn total_missed_count(&self) -> Result<i64> {
        self.db.total_missed_count()
    }

    pub fn all_history_live(&self) -> Live<Vec<DoseHistory>> {
        self.db.all_history_live()
    }

    pub fn history_for_medication_live(&self, medication_id: i64) -> Live<Vec<DoseHistory>> {
        self.db.history_for_medication_live(medication_id)
    }

    pub fn total_taken_count_live(&self) -> Live<i64> {
        self.db.total_taken_count_live()
    }

    pub fn total_missed_count_live(&self) -> Live<i64> {
        self.db.total_missed_count_live()
    }
}
