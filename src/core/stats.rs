use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::core::repository::MedicationRepository;
use crate::models::dose::DoseStatus;

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub date: NaiveDate,
    pub active_medications: i64,
    pub total_taken: i64,
    pub total_missed: i64,
    pub total_skipped: i64,
    /// taken / (taken + missed); absent until a dose has been recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adherence: Option<f64>,
    pub medications: Vec<MedicationStats>,
}

#[derive(Debug, Serialize)]
pub struct MedicationStats {
    pub id: i64,
    pub name: String,
    pub taken: i64,
    pub missed: i64,
}

/// One-shot adherence summary over the whole store.
pub fn collect(repo: &MedicationRepository) -> Result<StatsData> {
    let active_medications = repo.active_medication_count()?;
    let total_taken = repo.total_taken_count()?;
    let total_missed = repo.total_missed_count()?;
    let total_skipped = repo.count_with_status(DoseStatus::Skipped)?;

    let adherence = if total_taken + total_missed > 0 {
        Some(total_taken as f64 / (total_taken + total_missed) as f64)
    } else {
        None
    };

    let mut medications = Vec::new();
    for med in repo.active_medications()? {
        let taken = repo.count_for_medication_with_status(med.id, DoseStatus::Taken)?;
        let missed = repo.count_for_medication_with_status(med.id, DoseStatus::Missed)?;
        medications.push(MedicationStats {
            id: med.id,
            name: med.name,
            taken,
            missed,
        });
    }

    Ok(StatsData {
        date: Utc::now().date_naive(),
        active_medications,
        total_taken,
        total_missed,
        total_skipped,
        adherence,
        medications,
    })
}
