use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;

use rxaide::core::med;
use rxaide::core::repository::MedicationRepository;
use rxaide::db::Database;
use rxaide::models::config::Config;
use rxaide::models::dose::DoseStatus;
use rxaide::output;

pub fn run_record(
    status: DoseStatus,
    med_key: &str,
    schedule: Option<i64>,
    time: Option<DateTime<Utc>>,
    note: Option<&str>,
    human: bool,
) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let medication = med::find_medication(&repo, &config, med_key)?;
    let dose = med::record_dose(&repo, &medication, status, schedule, time, note)?;

    if human {
        println!(
            "Recorded {} dose of {} scheduled {}",
            dose.status,
            medication.name,
            dose.scheduled_time.format("%Y-%m-%d %H:%M")
        );
    } else {
        let command = match status {
            DoseStatus::Taken => "dose_take",
            DoseStatus::Missed => "dose_miss",
            DoseStatus::Skipped => "dose_skip",
        };
        let out = output::success(
            command,
            json!({
                "dose": dose,
                "medication": medication.name,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_history(
    med_key: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    human: bool,
) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let medication = match med_key {
        Some(key) => Some(med::find_medication(&repo, &config, key)?),
        None => None,
    };

    let mut doses = match (from, to) {
        (None, None) => match &medication {
            Some(m) => repo.history_for_medication(m.id)?,
            None => repo.all_history()?,
        },
        _ => {
            let start = from
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Utc.from_utc_datetime(&dt))
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            let end = to
                .and_then(|d| d.and_hms_opt(23, 59, 59))
                .map(|dt| Utc.from_utc_datetime(&dt))
                .unwrap_or_else(Utc::now);
            repo.history_between(start, end)?
        }
    };
    if let Some(ref m) = medication {
        doses.retain(|d| d.medication_id == m.id);
    }

    if human {
        println!("{}", rxaide::output::human::format_history(&doses));
    } else {
        let count = doses.len();
        let out = output::success(
            "dose_history",
            json!({
                "doses": doses,
                "count": count,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
