use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::core::repository::MedicationRepository;
use crate::core::state::AppState;
use crate::models::config::Config;
use crate::models::dose::{DoseHistory, DoseStatus};
use crate::models::medication::{DosageUnit, Medication, MedicationForm, parse_dosage};
use crate::models::schedule::{Schedule, Weekdays};

// ---------------------------------------------------------------------------
// AddMedicationParams
// ---------------------------------------------------------------------------

/// Parameters for adding a new medication, straight from the CLI surface.
pub struct AddMedicationParams<'a> {
    pub name: &'a str,
    pub dosage: &'a str,
    pub form: Option<&'a str>,
    pub frequency: Option<&'a str>,
    pub meal: Option<&'a str>,
    pub instructions: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Reminder slots to create alongside the medication.
    pub times: &'a [(u8, u8)],
    pub days: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// add_medication
// ---------------------------------------------------------------------------

/// Build a medication (plus any reminder schedules) from raw parameters and
/// persist everything in one transaction. A pending captured-image path on
/// the state holder is consumed into the new record. Returns the stored
/// medication and its schedules.
pub fn add_medication(
    state: &AppState,
    config: &Config,
    params: AddMedicationParams<'_>,
) -> Result<(Medication, Vec<Schedule>)> {
    let name = config.resolve_alias(params.name);

    let parsed = parse_dosage(params.dosage);
    let amount = parsed.amount.unwrap_or_else(|| parsed.raw.clone());
    let unit = match parsed.unit {
        Some(u) => u,
        None => config
            .defaults
            .dosage_unit
            .parse()
            .unwrap_or(DosageUnit::Mg),
    };

    let mut med = Medication::new(name, amount, unit);

    if let Some(f) = params.form {
        med.form = f.parse().unwrap_or(MedicationForm::Other);
    }
    if let Some(freq) = params.frequency {
        med.frequency = freq.to_string();
    } else if !params.times.is_empty() {
        med.frequency = format!("{}x daily", params.times.len());
    }
    if let Some(m) = params.meal {
        med.meal_relation = m.parse()?;
    }
    if let Some(i) = params.instructions {
        med.instructions = i.to_string();
    }
    if let Some(n) = params.notes {
        med.notes = n.to_string();
    }
    if let Some(d) = params.start
        && let Some(dt) = d.and_hms_opt(12, 0, 0)
    {
        med.start_date = Utc.from_utc_datetime(&dt);
    }
    if let Some(d) = params.end
        && let Some(dt) = d.and_hms_opt(12, 0, 0)
    {
        med.end_date = Some(Utc.from_utc_datetime(&dt));
    }
    med.prescription_image_path = state.take_captured_image_path();

    let days: Weekdays = match params.days {
        Some(spec) => spec.parse()?,
        None => config.defaults.days.parse().unwrap_or_default(),
    };

    let schedules: Vec<Schedule> = params
        .times
        .iter()
        .map(|&(hour, minute)| {
            let mut s = Schedule::new(0, hour, minute);
            s.days = days.clone();
            s
        })
        .collect();

    let id = state.add_medication_with_schedules(&med, &schedules)?;
    med.id = id;
    let stored = state.repository().schedules_for_medication(id)?;
    Ok((med, stored))
}

// ---------------------------------------------------------------------------
// find_medication
// ---------------------------------------------------------------------------

/// Resolve a CLI medication argument: a numeric id, or a (possibly aliased)
/// name looked up active-first.
pub fn find_medication(
    repo: &MedicationRepository,
    config: &Config,
    key: &str,
) -> Result<Medication> {
    if let Ok(id) = key.parse::<i64>() {
        return match repo.get_medication(id)? {
            Some(m) => Ok(m),
            None => bail!("Medication with id {id} not found."),
        };
    }

    let resolved = config.resolve_alias(key);
    match repo.get_medication_by_name(&resolved)? {
        Some(m) => Ok(m),
        None => match repo.get_medication_by_name_any(&resolved)? {
            Some(m) => Ok(m),
            None => bail!("Medication '{}' not found. Use `med add` first.", resolved),
        },
    }
}

// ---------------------------------------------------------------------------
// record_dose
// ---------------------------------------------------------------------------

/// Log an adherence event for a medication. A schedule link, when given, must
/// belong to the medication. Missed doses carry no action time; taken and
/// skipped record the acting moment.
pub fn record_dose(
    repo: &MedicationRepository,
    med: &Medication,
    status: DoseStatus,
    schedule_id: Option<i64>,
    scheduled_time: Option<DateTime<Utc>>,
    note: Option<&str>,
) -> Result<DoseHistory> {
    if let Some(sid) = schedule_id {
        match repo.get_schedule(sid)? {
            Some(s) if s.medication_id == med.id => {}
            Some(_) => bail!("Schedule {sid} does not belong to '{}'.", med.name),
            None => bail!("Schedule {sid} not found."),
        }
    }

    let mut dose = DoseHistory::new(med.id, status, scheduled_time.unwrap_or_else(Utc::now));
    dose.schedule_id = schedule_id;
    dose.action_time = match status {
        DoseStatus::Missed => None,
        DoseStatus::Taken | DoseStatus::Skipped => Some(Utc::now()),
    };
    if let Some(n) = note {
        dose.notes = n.to_string();
    }

    let id = repo.insert_dose(&dose)?;
    dose.id = id;
    Ok(dose)
}

// ---------------------------------------------------------------------------
// stop_medication
// ---------------------------------------------------------------------------

/// Deactivate a medication, stamping its end date. Returns the updated row.
pub fn stop_medication(
    repo: &MedicationRepository,
    med: &Medication,
    date: Option<NaiveDate>,
) -> Result<Medication> {
    let ended_at = if let Some(d) = date
        && let Some(dt) = d.and_hms_opt(12, 0, 0)
    {
        Utc.from_utc_datetime(&dt)
    } else {
        Utc::now()
    };

    let mut updated = med.clone();
    updated.active = false;
    // stopping before the regimen started still yields a valid date range
    updated.end_date = Some(ended_at.max(updated.start_date));
    updated.updated_at = Utc::now();
    repo.update_medication(&updated)?;
    Ok(updated)
}
