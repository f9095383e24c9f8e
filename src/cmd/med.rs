use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;

use rxaide::core::med::{self, AddMedicationParams};
use rxaide::core::repository::MedicationRepository;
use rxaide::core::state::AppState;
use rxaide::db::Database;
use rxaide::models::config::Config;
use rxaide::models::medication::{MedicationForm, parse_dosage};
use rxaide::output;

#[allow(clippy::too_many_arguments)]
pub fn run_add(
    name: &str,
    dosage: &str,
    form: Option<&str>,
    frequency: Option<&str>,
    meal: Option<&str>,
    instructions: Option<&str>,
    notes: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    image: Option<&str>,
    at: &[String],
    days: Option<&str>,
    human: bool,
) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let state = AppState::new(db);

    if let Some(path) = image {
        state.set_captured_image_path(Some(path.to_string()));
    }

    let mut times = Vec::with_capacity(at.len());
    for slot in at {
        times.push(super::parse_time(slot)?);
    }

    let params = AddMedicationParams {
        name,
        dosage,
        form,
        frequency,
        meal,
        instructions,
        notes,
        start,
        end,
        times: &times,
        days,
    };
    let (medication, schedules) = med::add_medication(&state, &config, params)?;

    if human {
        let mut line = format!(
            "Added {} {} {} (id {})",
            medication.name, medication.dosage, medication.dosage_unit, medication.id
        );
        if !schedules.is_empty() {
            let slots: Vec<String> = schedules.iter().map(|s| s.time()).collect();
            line.push_str(&format!("  reminders at {}", slots.join(", ")));
        }
        println!("{line}");
    } else {
        let out = output::success(
            "med_add",
            json!({
                "medication": medication,
                "schedules": schedules,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_list(all: bool, human: bool) -> Result<()> {
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let meds = if all {
        repo.all_medications()?
    } else {
        repo.active_medications()?
    };

    if human {
        println!("{}", rxaide::output::human::format_med_list(&meds, all));
    } else {
        let count = meds.len();
        let out = output::success(
            "med_list",
            json!({
                "medications": meds,
                "count": count,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_show(med_key: &str, human: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let medication = med::find_medication(&repo, &config, med_key)?;
    let schedules = repo.schedules_for_medication(medication.id)?;

    if human {
        println!(
            "{}",
            rxaide::output::human::format_med_detail(&medication, &schedules)
        );
    } else {
        let out = output::success(
            "med_show",
            json!({
                "medication": medication,
                "schedules": schedules,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn run_update(
    med_key: &str,
    name: Option<&str>,
    dosage: Option<&str>,
    form: Option<&str>,
    frequency: Option<&str>,
    meal: Option<&str>,
    instructions: Option<&str>,
    notes: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    image: Option<&str>,
    human: bool,
) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let mut medication = med::find_medication(&repo, &config, med_key)?;

    if let Some(n) = name {
        medication.name = n.to_string();
    }
    if let Some(d) = dosage {
        let parsed = parse_dosage(d);
        medication.dosage = parsed.amount.unwrap_or_else(|| parsed.raw.clone());
        if let Some(unit) = parsed.unit {
            medication.dosage_unit = unit;
        }
    }
    if let Some(f) = form {
        medication.form = f.parse().unwrap_or(MedicationForm::Other);
    }
    if let Some(f) = frequency {
        medication.frequency = f.to_string();
    }
    if let Some(m) = meal {
        medication.meal_relation = m.parse()?;
    }
    if let Some(i) = instructions {
        medication.instructions = i.to_string();
    }
    if let Some(n) = notes {
        medication.notes = n.to_string();
    }
    if let Some(d) = start
        && let Some(dt) = d.and_hms_opt(12, 0, 0)
    {
        medication.start_date = Utc.from_utc_datetime(&dt);
    }
    if let Some(d) = end
        && let Some(dt) = d.and_hms_opt(12, 0, 0)
    {
        medication.end_date = Some(Utc.from_utc_datetime(&dt));
    }
    if let Some(path) = image {
        medication.prescription_image_path = Some(path.to_string());
    }
    medication.updated_at = Utc::now();

    repo.update_medication(&medication)?;

    if human {
        println!("Updated {} (id {})", medication.name, medication.id);
    } else {
        let out = output::success("med_update", json!({ "medication": medication }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_stop(med_key: &str, date: Option<NaiveDate>, human: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let medication = med::find_medication(&repo, &config, med_key)?;
    if !medication.active {
        anyhow::bail!("Medication '{}' is already stopped.", medication.name);
    }

    let stopped = med::stop_medication(&repo, &medication, date)?;

    if human {
        println!(
            "Stopped {} as of {}",
            stopped.name,
            stopped
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        );
    } else {
        let out = output::success("med_stop", json!({ "medication": stopped }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_remove(med_key: &str, yes: bool, human: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let medication = med::find_medication(&repo, &config, med_key)?;

    if !yes {
        eprint!(
            "Permanently delete medication '{}'? Its schedules and dose history go with it. [y/N] ",
            medication.name
        );
        use std::io::{self, BufRead, Write};
        io::stderr().flush().ok();
        let mut buf = String::new();
        let bytes = io::stdin().lock().read_line(&mut buf)?;
        if bytes == 0 || !buf.trim().eq_ignore_ascii_case("y") {
            anyhow::bail!("Aborted.");
        }
    }

    let removed = repo.delete_medication_by_id(medication.id)?;
    if !removed {
        anyhow::bail!("Medication '{}' not found.", medication.name);
    }

    if human {
        println!("Removed medication: {}", medication.name);
    } else {
        let out = output::success(
            "med_remove",
            json!({
                "id": medication.id,
                "name": medication.name,
                "removed": true,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
