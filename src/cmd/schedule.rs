use anyhow::Result;
use serde_json::json;

use rxaide::core::med;
use rxaide::core::repository::MedicationRepository;
use rxaide::db::Database;
use rxaide::models::config::Config;
use rxaide::models::schedule::Schedule;
use rxaide::output;

pub fn run_add(med_key: &str, at: &str, days: Option<&str>, human: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let medication = med::find_medication(&repo, &config, med_key)?;
    let (hour, minute) = super::parse_time(at)?;

    let mut schedule = Schedule::new(medication.id, hour, minute);
    schedule.days = match days {
        Some(spec) => spec.parse()?,
        None => config.defaults.days.parse().unwrap_or_default(),
    };

    let id = repo.insert_schedule(&schedule)?;
    schedule.id = id;

    if human {
        println!(
            "Added reminder for {} at {} on {}",
            medication.name,
            schedule.time(),
            schedule.days
        );
    } else {
        let out = output::success(
            "schedule_add",
            json!({
                "schedule": schedule,
                "medication": medication.name,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_list(med_key: Option<&str>, human: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let schedules = match med_key {
        Some(key) => {
            let medication = med::find_medication(&repo, &config, key)?;
            repo.schedules_for_medication(medication.id)?
        }
        None => repo.enabled_schedules()?,
    };

    if human {
        println!("{}", rxaide::output::human::format_schedule_list(&schedules));
    } else {
        let count = schedules.len();
        let out = output::success(
            "schedule_list",
            json!({
                "schedules": schedules,
                "count": count,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_set_enabled(id: i64, enabled: bool, human: bool) -> Result<()> {
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let mut schedule = match repo.get_schedule(id)? {
        Some(s) => s,
        None => anyhow::bail!("Schedule {id} not found."),
    };
    schedule.enabled = enabled;
    repo.update_schedule(&schedule)?;

    if human {
        let verb = if enabled { "Enabled" } else { "Disabled" };
        println!("{verb} schedule {id} ({})", schedule.time());
    } else {
        let command = if enabled {
            "schedule_enable"
        } else {
            "schedule_disable"
        };
        let out = output::success(command, json!({ "schedule": schedule }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_remove(id: i64, human: bool) -> Result<()> {
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    let removed = repo.delete_schedule_by_id(id)?;
    if !removed {
        anyhow::bail!("Schedule {id} not found.");
    }

    if human {
        println!("Removed schedule {id}. Dose history keeps its records.");
    } else {
        let out = output::success(
            "schedule_remove",
            json!({
                "id": id,
                "removed": true,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
