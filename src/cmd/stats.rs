use anyhow::Result;
use serde_json::json;

use rxaide::core::repository::MedicationRepository;
use rxaide::core::stats;
use rxaide::db::Database;
use rxaide::live::Table;
use rxaide::models::config::Config;
use rxaide::output;

pub fn run(follow: bool, human: bool) -> Result<()> {
    let db = Database::open(&Config::db_path())?;
    let repo = MedicationRepository::new(db);

    if !follow {
        let data = stats::collect(&repo)?;
        print_stats(&data, human)?;
        return Ok(());
    }

    // Stream a fresh summary on every data change until interrupted.
    let watch_repo = repo.clone();
    let live = rxaide::live::watch(
        repo.database().changes(),
        &[Table::Medications, Table::Schedules, Table::DoseHistory],
        move || stats::collect(&watch_repo),
    );
    while let Some(data) = live.recv() {
        print_stats(&data, human)?;
    }
    Ok(())
}

fn print_stats(data: &stats::StatsData, human: bool) -> Result<()> {
    if human {
        println!("{}", rxaide::output::human::format_stats(data));
    } else {
        let out = output::success("stats", json!(data));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
