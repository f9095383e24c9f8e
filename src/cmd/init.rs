use anyhow::Result;
use serde_json::json;

use rxaide::db::Database;
use rxaide::models::config::Config;
use rxaide::output;

pub fn run(human: bool) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    config.save()?;

    // Opening runs the migrations.
    let _db = Database::open(&Config::db_path())?;

    if human {
        println!(
            "Initialized. Config at {:?}, data stored in {:?}",
            Config::path(),
            Config::db_path()
        );
    } else {
        let out = output::success(
            "init",
            json!({
                "config_path": Config::path(),
                "db_path": Config::db_path(),
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
