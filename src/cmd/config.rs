use anyhow::Result;
use serde_json::json;

use rxaide::models::config::Config;
use rxaide::models::medication::DosageUnit;
use rxaide::models::schedule::Weekdays;
use rxaide::output;

pub fn run_show(human: bool) -> Result<()> {
    let config = Config::load()?;
    if human {
        let toml_str = toml::to_string_pretty(&config)?;
        println!("{}", toml_str);
    } else {
        let out = output::success("config", json!({ "config": config }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;

    match key {
        "defaults.dosage_unit" => {
            let unit: DosageUnit = value.parse()?;
            config.defaults.dosage_unit = unit.to_string();
        }
        "defaults.days" => {
            let days: Weekdays = value.parse()?;
            config.defaults.days = days.to_string();
        }
        k if k.starts_with("alias.") => {
            let alias = k.strip_prefix("alias.").unwrap();
            config.aliases.insert(alias.to_string(), value.to_string());
        }
        _ => anyhow::bail!("unknown config key: {}", key),
    }

    config.save()?;
    let out = output::success("config", json!({ "key": key, "value": value }));
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}
