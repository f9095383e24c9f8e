use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Defaults {
    /// Dosage unit assumed when a dosage string carries none.
    #[serde(default = "default_dosage_unit")]
    pub dosage_unit: String,
    /// Weekday set applied to new schedules (comma-separated, 1=Mon..7=Sun).
    #[serde(default = "default_days")]
    pub days: String,
}

fn default_dosage_unit() -> String {
    "mg".to_string()
}
fn default_days() -> String {
    "1,2,3,4,5,6,7".to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            dosage_unit: "mg".to_string(),
            days: "1,2,3,4,5,6,7".to_string(),
        }
    }
}

impl Config {
    /// Load config from the standard path, or return defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the standard path.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
            }
        }
        let contents = toml::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::fs::{self, OpenOptions};
            use std::io::Write;
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(true).mode(0o600);
            let mut file = options.open(&path)?;

            file.write_all(contents.as_bytes())?;

            // Ensure permissions are 0o600 even if file already existed
            let mut perms = file.metadata()?.permissions();
            if perms.mode() & 0o777 != 0o600 {
                perms.set_mode(0o600);
                fs::set_permissions(&path, perms)?;
            }
        }
        #[cfg(not(unix))]
        {
            std::fs::write(&path, contents)?;
        }

        Ok(())
    }

    /// Resolve an alias to a medication name, or return the input unchanged.
    pub fn resolve_alias(&self, input: &str) -> String {
        self.aliases
            .get(input)
            .cloned()
            .unwrap_or_else(|| input.to_string())
    }

    pub fn data_dir() -> PathBuf {
        if let Ok(home) = std::env::var("RXAIDE_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .expect("cannot resolve home directory")
            .join(".rxaide")
    }

    pub fn path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    pub fn db_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_alias_passthrough() {
        let config = Config::default();
        assert_eq!(config.resolve_alias("Amoxicillin"), "Amoxicillin");
    }

    #[test]
    fn resolve_alias_mapped() {
        let mut config = Config::default();
        config
            .aliases
            .insert("amox".to_string(), "Amoxicillin".to_string());
        assert_eq!(config.resolve_alias("amox"), "Amoxicillin");
    }

    #[test]
    fn defaults_are_sensible() {
        let d = Defaults::default();
        assert_eq!(d.dosage_unit, "mg");
        assert_eq!(d.days, "1,2,3,4,5,6,7");
    }
}
