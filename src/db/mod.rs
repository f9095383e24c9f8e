mod dose_history;
mod medications;
mod migrate;
mod schedules;

use anyhow::Result;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use crate::live::{ChangeBus, Live, Table};
use crate::models::medication::Medication;
use crate::models::schedule::Schedule;

pub type Pool = r2d2::Pool<SqliteConnectionManager>;
type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// Handle to the medication store: a pooled SQLite database plus the change
/// bus that live queries subscribe to. Cheap to clone; all clones share the
/// same pool and bus.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
    changes: ChangeBus,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        #[cfg(unix)]
        {
            use std::fs::{self, OpenOptions};
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            if !path.exists() {
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .mode(0o600)
                    .open(path)?;
            } else {
                let mut perms = fs::metadata(path)?.permissions();
                if perms.mode() & 0o777 != 0o600 {
                    perms.set_mode(0o600);
                    fs::set_permissions(path, perms)?;
                }
            }
        }

        log::info!("opening database at {}", path.display());
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "foreign_keys", 1)?;
            conn.busy_timeout(std::time::Duration::from_secs(5))
        });
        let pool = r2d2::Pool::new(manager)?;
        migrate::run(&*pool.get()?)?;

        Ok(Self {
            pool,
            changes: ChangeBus::new(),
        })
    }

    pub(crate) fn conn(&self) -> Result<PooledConn> {
        Ok(self.pool.get()?)
    }

    pub fn changes(&self) -> &ChangeBus {
        &self.changes
    }

    /// Live view over `query`, refreshed whenever one of `tables` changes.
    pub fn watch<T, F>(&self, tables: &[Table], query: F) -> Live<T>
    where
        T: Send + 'static,
        F: Fn(&Database) -> Result<T> + Send + 'static,
    {
        let db = self.clone();
        crate::live::watch(&self.changes, tables, move || query(&db))
    }

    /// Insert a medication and its schedules in a single transaction.
    ///
    /// Every schedule is rewritten to carry the medication id the store
    /// assigned; nothing is persisted if any write fails. Returns the
    /// medication id.
    pub fn insert_medication_with_schedules(
        &self,
        med: &Medication,
        schedules: &[Schedule],
    ) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let med_id = medications::insert_in(&tx, med)?;
        for schedule in schedules {
            let mut linked = schedule.clone();
            linked.medication_id = med_id;
            schedules::insert_in(&tx, &linked)?;
        }
        tx.commit()?;

        self.changes.notify(Table::Medications);
        if !schedules.is_empty() {
            self.changes.notify(Table::Schedules);
        }
        Ok(med_id)
    }
}
