use anyhow::Result;
use rusqlite::Connection;

pub fn run(conn: &Connection) -> Result<()> {
    log::info!("running database migrations");
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS medications (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL,
            dosage        TEXT NOT NULL,
            dosage_unit   TEXT NOT NULL DEFAULT 'mg',
            form          TEXT NOT NULL DEFAULT 'other',
            frequency     TEXT NOT NULL DEFAULT '',
            meal_relation TEXT NOT NULL DEFAULT 'no_relation',
            instructions  TEXT NOT NULL DEFAULT '',
            notes         TEXT NOT NULL DEFAULT '',
            start_date    TEXT NOT NULL,
            end_date      TEXT,
            prescription_image_path TEXT,
            active        INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_medications_active ON medications(active, created_at);

        CREATE TABLE IF NOT EXISTS schedules (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            medication_id INTEGER NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
            time_hour     INTEGER NOT NULL,
            time_minute   INTEGER NOT NULL,
            days_of_week  TEXT NOT NULL DEFAULT '1,2,3,4,5,6,7',
            enabled       INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_schedules_medication ON schedules(medication_id);

        CREATE TABLE IF NOT EXISTS dose_history (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            medication_id  INTEGER NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
            schedule_id    INTEGER REFERENCES schedules(id) ON DELETE SET NULL,
            status         TEXT NOT NULL,
            scheduled_time TEXT NOT NULL,
            action_time    TEXT,
            notes          TEXT NOT NULL DEFAULT '',
            created_at     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_dose_history_medication ON dose_history(medication_id);
        CREATE INDEX IF NOT EXISTS idx_dose_history_schedule ON dose_history(schedule_id);
        CREATE INDEX IF NOT EXISTS idx_dose_history_scheduled ON dose_history(scheduled_time);",
    )?;
    Ok(())
}
