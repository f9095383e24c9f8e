use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::live::{Live, Table};
use crate::models::schedule::Schedule;

use super::Database;

struct ScheduleRow {
    id: i64,
    medication_id: i64,
    time_hour: u8,
    time_minute: u8,
    days_of_week: String,
    enabled: bool,
    created_at: String,
}

fn row_to_schedule(r: ScheduleRow) -> Result<Schedule> {
    let days = r.days_of_week.parse()?;
    let created_at: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.created_at)?.with_timezone(&Utc);
    Ok(Schedule {
        id: r.id,
        medication_id: r.medication_id,
        hour: r.time_hour,
        minute: r.time_minute,
        days,
        enabled: r.enabled,
        created_at,
    })
}

const SELECT_COLS: &str = "id, medication_id, time_hour, time_minute, days_of_week, enabled, created_at";

macro_rules! map_row {
    ($row:expr) => {
        Ok(ScheduleRow {
            id: $row.get(0)?,
            medication_id: $row.get(1)?,
            time_hour: $row.get(2)?,
            time_minute: $row.get(3)?,
            days_of_week: $row.get(4)?,
            enabled: $row.get(5)?,
            created_at: $row.get(6)?,
        })
    };
}

/// Upsert a schedule. A zero id lets the store assign one.
pub(super) fn insert_in(conn: &Connection, s: &Schedule) -> Result<i64> {
    conn.execute(
        "INSERT INTO schedules (id, medication_id, time_hour, time_minute, days_of_week, enabled, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
             medication_id = excluded.medication_id,
             time_hour = excluded.time_hour,
             time_minute = excluded.time_minute,
             days_of_week = excluded.days_of_week,
             enabled = excluded.enabled,
             created_at = excluded.created_at",
        params![
            (s.id != 0).then_some(s.id),
            s.medication_id,
            s.hour,
            s.minute,
            s.days.to_string(),
            s.enabled as i32,
            s.created_at.to_rfc3339(),
        ],
    )?;
    Ok(if s.id == 0 {
        conn.last_insert_rowid()
    } else {
        s.id
    })
}

impl Database {
    /// Insert or overwrite a schedule; returns the assigned id. The owning
    /// medication must exist (foreign key).
    pub fn insert_schedule(&self, schedule: &Schedule) -> Result<i64> {
        let conn = self.conn()?;
        let id = insert_in(&conn, schedule)?;
        self.changes.notify(Table::Schedules);
        Ok(id)
    }

    /// Insert a batch of schedules in one transaction; returns assigned ids.
    pub fn insert_schedules(&self, schedules: &[Schedule]) -> Result<Vec<i64>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            ids.push(insert_in(&tx, schedule)?);
        }
        tx.commit()?;
        if !schedules.is_empty() {
            self.changes.notify(Table::Schedules);
        }
        Ok(ids)
    }

    /// Write all fields of an existing row. No-op if the id does not exist.
    pub fn update_schedule(&self, schedule: &Schedule) -> Result<()> {
        let count = self.conn()?.execute(
            "UPDATE schedules SET medication_id = ?1, time_hour = ?2, time_minute = ?3, days_of_week = ?4, enabled = ?5, created_at = ?6
             WHERE id = ?7",
            params![
                schedule.medication_id,
                schedule.hour,
                schedule.minute,
                schedule.days.to_string(),
                schedule.enabled as i32,
                schedule.created_at.to_rfc3339(),
                schedule.id,
            ],
        )?;
        if count > 0 {
            self.changes.notify(Table::Schedules);
        }
        Ok(())
    }

    /// Delete by id. Dose history rows referencing the schedule keep their
    /// data with the link nulled out.
    pub fn delete_schedule_by_id(&self, id: i64) -> Result<bool> {
        let count = self
            .conn()?
            .execute("DELETE FROM schedules WHERE id = ?1", params![id])?;
        if count > 0 {
            self.changes.notify(Table::Schedules);
            self.changes.notify(Table::DoseHistory);
        }
        Ok(count > 0)
    }

    pub fn delete_schedule(&self, schedule: &Schedule) -> Result<bool> {
        self.delete_schedule_by_id(schedule.id)
    }

    /// Remove every schedule belonging to a medication; returns how many.
    pub fn delete_schedules_for_medication(&self, medication_id: i64) -> Result<usize> {
        let count = self.conn()?.execute(
            "DELETE FROM schedules WHERE medication_id = ?1",
            params![medication_id],
        )?;
        if count > 0 {
            self.changes.notify(Table::Schedules);
            self.changes.notify(Table::DoseHistory);
        }
        Ok(count)
    }

    pub fn get_schedule(&self, id: i64) -> Result<Option<Schedule>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {SELECT_COLS} FROM schedules WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], |row| map_row!(row))?;
        match rows.next() {
            Some(row) => Ok(Some(row_to_schedule(row?)?)),
            None => Ok(None),
        }
    }

    pub fn schedules_for_medication(&self, medication_id: i64) -> Result<Vec<Schedule>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM schedules WHERE medication_id = ?1 ORDER BY time_hour, time_minute"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![medication_id], |row| map_row!(row))?;

        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(row_to_schedule(row?)?);
        }
        Ok(schedules)
    }

    pub fn enabled_schedules(&self) -> Result<Vec<Schedule>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM schedules WHERE enabled = 1 ORDER BY time_hour, time_minute"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| map_row!(row))?;

        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(row_to_schedule(row?)?);
        }
        Ok(schedules)
    }

    // -- live reads ----------------------------------------------------------

    pub fn schedules_for_medication_live(&self, medication_id: i64) -> Live<Vec<Schedule>> {
        self.watch(&[Table::Schedules], move |db| {
            db.schedules_for_medication(medication_id)
        })
    }

    pub fn enabled_schedules_live(&self) -> Live<Vec<Schedule>> {
        self.watch(&[Table::Schedules], |db| db.enabled_schedules())
    }

    pub fn get_schedule_live(&self, id: i64) -> Live<Option<Schedule>> {
        self.watch(&[Table::Schedules], move |db| db.get_schedule(id))
    }
}
