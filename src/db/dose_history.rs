use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::live::{Live, Table};
use crate::models::dose::{DoseHistory, DoseStatus};

use super::Database;

struct DoseHistoryRow {
    id: i64,
    medication_id: i64,
    schedule_id: Option<i64>,
    status: String,
    scheduled_time: String,
    action_time: Option<String>,
    notes: String,
    created_at: String,
}

fn row_to_dose(r: DoseHistoryRow) -> Result<DoseHistory> {
    let status: DoseStatus = r.status.parse()?;
    let scheduled_time: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.scheduled_time)?.with_timezone(&Utc);
    let action_time: Option<DateTime<Utc>> = match r.action_time {
        Some(ref s) => Some(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)),
        None => None,
    };
    let created_at: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.created_at)?.with_timezone(&Utc);

    Ok(DoseHistory {
        id: r.id,
        medication_id: r.medication_id,
        schedule_id: r.schedule_id,
        status,
        scheduled_time,
        action_time,
        notes: r.notes,
        created_at,
    })
}

const SELECT_COLS: &str =
    "id, medication_id, schedule_id, status, scheduled_time, action_time, notes, created_at";

macro_rules! map_row {
    ($row:expr) => {
        Ok(DoseHistoryRow {
            id: $row.get(0)?,
            medication_id: $row.get(1)?,
            schedule_id: $row.get(2)?,
            status: $row.get(3)?,
            scheduled_time: $row.get(4)?,
            action_time: $row.get(5)?,
            notes: $row.get(6)?,
            created_at: $row.get(7)?,
        })
    };
}

impl Database {
    /// Insert or overwrite an adherence record; returns the assigned id.
    pub fn insert_dose(&self, dose: &DoseHistory) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO dose_history (id, medication_id, schedule_id, status, scheduled_time, action_time, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 medication_id = excluded.medication_id,
                 schedule_id = excluded.schedule_id,
                 status = excluded.status,
                 scheduled_time = excluded.scheduled_time,
                 action_time = excluded.action_time,
                 notes = excluded.notes,
                 created_at = excluded.created_at",
            params![
                (dose.id != 0).then_some(dose.id),
                dose.medication_id,
                dose.schedule_id,
                dose.status.to_string(),
                dose.scheduled_time.to_rfc3339(),
                dose.action_time.map(|t| t.to_rfc3339()),
                dose.notes,
                dose.created_at.to_rfc3339(),
            ],
        )?;
        let id = if dose.id == 0 {
            conn.last_insert_rowid()
        } else {
            dose.id
        };
        self.changes.notify(Table::DoseHistory);
        Ok(id)
    }

    pub fn delete_dose_by_id(&self, id: i64) -> Result<bool> {
        let count = self
            .conn()?
            .execute("DELETE FROM dose_history WHERE id = ?1", params![id])?;
        if count > 0 {
            self.changes.notify(Table::DoseHistory);
        }
        Ok(count > 0)
    }

    pub fn delete_dose(&self, dose: &DoseHistory) -> Result<bool> {
        self.delete_dose_by_id(dose.id)
    }

    pub fn get_dose(&self, id: i64) -> Result<Option<DoseHistory>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {SELECT_COLS} FROM dose_history WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], |row| map_row!(row))?;
        match rows.next() {
            Some(row) => Ok(Some(row_to_dose(row?)?)),
            None => Ok(None),
        }
    }

    pub fn history_for_medication(&self, medication_id: i64) -> Result<Vec<DoseHistory>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM dose_history WHERE medication_id = ?1 ORDER BY scheduled_time DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![medication_id], |row| map_row!(row))?;

        let mut doses = Vec::new();
        for row in rows {
            doses.push(row_to_dose(row?)?);
        }
        Ok(doses)
    }

    pub fn all_history(&self) -> Result<Vec<DoseHistory>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {SELECT_COLS} FROM dose_history ORDER BY scheduled_time DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| map_row!(row))?;

        let mut doses = Vec::new();
        for row in rows {
            doses.push(row_to_dose(row?)?);
        }
        Ok(doses)
    }

    /// History with `scheduled_time` inside the inclusive range.
    pub fn history_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DoseHistory>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM dose_history WHERE scheduled_time BETWEEN ?1 AND ?2 ORDER BY scheduled_time DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![start.to_rfc3339(), end.to_rfc3339()], |row| {
            map_row!(row)
        })?;

        let mut doses = Vec::new();
        for row in rows {
            doses.push(row_to_dose(row?)?);
        }
        Ok(doses)
    }

    pub fn count_with_status(&self, status: DoseStatus) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM dose_history WHERE status = ?1",
            params![status.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_for_medication_with_status(
        &self,
        medication_id: i64,
        status: DoseStatus,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM dose_history WHERE medication_id = ?1 AND status = ?2",
            params![medication_id, status.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn total_taken_count(&self) -> Result<i64> {
        self.count_with_status(DoseStatus::Taken)
    }

    pub fn total_missed_count(&self) -> Result<i64> {
        self.count_with_status(DoseStatus::Missed)
    }

    // -- live reads ----------------------------------------------------------

    pub fn history_for_medication_live(&self, medication_id: i64) -> Live<Vec<DoseHistory>> {
        self.watch(&[Table::DoseHistory], move |db| {
            db.history_for_medication(medication_id)
        })
    }

    pub fn all_history_live(&self) -> Live<Vec<DoseHistory>> {
        self.watch(&[Table::DoseHistory], |db| db.all_history())
    }

    pub fn total_taken_count_live(&self) -> Live<i64> {
        self.watch(&[Table::DoseHistory], |db| db.total_taken_count())
    }

    pub fn total_missed_count_live(&self) -> Live<i64> {
        self.watch(&[Table::DoseHistory], |db| db.total_missed_count())
    }
}
