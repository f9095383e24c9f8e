use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::str::FromStr;

use crate::live::{Live, Table};
use crate::models::medication::{Medication, MedicationForm};

use super::Database;

struct MedicationRow {
    id: i64,
    name: String,
    dosage: String,
    dosage_unit: String,
    form: String,
    frequency: String,
    meal_relation: String,
    instructions: String,
    notes: String,
    start_date: String,
    end_date: Option<String>,
    prescription_image_path: Option<String>,
    active: bool,
    created_at: String,
    updated_at: String,
}

fn row_to_medication(r: MedicationRow) -> Result<Medication> {
    let form = MedicationForm::from_str(&r.form).unwrap_or(MedicationForm::Other);
    let dosage_unit = r.dosage_unit.parse()?;
    let meal_relation = r.meal_relation.parse()?;
    let start_date: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.start_date)?.with_timezone(&Utc);
    let end_date: Option<DateTime<Utc>> = match r.end_date {
        Some(ref s) => Some(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)),
        None => None,
    };
    let created_at: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.created_at)?.with_timezone(&Utc);
    let updated_at: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.updated_at)?.with_timezone(&Utc);

    Ok(Medication {
        id: r.id,
        name: r.name,
        dosage: r.dosage,
        dosage_unit,
        form,
        frequency: r.frequency,
        meal_relation,
        instructions: r.instructions,
        notes: r.notes,
        start_date,
        end_date,
        prescription_image_path: r.prescription_image_path,
        active: r.active,
        created_at,
        updated_at,
    })
}

const SELECT_COLS: &str = "id, name, dosage, dosage_unit, form, frequency, meal_relation, instructions, notes, start_date, end_date, prescription_image_path, active, created_at, updated_at";

macro_rules! map_row {
    ($row:expr) => {
        Ok(MedicationRow {
            id: $row.get(0)?,
            name: $row.get(1)?,
            dosage: $row.get(2)?,
            dosage_unit: $row.get(3)?,
            form: $row.get(4)?,
            frequency: $row.get(5)?,
            meal_relation: $row.get(6)?,
            instructions: $row.get(7)?,
            notes: $row.get(8)?,
            start_date: $row.get(9)?,
            end_date: $row.get(10)?,
            prescription_image_path: $row.get(11)?,
            active: $row.get(12)?,
            created_at: $row.get(13)?,
            updated_at: $row.get(14)?,
        })
    };
}

/// Upsert a medication. A zero id lets the store assign one; an explicit id
/// overwrites the existing row without firing delete cascades.
pub(super) fn insert_in(conn: &Connection, med: &Medication) -> Result<i64> {
    conn.execute(
        "INSERT INTO medications (id, name, dosage, dosage_unit, form, frequency, meal_relation, instructions, notes, start_date, end_date, prescription_image_path, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             dosage = excluded.dosage,
             dosage_unit = excluded.dosage_unit,
             form = excluded.form,
             frequency = excluded.frequency,
             meal_relation = excluded.meal_relation,
             instructions = excluded.instructions,
             notes = excluded.notes,
             start_date = excluded.start_date,
             end_date = excluded.end_date,
             prescription_image_path = excluded.prescription_image_path,
             active = excluded.active,
             created_at = excluded.created_at,
             updated_at = excluded.updated_at",
        params![
            (med.id != 0).then_some(med.id),
            med.name,
            med.dosage,
            med.dosage_unit.to_string(),
            med.form.to_string(),
            med.frequency,
            med.meal_relation.to_string(),
            med.instructions,
            med.notes,
            med.start_date.to_rfc3339(),
            med.end_date.map(|t| t.to_rfc3339()),
            med.prescription_image_path,
            med.active as i32,
            med.created_at.to_rfc3339(),
            med.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(if med.id == 0 {
        conn.last_insert_rowid()
    } else {
        med.id
    })
}

impl Database {
    /// Insert or overwrite a medication; returns the assigned id.
    pub fn insert_medication(&self, med: &Medication) -> Result<i64> {
        let conn = self.conn()?;
        let id = insert_in(&conn, med)?;
        self.changes.notify(Table::Medications);
        Ok(id)
    }

    /// Write all fields of an existing row. No-op if the id does not exist.
    pub fn update_medication(&self, med: &Medication) -> Result<()> {
        let count = self.conn()?.execute(
            "UPDATE medications SET name = ?1, dosage = ?2, dosage_unit = ?3, form = ?4, frequency = ?5, meal_relation = ?6, instructions = ?7, notes = ?8, start_date = ?9, end_date = ?10, prescription_image_path = ?11, active = ?12, created_at = ?13, updated_at = ?14
             WHERE id = ?15",
            params![
                med.name,
                med.dosage,
                med.dosage_unit.to_string(),
                med.form.to_string(),
                med.frequency,
                med.meal_relation.to_string(),
                med.instructions,
                med.notes,
                med.start_date.to_rfc3339(),
                med.end_date.map(|t| t.to_rfc3339()),
                med.prescription_image_path,
                med.active as i32,
                med.created_at.to_rfc3339(),
                med.updated_at.to_rfc3339(),
                med.id,
            ],
        )?;
        if count > 0 {
            self.changes.notify(Table::Medications);
        }
        Ok(())
    }

    /// Delete by id. Cascades remove the medication's schedules and history.
    pub fn delete_medication_by_id(&self, id: i64) -> Result<bool> {
        let count = self
            .conn()?
            .execute("DELETE FROM medications WHERE id = ?1", params![id])?;
        if count > 0 {
            self.changes.notify(Table::Medications);
            self.changes.notify(Table::Schedules);
            self.changes.notify(Table::DoseHistory);
        }
        Ok(count > 0)
    }

    pub fn delete_medication(&self, med: &Medication) -> Result<bool> {
        self.delete_medication_by_id(med.id)
    }

    pub fn get_medication(&self, id: i64) -> Result<Option<Medication>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {SELECT_COLS} FROM medications WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], |row| map_row!(row))?;
        match rows.next() {
            Some(row) => Ok(Some(row_to_medication(row?)?)),
            None => Ok(None),
        }
    }

    pub fn get_medication_by_name(&self, name: &str) -> Result<Option<Medication>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {SELECT_COLS} FROM medications WHERE name = ?1 AND active = 1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![name], |row| map_row!(row))?;
        match rows.next() {
            Some(row) => Ok(Some(row_to_medication(row?)?)),
            None => Ok(None),
        }
    }

    pub fn get_medication_by_name_any(&self, name: &str) -> Result<Option<Medication>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM medications WHERE name = ?1 ORDER BY active DESC LIMIT 1"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![name], |row| map_row!(row))?;
        match rows.next() {
            Some(row) => Ok(Some(row_to_medication(row?)?)),
            None => Ok(None),
        }
    }

    pub fn list_medications(&self, include_inactive: bool) -> Result<Vec<Medication>> {
        let conn = self.conn()?;
        let sql = if include_inactive {
            format!("SELECT {SELECT_COLS} FROM medications ORDER BY created_at DESC")
        } else {
            format!(
                "SELECT {SELECT_COLS} FROM medications WHERE active = 1 ORDER BY created_at DESC"
            )
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| map_row!(row))?;

        let mut meds = Vec::new();
        for row in rows {
            meds.push(row_to_medication(row?)?);
        }
        Ok(meds)
    }

    pub fn active_medication_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM medications WHERE active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // -- live reads ----------------------------------------------------------

    pub fn list_medications_live(&self, include_inactive: bool) -> Live<Vec<Medication>> {
        self.watch(&[Table::Medications], move |db| {
            db.list_medications(include_inactive)
        })
    }

    pub fn get_medication_live(&self, id: i64) -> Live<Option<Medication>> {
        self.watch(&[Table::Medications], move |db| db.get_medication(id))
    }

    pub fn active_medication_count_live(&self) -> Live<i64> {
        self.watch(&[Table::Medications], |db| db.active_medication_count())
    }
}
