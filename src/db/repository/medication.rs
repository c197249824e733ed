use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Medication, MedicationSchedule, MedicationWithSchedules, TimeSlot};

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, user_id, name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            med.id.to_string(),
            med.user_id.to_string(),
            med.name,
            med.created_at,
            med.updated_at,
        ],
    )?;
    Ok(())
}

/// Find-or-create a medication by (user, name). Re-adding an existing name
/// returns the existing row unchanged.
pub fn create_medication(
    conn: &Connection,
    user_id: &Uuid,
    name: &str,
) -> Result<Medication, DatabaseError> {
    if let Some(existing) = find_medication_by_name(conn, user_id, name)? {
        return Ok(existing);
    }
    let now = Utc::now();
    let med = Medication {
        id: Uuid::new_v4(),
        user_id: *user_id,
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    };
    insert_medication(conn, &med)?;
    Ok(med)
}

pub fn find_medication_by_name(
    conn: &Connection,
    user_id: &Uuid,
    name: &str,
) -> Result<Option<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, created_at, updated_at
         FROM medications WHERE user_id = ?1 AND name = ?2",
    )?;
    let mut rows = stmt.query_map(params![user_id.to_string(), name], medication_row)?;
    match rows.next() {
        Some(row) => Ok(Some(medication_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn insert_schedule(
    conn: &Connection,
    schedule: &MedicationSchedule,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medication_schedules (id, medication_id, time_slot, frequency, timing, note, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            schedule.id.to_string(),
            schedule.medication_id.to_string(),
            schedule.time_slot.as_str(),
            schedule.frequency,
            schedule.timing,
            schedule.note,
            schedule.created_at,
            schedule.updated_at,
        ],
    )?;
    Ok(())
}

/// Add a schedule, reusing an existing row with the same slot/frequency/timing
/// for the medication (duplicate guard for repeated form submissions).
pub fn add_schedule(
    conn: &Connection,
    medication_id: &Uuid,
    time_slot: TimeSlot,
    frequency: &str,
    timing: &str,
    note: Option<&str>,
) -> Result<MedicationSchedule, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medication_id, time_slot, frequency, timing, note, created_at, updated_at
         FROM medication_schedules
         WHERE medication_id = ?1 AND time_slot = ?2 AND frequency = ?3 AND timing = ?4",
    )?;
    let mut rows = stmt.query_map(
        params![medication_id.to_string(), time_slot.as_str(), frequency, timing],
        schedule_row,
    )?;
    if let Some(row) = rows.next() {
        return schedule_from_row(row?);
    }

    let now = Utc::now();
    let schedule = MedicationSchedule {
        id: Uuid::new_v4(),
        medication_id: *medication_id,
        time_slot,
        frequency: frequency.to_string(),
        timing: timing.to_string(),
        note: note.map(str::to_string),
        created_at: now,
        updated_at: now,
    };
    insert_schedule(conn, &schedule)?;
    Ok(schedule)
}

/// All medications for a user with their schedules, oldest first.
pub fn list_medications_with_schedules(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<MedicationWithSchedules>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, created_at, updated_at
         FROM medications WHERE user_id = ?1 ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], medication_row)?;

    let mut result = Vec::new();
    for row in rows {
        let medication = medication_from_row(row?)?;
        let schedules = list_schedules_for_medication(conn, &medication.id)?;
        result.push(MedicationWithSchedules {
            medication,
            schedules,
        });
    }
    Ok(result)
}

pub fn list_schedules_for_medication(
    conn: &Connection,
    medication_id: &Uuid,
) -> Result<Vec<MedicationSchedule>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medication_id, time_slot, frequency, timing, note, created_at, updated_at
         FROM medication_schedules WHERE medication_id = ?1 ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map(params![medication_id.to_string()], schedule_row)?;

    let mut schedules = Vec::new();
    for row in rows {
        schedules.push(schedule_from_row(row?)?);
    }
    Ok(schedules)
}

// Internal row types keep rusqlite conversions separate from enum/uuid parsing.

struct MedicationRow {
    id: String,
    user_id: String,
    name: String,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

fn medication_row(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        name: row.name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

struct ScheduleRow {
    id: String,
    medication_id: String,
    time_slot: String,
    frequency: String,
    timing: String,
    note: Option<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

fn schedule_row(row: &rusqlite::Row<'_>) -> Result<ScheduleRow, rusqlite::Error> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        time_slot: row.get(2)?,
        frequency: row.get(3)?,
        timing: row.get(4)?,
        note: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn schedule_from_row(row: ScheduleRow) -> Result<MedicationSchedule, DatabaseError> {
    Ok(MedicationSchedule {
        id: parse_uuid(&row.id)?,
        medication_id: parse_uuid(&row.medication_id)?,
        time_slot: TimeSlot::from_str(&row.time_slot)?,
        frequency: row.frequency,
        timing: row.timing,
        note: row.note,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
