use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::medication::parse_uuid;
use crate::db::DatabaseError;
use crate::models::{AwarenessSnapshot, EncodedFindings, TimeWindow};

/// Insert or replace the snapshot for (user, time_window).
///
/// On conflict the row's id and created_at survive; content, sufficiency and
/// generated_at are overwritten — the snapshot is a replaceable derivation,
/// not an event log.
pub fn upsert_snapshot(
    conn: &Connection,
    user_id: &Uuid,
    time_window: TimeWindow,
    findings: &EncodedFindings,
    data_sufficiency: bool,
) -> Result<AwarenessSnapshot, DatabaseError> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO awareness_snapshots
           (id, user_id, time_window, medication_patterns, adherence_signals,
            observation_associations, data_sufficiency, generated_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(user_id, time_window) DO UPDATE SET
           medication_patterns = excluded.medication_patterns,
           adherence_signals = excluded.adherence_signals,
           observation_associations = excluded.observation_associations,
           data_sufficiency = excluded.data_sufficiency,
           generated_at = excluded.generated_at",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            time_window.as_str(),
            findings.medication_patterns,
            findings.adherence_signals,
            findings.observation_associations,
            data_sufficiency as i32,
            now,
            now,
        ],
    )?;

    get_snapshot(conn, user_id, time_window.as_str())?.ok_or_else(|| {
        DatabaseError::ConstraintViolation("snapshot missing immediately after upsert".into())
    })
}

/// Latest snapshot for a user and time-window key, if any.
///
/// The key is taken as a raw string on purpose: stored rows use the writer
/// keys ("7d"/"14d"/"30d"), and one legacy read path asks for "7-day" — that
/// lookup misses and must keep missing until the key mismatch is resolved
/// product-side.
pub fn get_snapshot(
    conn: &Connection,
    user_id: &Uuid,
    time_window: &str,
) -> Result<Option<AwarenessSnapshot>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, time_window, medication_patterns, adherence_signals,
                observation_associations, data_sufficiency, generated_at, created_at
         FROM awareness_snapshots
         WHERE user_id = ?1 AND time_window = ?2
         LIMIT 1",
    )?;
    let mut rows = stmt.query_map(params![user_id.to_string(), time_window], snapshot_row)?;
    match rows.next() {
        Some(row) => Ok(Some(snapshot_from_row(row?)?)),
        None => Ok(None),
    }
}

/// Remove every snapshot for a user (account reset / deletion).
pub fn delete_snapshots_for_user(conn: &Connection, user_id: &Uuid) -> Result<u64, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM awareness_snapshots WHERE user_id = ?1",
        params![user_id.to_string()],
    )?;
    Ok(affected as u64)
}

struct SnapshotRow {
    id: String,
    user_id: String,
    time_window: String,
    medication_patterns: String,
    adherence_signals: String,
    observation_associations: String,
    data_sufficiency: i32,
    generated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

fn snapshot_row(row: &rusqlite::Row<'_>) -> Result<SnapshotRow, rusqlite::Error> {
    Ok(SnapshotRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        time_window: row.get(2)?,
        medication_patterns: row.get(3)?,
        adherence_signals: row.get(4)?,
        observation_associations: row.get(5)?,
        data_sufficiency: row.get(6)?,
        generated_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn snapshot_from_row(row: SnapshotRow) -> Result<AwarenessSnapshot, DatabaseError> {
    Ok(AwarenessSnapshot {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        time_window: TimeWindow::from_str(&row.time_window)?,
        medication_patterns: row.medication_patterns,
        adherence_signals: row.adherence_signals,
        observation_associations: row.observation_associations,
        data_sufficiency: row.data_sufficiency != 0,
        generated_at: row.generated_at,
        created_at: row.created_at,
    })
}
