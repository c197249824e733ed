use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::medication::parse_uuid;
use crate::db::DatabaseError;
use crate::models::{IntakeLog, IntakeStatus, TimeSlot};

/// Whether an intake log already exists for the schedule on the given day.
pub fn has_intake_log_for_day(
    conn: &Connection,
    schedule_id: &Uuid,
    day: NaiveDate,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM intake_logs WHERE schedule_id = ?1 AND log_date = ?2",
        params![schedule_id.to_string(), day],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Insert an immutable intake log. At most one entry per schedule per day;
/// a second insert for the same (schedule, day) is rejected.
pub fn insert_intake_log(conn: &Connection, log: &IntakeLog) -> Result<(), DatabaseError> {
    if has_intake_log_for_day(conn, &log.schedule_id, log.log_date)? {
        return Err(DatabaseError::ConstraintViolation(format!(
            "intake already logged for schedule {} on {}",
            log.schedule_id, log.log_date
        )));
    }
    conn.execute(
        "INSERT INTO intake_logs (id, user_id, medication_id, schedule_id, scheduled_time,
         actual_time, status, observation, log_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            log.id.to_string(),
            log.user_id.to_string(),
            log.medication_id.to_string(),
            log.schedule_id.to_string(),
            log.scheduled_time.as_str(),
            log.actual_time,
            log.status.as_str(),
            log.observation,
            log.log_date,
            log.created_at,
        ],
    )?;
    Ok(())
}

/// All intake logs for a user with log_date in [start, end], oldest first.
pub fn list_intake_logs(
    conn: &Connection,
    user_id: &Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<IntakeLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, medication_id, schedule_id, scheduled_time, actual_time,
                status, observation, log_date, created_at
         FROM intake_logs
         WHERE user_id = ?1 AND log_date >= ?2 AND log_date <= ?3
         ORDER BY log_date ASC",
    )?;
    let rows = stmt.query_map(params![user_id.to_string(), start, end], intake_log_row)?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(intake_log_from_row(row?)?);
    }
    Ok(logs)
}

struct IntakeLogRow {
    id: String,
    user_id: String,
    medication_id: String,
    schedule_id: String,
    scheduled_time: String,
    actual_time: Option<DateTime<Utc>>,
    status: String,
    observation: Option<String>,
    log_date: NaiveDate,
    created_at: DateTime<Utc>,
}

fn intake_log_row(row: &rusqlite::Row<'_>) -> Result<IntakeLogRow, rusqlite::Error> {
    Ok(IntakeLogRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        medication_id: row.get(2)?,
        schedule_id: row.get(3)?,
        scheduled_time: row.get(4)?,
        actual_time: row.get(5)?,
        status: row.get(6)?,
        observation: row.get(7)?,
        log_date: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn intake_log_from_row(row: IntakeLogRow) -> Result<IntakeLog, DatabaseError> {
    Ok(IntakeLog {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        medication_id: parse_uuid(&row.medication_id)?,
        schedule_id: parse_uuid(&row.schedule_id)?,
        scheduled_time: TimeSlot::from_str(&row.scheduled_time)?,
        actual_time: row.actual_time,
        status: IntakeStatus::from_str(&row.status)?,
        observation: row.observation,
        log_date: row.log_date,
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::medication::{add_schedule, create_medication};
    use crate::db::sqlite::open_memory_database;

    fn seeded(conn: &Connection) -> (Uuid, Uuid, Uuid) {
        let user = Uuid::new_v4();
        let med = create_medication(conn, &user, "Metformin").unwrap();
        let schedule =
            add_schedule(conn, &med.id, TimeSlot::Evening, "once-daily", "with food", None)
                .unwrap();
        (user, med.id, schedule.id)
    }

    fn make_log(
        user: Uuid,
        med: Uuid,
        schedule: Uuid,
        day: NaiveDate,
        status: IntakeStatus,
    ) -> IntakeLog {
        IntakeLog {
            id: Uuid::new_v4(),
            user_id: user,
            medication_id: med,
            schedule_id: schedule,
            scheduled_time: TimeSlot::Evening,
            actual_time: None,
            status,
            observation: None,
            log_date: day,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_list_in_range() {
        let conn = open_memory_database().unwrap();
        let (user, med, schedule) = seeded(&conn);

        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        insert_intake_log(&conn, &make_log(user, med, schedule, day, IntakeStatus::Taken))
            .unwrap();

        let logs = list_intake_logs(
            &conn,
            &user,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, IntakeStatus::Taken);
        assert_eq!(logs[0].log_date, day);

        // Outside the range
        let logs = list_intake_logs(
            &conn,
            &user,
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
        )
        .unwrap();
        assert!(logs.is_empty());
    }

    #[test]
    fn second_log_same_schedule_same_day_is_rejected() {
        let conn = open_memory_database().unwrap();
        let (user, med, schedule) = seeded(&conn);
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        insert_intake_log(&conn, &make_log(user, med, schedule, day, IntakeStatus::Taken))
            .unwrap();
        let err = insert_intake_log(
            &conn,
            &make_log(user, med, schedule, day, IntakeStatus::Missed),
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));

        // A different day is fine
        insert_intake_log(
            &conn,
            &make_log(
                user,
                med,
                schedule,
                NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
                IntakeStatus::Missed,
            ),
        )
        .unwrap();
    }

    #[test]
    fn has_intake_log_for_day_reports_existing() {
        let conn = open_memory_database().unwrap();
        let (user, med, schedule) = seeded(&conn);
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        assert!(!has_intake_log_for_day(&conn, &schedule, day).unwrap());
        insert_intake_log(&conn, &make_log(user, med, schedule, day, IntakeStatus::Taken))
            .unwrap();
        assert!(has_intake_log_for_day(&conn, &schedule, day).unwrap());
    }

    #[test]
    fn actual_time_and_observation_round_trip() {
        let conn = open_memory_database().unwrap();
        let (user, med, schedule) = seeded(&conn);
        let day = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();

        let mut log = make_log(user, med, schedule, day, IntakeStatus::Taken);
        log.actual_time = Some(
            day.and_hms_opt(18, 25, 0)
                .unwrap()
                .and_utc(),
        );
        log.observation = Some("slight dizziness after dinner".into());
        insert_intake_log(&conn, &log).unwrap();

        let logs = list_intake_logs(&conn, &user, day, day).unwrap();
        assert_eq!(logs[0].actual_time, log.actual_time);
        assert_eq!(
            logs[0].observation.as_deref(),
            Some("slight dizziness after dinner")
        );
    }
}
