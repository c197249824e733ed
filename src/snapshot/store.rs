use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{
    intake_log::list_intake_logs,
    medication::list_medications_with_schedules,
    snapshot::{delete_snapshots_for_user, get_snapshot, upsert_snapshot},
};
use crate::db::DatabaseError;
use crate::models::{
    AwarenessSnapshot, IntakeLog, MedicationWithSchedules, SnapshotFindings, TimeWindow,
};

/// Persistence seam for snapshot generation. The generator takes this as an
/// injected dependency so it can run against fakes or an in-memory database
/// in tests, and against the application store in production.
pub trait AwarenessStore: Send + Sync {
    fn medications_with_schedules(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<MedicationWithSchedules>, DatabaseError>;

    fn intake_logs_in_range(
        &self,
        user_id: &Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<IntakeLog>, DatabaseError>;

    fn upsert_snapshot(
        &self,
        user_id: &Uuid,
        time_window: TimeWindow,
        findings: &SnapshotFindings,
        data_sufficiency: bool,
    ) -> Result<AwarenessSnapshot, DatabaseError>;

    fn latest_snapshot(
        &self,
        user_id: &Uuid,
        time_window: &str,
    ) -> Result<Option<AwarenessSnapshot>, DatabaseError>;

    fn delete_snapshots_for_user(&self, user_id: &Uuid) -> Result<u64, DatabaseError>;
}

/// SQLite-backed store over a single connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Direct connection access for test seeding.
    #[cfg(test)]
    pub fn connection_for_tests(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("test connection lock")
    }
}

impl AwarenessStore for SqliteStore {
    fn medications_with_schedules(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<MedicationWithSchedules>, DatabaseError> {
        let conn = self.lock()?;
        list_medications_with_schedules(&conn, user_id)
    }

    fn intake_logs_in_range(
        &self,
        user_id: &Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<IntakeLog>, DatabaseError> {
        let conn = self.lock()?;
        list_intake_logs(&conn, user_id, start, end)
    }

    fn upsert_snapshot(
        &self,
        user_id: &Uuid,
        time_window: TimeWindow,
        findings: &SnapshotFindings,
        data_sufficiency: bool,
    ) -> Result<AwarenessSnapshot, DatabaseError> {
        let encoded = findings.encode()?;
        let conn = self.lock()?;
        upsert_snapshot(&conn, user_id, time_window, &encoded, data_sufficiency)
    }

    fn latest_snapshot(
        &self,
        user_id: &Uuid,
        time_window: &str,
    ) -> Result<Option<AwarenessSnapshot>, DatabaseError> {
        let conn = self.lock()?;
        get_snapshot(&conn, user_id, time_window)
    }

    fn delete_snapshots_for_user(&self, user_id: &Uuid) -> Result<u64, DatabaseError> {
        let conn = self.lock()?;
        delete_snapshots_for_user(&conn, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn sqlite_store_round_trips_a_snapshot() {
        let store = SqliteStore::new(open_memory_database().unwrap());
        let user = Uuid::new_v4();

        let written = store
            .upsert_snapshot(&user, TimeWindow::FourteenDays, &SnapshotFindings::default(), false)
            .unwrap();
        let read = store.latest_snapshot(&user, "14d").unwrap().unwrap();
        assert_eq!(written.id, read.id);
        assert!(store.latest_snapshot(&user, "7d").unwrap().is_none());
    }

    #[test]
    fn sqlite_store_lists_empty_for_unknown_user() {
        let store = SqliteStore::new(open_memory_database().unwrap());
        let user = Uuid::new_v4();
        assert!(store.medications_with_schedules(&user).unwrap().is_empty());
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert!(store.intake_logs_in_range(&user, start, end).unwrap().is_empty());
    }
}
