use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{IntakeStatus, TimeSlot};

/// One immutable record of a medication being taken or missed on a specific
/// day for a specific schedule. Created once by the intake-logging action and
/// never mutated; the store enforces at most one row per (schedule, log_date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medication_id: Uuid,
    pub schedule_id: Uuid,
    /// Canonical slot the dose was scheduled for, denormalized at log time.
    pub scheduled_time: TimeSlot,
    /// Present only for TAKEN entries where the user logged a concrete time.
    pub actual_time: Option<DateTime<Utc>>,
    pub status: IntakeStatus,
    pub observation: Option<String>,
    pub log_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
