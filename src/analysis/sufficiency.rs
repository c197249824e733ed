use super::types::SufficiencyLevel;
use crate::models::{IntakeLog, IntakeStatus};

/// Minimum logs (any status) in window before adherence is worth reporting.
const MIN_LOGS_FOR_ADHERENCE: usize = 3;

/// Minimum TAKEN logs with an actual intake time for timing analysis.
const MIN_TIMED_LOGS: usize = 2;

/// Minimum observation entries before observation association is considered.
const MIN_OBSERVATIONS: usize = 2;

/// Coverage classifier: logs seen over logs expected for the window, bucketed.
/// Independent of the per-type flags below — the two gates can disagree, and
/// that disagreement is preserved (see DESIGN.md).
pub fn assess_coverage(
    logs_in_window: u32,
    num_schedules: usize,
    days_in_window: usize,
) -> SufficiencyLevel {
    let expected = (num_schedules * days_in_window) as f64;
    let coverage = f64::from(logs_in_window) / if expected == 0.0 { 1.0 } else { expected };

    if coverage < 0.2 {
        SufficiencyLevel::Insufficient
    } else if coverage < 0.5 {
        SufficiencyLevel::Minimal
    } else if coverage < 0.8 {
        SufficiencyLevel::Adequate
    } else {
        SufficiencyLevel::Robust
    }
}

/// Per-signal-type sufficiency flags, evaluated against the raw log slice
/// (not the metric output) so the gate decision stays auditable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalFlags {
    pub adherence: bool,
    pub timing: bool,
    pub observation: bool,
}

impl SignalFlags {
    pub fn evaluate(logs: &[IntakeLog]) -> SignalFlags {
        let timed = logs
            .iter()
            .filter(|l| l.status == IntakeStatus::Taken && l.actual_time.is_some())
            .count();
        let observations: Vec<&str> = logs
            .iter()
            .filter_map(|l| l.observation.as_deref())
            .filter(|o| !o.is_empty())
            .collect();
        let distinct: std::collections::HashSet<&str> = observations.iter().copied().collect();

        SignalFlags {
            adherence: logs.len() >= MIN_LOGS_FOR_ADHERENCE,
            timing: timed >= MIN_TIMED_LOGS,
            observation: observations.len() >= MIN_OBSERVATIONS || !distinct.is_empty(),
        }
    }

    /// Disjunctive accumulation across medications: one medication with
    /// signal-worthy data marks the whole snapshot.
    pub fn merge(&mut self, other: SignalFlags) {
        self.adherence |= other.adherence;
        self.timing |= other.timing;
        self.observation |= other.observation;
    }

    pub fn any(&self) -> bool {
        self.adherence || self.timing || self.observation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSlot;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn log(status: IntakeStatus, timed: bool, observation: Option<&str>) -> IntakeLog {
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        IntakeLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            medication_id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            scheduled_time: TimeSlot::Morning,
            actual_time: timed.then(|| date.and_hms_opt(9, 5, 0).unwrap().and_utc()),
            status,
            observation: observation.map(str::to_string),
            log_date: date,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn coverage_buckets_follow_fixed_thresholds() {
        // 1 schedule × 10 days
        assert_eq!(assess_coverage(1, 1, 10), SufficiencyLevel::Insufficient);
        assert_eq!(assess_coverage(2, 1, 10), SufficiencyLevel::Minimal);
        assert_eq!(assess_coverage(5, 1, 10), SufficiencyLevel::Adequate);
        assert_eq!(assess_coverage(8, 1, 10), SufficiencyLevel::Robust);
        assert_eq!(assess_coverage(10, 1, 10), SufficiencyLevel::Robust);
    }

    #[test]
    fn coverage_with_no_schedules_does_not_divide_by_zero() {
        // Denominator floors to 1: any logs at all read as full coverage.
        assert_eq!(assess_coverage(0, 0, 10), SufficiencyLevel::Insufficient);
        assert_eq!(assess_coverage(1, 0, 0), SufficiencyLevel::Robust);
    }

    #[test]
    fn adherence_flag_needs_three_logs_of_any_status() {
        let two = vec![
            log(IntakeStatus::Taken, false, None),
            log(IntakeStatus::Missed, false, None),
        ];
        assert!(!SignalFlags::evaluate(&two).adherence);

        let three = vec![
            log(IntakeStatus::Taken, false, None),
            log(IntakeStatus::Missed, false, None),
            log(IntakeStatus::Missed, false, None),
        ];
        assert!(SignalFlags::evaluate(&three).adherence);
    }

    #[test]
    fn timing_flag_needs_two_timed_taken_logs() {
        let one_timed = vec![
            log(IntakeStatus::Taken, true, None),
            log(IntakeStatus::Taken, false, None),
            // MISSED with a time does not count toward timing.
            log(IntakeStatus::Missed, true, None),
        ];
        assert!(!SignalFlags::evaluate(&one_timed).timing);

        let two_timed = vec![
            log(IntakeStatus::Taken, true, None),
            log(IntakeStatus::Taken, true, None),
        ];
        assert!(SignalFlags::evaluate(&two_timed).timing);
    }

    #[test]
    fn single_observation_sets_the_observation_flag() {
        let logs = vec![log(IntakeStatus::Taken, false, Some("headache"))];
        assert!(SignalFlags::evaluate(&logs).observation);
        assert!(!SignalFlags::evaluate(&[]).observation);
    }

    #[test]
    fn merge_is_disjunctive() {
        let mut flags = SignalFlags::default();
        flags.merge(SignalFlags { adherence: true, ..Default::default() });
        flags.merge(SignalFlags { observation: true, ..Default::default() });
        assert!(flags.adherence);
        assert!(!flags.timing);
        assert!(flags.observation);
        assert!(flags.any());
    }
}
