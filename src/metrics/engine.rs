use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use uuid::Uuid;

use super::dates::{abs_minutes_between, canonical_slot_time, each_day_inclusive};
use super::types::*;
use crate::models::{IntakeLog, IntakeStatus, MedicationSchedule};

/// Adherence rate = TAKEN / expected, where expected counts one dose per day
/// per schedule that already existed on that day. Schedules created mid-window
/// count only from their creation day onward — they cannot retroactively
/// inflate the denominator.
pub fn compute_adherence_rate(
    medication_id: &Uuid,
    logs: &[IntakeLog],
    schedules: &[MedicationSchedule],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> AdherenceRateMetric {
    let days = each_day_inclusive(window_start, window_end);

    let mut expected: u32 = 0;
    for day in &days {
        for schedule in schedules {
            if schedule.created_at.date_naive() <= *day {
                expected += 1;
            }
        }
    }

    let day_set: HashSet<NaiveDate> = days.iter().copied().collect();
    let taken_count = logs
        .iter()
        .filter(|l| {
            l.medication_id == *medication_id
                && l.status == IntakeStatus::Taken
                && day_set.contains(&l.log_date)
        })
        .count() as u32;

    let adherence_rate = if expected == 0 {
        // Deliberate floor, not a "no data" sentinel.
        0.0
    } else {
        f64::from(taken_count) / f64::from(expected)
    };

    AdherenceRateMetric {
        medication_id: *medication_id,
        window: WindowBounds::new(window_start, window_end),
        expected_count: expected,
        taken_count,
        adherence_rate,
    }
}

/// Missed dose streaks per schedule, based solely on explicit MISSED logs.
/// A day with no log at all does not extend a streak — a dose may simply not
/// have been due or logged yet.
pub fn compute_missed_streaks(
    medication_id: &Uuid,
    logs: &[IntakeLog],
    schedules: &[MedicationSchedule],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> MissedStreaksMetric {
    let days = each_day_inclusive(window_start, window_end);
    let mut per_schedule = Vec::with_capacity(schedules.len());

    for schedule in schedules {
        let mut longest: u32 = 0;
        let mut current: u32 = 0;
        for day in &days {
            let missed = logs.iter().any(|l| {
                l.schedule_id == schedule.id
                    && l.log_date == *day
                    && l.status == IntakeStatus::Missed
            });
            if missed {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        per_schedule.push(MissedStreak {
            schedule_id: schedule.id,
            longest,
            current,
        });
    }

    MissedStreaksMetric {
        medication_id: *medication_id,
        window: WindowBounds::new(window_start, window_end),
        per_schedule,
    }
}

/// Timing variance per schedule: mean absolute minutes between actual intake
/// time and the canonical slot time on the log's date. Only logs carrying an
/// actual time contribute samples.
pub fn compute_timing_variance(
    medication_id: &Uuid,
    logs: &[IntakeLog],
    schedules: &[MedicationSchedule],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> TimingVarianceMetric {
    let day_set: HashSet<NaiveDate> = each_day_inclusive(window_start, window_end)
        .into_iter()
        .collect();
    let mut per_schedule = Vec::with_capacity(schedules.len());

    for schedule in schedules {
        let mut samples: Vec<i64> = Vec::new();
        for log in logs {
            if log.schedule_id != schedule.id || !day_set.contains(&log.log_date) {
                continue;
            }
            let Some(actual) = log.actual_time else {
                continue;
            };
            let slot_time = canonical_slot_time(log.log_date, schedule.time_slot);
            samples.push(abs_minutes_between(slot_time, actual));
        }
        let avg = if samples.is_empty() {
            None
        } else {
            Some(samples.iter().sum::<i64>() as f64 / samples.len() as f64)
        };
        per_schedule.push(TimingVariance {
            schedule_id: schedule.id,
            samples: samples.len() as u32,
            avg_abs_minutes: avg,
        });
    }

    TimingVarianceMetric {
        medication_id: *medication_id,
        per_schedule,
    }
}

/// Day-by-day intake consistency: binary taken/missed indicators per day and
/// the population variance of the daily taken ratio across the window.
pub fn compute_intake_consistency(
    medication_id: &Uuid,
    logs: &[IntakeLog],
    schedules: &[MedicationSchedule],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> IntakeConsistencyMetric {
    let days = each_day_inclusive(window_start, window_end);
    let mut per_schedule = Vec::with_capacity(schedules.len());

    for schedule in schedules {
        let mut daily_taken: Vec<u8> = Vec::with_capacity(days.len());
        let mut daily_missed: Vec<u8> = Vec::with_capacity(days.len());
        for day in &days {
            let has = |status: IntakeStatus| {
                logs.iter().any(|l| {
                    l.schedule_id == schedule.id && l.log_date == *day && l.status == status
                })
            };
            daily_taken.push(has(IntakeStatus::Taken) as u8);
            daily_missed.push(has(IntakeStatus::Missed) as u8);
        }

        let ratios: Vec<f64> = daily_taken
            .iter()
            .zip(&daily_missed)
            .map(|(&t, &m)| {
                let denom = u16::from(t) + u16::from(m);
                if denom == 0 {
                    0.0
                } else {
                    f64::from(t) / f64::from(denom)
                }
            })
            .collect();

        let variance = if ratios.is_empty() {
            None
        } else {
            let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
            Some(ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / ratios.len() as f64)
        };

        per_schedule.push(ScheduleConsistency {
            schedule_id: schedule.id,
            daily_taken,
            daily_missed,
            variance_taken_ratio: variance,
        });
    }

    IntakeConsistencyMetric {
        medication_id: *medication_id,
        window: WindowBounds::new(window_start, window_end),
        per_schedule,
    }
}

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"[a-z0-9]+").expect("static token pattern"))
}

/// Keyword frequency over in-window observations: lowercased, split on
/// non-alphanumeric runs, tokens shorter than 3 characters dropped.
pub fn compute_observation_frequencies(
    medication_id: &Uuid,
    logs: &[IntakeLog],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> ObservationFrequenciesMetric {
    let day_set: HashSet<NaiveDate> = each_day_inclusive(window_start, window_end)
        .into_iter()
        .collect();

    let mut frequencies: HashMap<String, u32> = HashMap::new();
    for log in logs {
        if log.medication_id != *medication_id || !day_set.contains(&log.log_date) {
            continue;
        }
        let Some(observation) = log.observation.as_deref() else {
            continue;
        };
        let text = observation.to_lowercase();
        for token in token_pattern().find_iter(&text) {
            let token = token.as_str();
            if token.len() >= 3 {
                *frequencies.entry(token.to_string()).or_insert(0) += 1;
            }
        }
    }

    ObservationFrequenciesMetric {
        medication_id: *medication_id,
        window: WindowBounds::new(window_start, window_end),
        frequencies,
    }
}

/// Bundle all five metrics for a single medication. Callers pass logs already
/// restricted to the medication's owner; each metric applies its own
/// medication/schedule filter on top.
pub fn compute_intake_metrics_bundle(
    medication_id: &Uuid,
    logs: &[IntakeLog],
    schedules: &[MedicationSchedule],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> IntakeMetricsBundle {
    let adherence = compute_adherence_rate(medication_id, logs, schedules, window_start, window_end);
    let missed = compute_missed_streaks(medication_id, logs, schedules, window_start, window_end);
    let timing = compute_timing_variance(medication_id, logs, schedules, window_start, window_end);
    let consistency =
        compute_intake_consistency(medication_id, logs, schedules, window_start, window_end);
    let observations =
        compute_observation_frequencies(medication_id, logs, window_start, window_end);

    IntakeMetricsBundle {
        medication_id: *medication_id,
        window: adherence.window,
        adherence,
        missed,
        timing,
        consistency,
        observations,
    }
}
