use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Inclusive day window a metric was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Inclusive day count of the window.
    pub days: usize,
}

impl WindowBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let days = super::dates::each_day_inclusive(start, end).len();
        WindowBounds { start, end, days }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdherenceRateMetric {
    pub medication_id: Uuid,
    pub window: WindowBounds,
    /// Sum over each day of the schedules already existing on that day.
    pub expected_count: u32,
    pub taken_count: u32,
    /// taken / expected in 0..=1; 0.0 when expected_count is 0. Callers must
    /// check expected_count to tell "no doses due" apart from "none taken".
    pub adherence_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedStreak {
    pub schedule_id: Uuid,
    pub longest: u32,
    /// Length of the streak still open at the window end.
    pub current: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedStreaksMetric {
    pub medication_id: Uuid,
    pub window: WindowBounds,
    pub per_schedule: Vec<MissedStreak>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingVariance {
    pub schedule_id: Uuid,
    pub samples: u32,
    /// Mean absolute deviation from the canonical slot time, in minutes.
    /// None when there are no timed samples — never reported as zero.
    pub avg_abs_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingVarianceMetric {
    pub medication_id: Uuid,
    pub per_schedule: Vec<TimingVariance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleConsistency {
    pub schedule_id: Uuid,
    /// Per-day binary indicators, aligned with the window's day sequence.
    pub daily_taken: Vec<u8>,
    pub daily_missed: Vec<u8>,
    /// Population variance of the daily taken ratio; None for an empty window.
    pub variance_taken_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeConsistencyMetric {
    pub medication_id: Uuid,
    pub window: WindowBounds,
    pub per_schedule: Vec<ScheduleConsistency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservationFrequenciesMetric {
    pub medication_id: Uuid,
    pub window: WindowBounds,
    /// Raw token counts — no stemming, no stopword list, by design.
    pub frequencies: HashMap<String, u32>,
}

/// Neutral presentation flag for an adherence rate. Keeps display components
/// free of threshold logic; deliberately two-valued and non-alarming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AwarenessFlag {
    #[serde(rename = "On track")]
    OnTrack,
    #[serde(rename = "Needs attention")]
    NeedsAttention,
}

impl AwarenessFlag {
    pub fn from_rate(adherence_rate: f64) -> Self {
        if adherence_rate >= 0.8 {
            AwarenessFlag::OnTrack
        } else {
            AwarenessFlag::NeedsAttention
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AwarenessFlag::OnTrack => "On track",
            AwarenessFlag::NeedsAttention => "Needs attention",
        }
    }
}

/// All five metric views for one medication over one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeMetricsBundle {
    pub medication_id: Uuid,
    pub window: WindowBounds,
    pub adherence: AdherenceRateMetric,
    pub missed: MissedStreaksMetric,
    pub timing: TimingVarianceMetric,
    pub consistency: IntakeConsistencyMetric,
    pub observations: ObservationFrequenciesMetric,
}
