use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;

use super::enums::TimeWindow;

/// Kind of intake pattern the analysis step may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    IrregularIntake,
    TimingInconsistency,
    ObservationCluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Moderate,
    High,
}

/// Kind of adherence signal. Deliberately neutral vocabulary — no urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    MissedStreak,
    LowAdherence,
    InconsistentPattern,
}

/// Severity is capped at moderate by design; the product never alarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalRelation {
    #[serde(rename = "within_24_hours")]
    Within24Hours,
    SameDay,
    Unclear,
}

/// One structured statement about intake behavior for a medication.
/// `context` is a bounded plain description, never advice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationPattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub medication_id: String,
    pub context: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceSignal {
    pub signal: SignalKind,
    pub medication_id: String,
    pub severity: Severity,
}

/// Temporal association between an observation keyword and intake events,
/// stated without any causal claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationAssociation {
    pub observation: String,
    pub temporal_relation: TemporalRelation,
    pub confidence: Confidence,
}

/// The three finding arrays a snapshot carries, in typed form.
///
/// The snapshot row stores these as JSON text columns; this type is the single
/// encode/decode boundary for that representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFindings {
    pub medication_patterns: Vec<MedicationPattern>,
    pub adherence_signals: Vec<AdherenceSignal>,
    pub observation_associations: Vec<ObservationAssociation>,
}

impl SnapshotFindings {
    pub fn is_empty(&self) -> bool {
        self.medication_patterns.is_empty()
            && self.adherence_signals.is_empty()
            && self.observation_associations.is_empty()
    }

    /// Encode the three arrays into their JSON column values.
    pub fn encode(&self) -> Result<EncodedFindings, DatabaseError> {
        fn enc<T: Serialize>(v: &T) -> Result<String, DatabaseError> {
            serde_json::to_string(v)
                .map_err(|e| DatabaseError::ConstraintViolation(format!("findings encode: {e}")))
        }
        Ok(EncodedFindings {
            medication_patterns: enc(&self.medication_patterns)?,
            adherence_signals: enc(&self.adherence_signals)?,
            observation_associations: enc(&self.observation_associations)?,
        })
    }

    /// Decode a stored snapshot's JSON columns back into typed findings.
    /// Unknown or malformed entries are dropped rather than failing the read.
    pub fn decode(snapshot: &AwarenessSnapshot) -> Self {
        fn lenient<T: for<'de> Deserialize<'de>>(json: &str) -> Vec<T> {
            serde_json::from_str::<Vec<serde_json::Value>>(json)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect()
        }
        SnapshotFindings {
            medication_patterns: lenient(&snapshot.medication_patterns),
            adherence_signals: lenient(&snapshot.adherence_signals),
            observation_associations: lenient(&snapshot.observation_associations),
        }
    }
}

/// JSON column values ready for the snapshot row.
#[derive(Debug, Clone)]
pub struct EncodedFindings {
    pub medication_patterns: String,
    pub adherence_signals: String,
    pub observation_associations: String,
}

/// Persisted awareness snapshot — a cache of a pure derivation, not an event
/// log. Exactly one live row per (user_id, time_window); regeneration
/// overwrites content and `generated_at` in place, `created_at` is stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwarenessSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub time_window: TimeWindow,
    pub medication_patterns: String,
    pub adherence_signals: String,
    pub observation_associations: String,
    pub data_sufficiency: bool,
    pub generated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_findings() -> SnapshotFindings {
        SnapshotFindings {
            medication_patterns: vec![MedicationPattern {
                kind: PatternKind::TimingInconsistency,
                medication_id: "a1b2c3d4".into(),
                context: "Evening schedule shows variable intake times".into(),
                confidence: Confidence::Moderate,
            }],
            adherence_signals: vec![AdherenceSignal {
                signal: SignalKind::MissedStreak,
                medication_id: "a1b2c3d4".into(),
                severity: Severity::Low,
            }],
            observation_associations: vec![],
        }
    }

    #[test]
    fn findings_encode_uses_wire_field_names() {
        let enc = sample_findings().encode().unwrap();
        assert!(enc.medication_patterns.contains("\"type\":\"timing_inconsistency\""));
        assert!(enc.medication_patterns.contains("\"medicationId\""));
        assert!(enc.adherence_signals.contains("\"missed_streak\""));
        assert_eq!(enc.observation_associations, "[]");
    }

    #[test]
    fn decode_round_trips() {
        let findings = sample_findings();
        let enc = findings.encode().unwrap();
        let snapshot = AwarenessSnapshot {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            time_window: TimeWindow::ThirtyDays,
            medication_patterns: enc.medication_patterns,
            adherence_signals: enc.adherence_signals,
            observation_associations: enc.observation_associations,
            data_sufficiency: true,
            generated_at: Utc::now(),
            created_at: Utc::now(),
        };
        let decoded = SnapshotFindings::decode(&snapshot);
        assert_eq!(decoded.medication_patterns.len(), 1);
        assert_eq!(decoded.medication_patterns[0].kind, PatternKind::TimingInconsistency);
        assert_eq!(decoded.adherence_signals[0].signal, SignalKind::MissedStreak);
        assert!(decoded.observation_associations.is_empty());
    }

    #[test]
    fn decode_drops_malformed_entries() {
        let snapshot = AwarenessSnapshot {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            time_window: TimeWindow::SevenDays,
            medication_patterns: r#"[{"bogus": true}, {"type":"irregular_intake","medicationId":"m1","context":"x","confidence":"low"}]"#.into(),
            adherence_signals: "not json at all".into(),
            observation_associations: "[]".into(),
            data_sufficiency: false,
            generated_at: Utc::now(),
            created_at: Utc::now(),
        };
        let decoded = SnapshotFindings::decode(&snapshot);
        assert_eq!(decoded.medication_patterns.len(), 1);
        assert!(decoded.adherence_signals.is_empty());
    }

    #[test]
    fn default_findings_are_empty() {
        assert!(SnapshotFindings::default().is_empty());
        assert!(!sample_findings().is_empty());
    }
}
