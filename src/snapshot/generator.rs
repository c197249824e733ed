use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::store::AwarenessStore;
use super::SnapshotError;
use crate::analysis::{PatternAnalyzer, SignalFlags};
use crate::db::DatabaseError;
use crate::metrics::compute_intake_metrics_bundle;
use crate::models::{AwarenessSnapshot, IntakeLog, SnapshotFindings, TimeWindow};

/// Outcome of one generation pass. `success: false` means the pass fell back
/// to a minimal snapshot after an internal failure — a row was still written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedSnapshot {
    pub success: bool,
    pub snapshot_id: Uuid,
}

/// Generates and persists awareness snapshots.
///
/// The generator is the error boundary for the whole pipeline: metric
/// computation, gating and AI analysis failures never escape it. The single
/// fatal case is a store that cannot even take the minimal fallback write.
pub struct SnapshotGenerator {
    store: Arc<dyn AwarenessStore>,
    analyzer: PatternAnalyzer,
}

impl SnapshotGenerator {
    pub fn new(store: Arc<dyn AwarenessStore>, analyzer: PatternAnalyzer) -> Self {
        Self { store, analyzer }
    }

    pub fn store(&self) -> &Arc<dyn AwarenessStore> {
        &self.store
    }

    pub fn generate(
        &self,
        user_id: &Uuid,
        time_window: TimeWindow,
    ) -> Result<GeneratedSnapshot, SnapshotError> {
        match self.run(user_id, time_window) {
            Ok(snapshot) => Ok(GeneratedSnapshot {
                success: true,
                snapshot_id: snapshot.id,
            }),
            Err(e) => {
                tracing::error!(
                    user = %user_id,
                    window = time_window.as_str(),
                    error = %e,
                    "Snapshot generation failed; writing minimal snapshot"
                );
                let fallback = self.store.upsert_snapshot(
                    user_id,
                    time_window,
                    &SnapshotFindings::default(),
                    false,
                )?;
                Ok(GeneratedSnapshot {
                    success: false,
                    snapshot_id: fallback.id,
                })
            }
        }
    }

    fn run(
        &self,
        user_id: &Uuid,
        time_window: TimeWindow,
    ) -> Result<AwarenessSnapshot, DatabaseError> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(time_window.days());

        let medications = self.store.medications_with_schedules(user_id)?;
        if medications.is_empty() {
            tracing::debug!(user = %user_id, "No medications; persisting empty snapshot");
            return self.store.upsert_snapshot(
                user_id,
                time_window,
                &SnapshotFindings::default(),
                false,
            );
        }

        let mut findings = SnapshotFindings::default();
        let mut flags = SignalFlags::default();

        // Sequential on purpose: one outbound analysis call at a time.
        for entry in &medications {
            let med_id = entry.medication.id;
            let logs = self.store.intake_logs_in_range(user_id, start, end)?;
            let med_logs: Vec<IntakeLog> = logs
                .into_iter()
                .filter(|l| l.medication_id == med_id)
                .collect();

            let bundle =
                compute_intake_metrics_bundle(&med_id, &med_logs, &entry.schedules, start, end);

            // Flags accumulate disjunctively across medications.
            flags.merge(SignalFlags::evaluate(&med_logs));

            let analysis = self.analyzer.analyze(&bundle);
            findings
                .medication_patterns
                .extend(analysis.medication_patterns);
            findings.adherence_signals.extend(analysis.adherence_signals);
            findings
                .observation_associations
                .extend(analysis.observation_associations);
        }

        let data_sufficiency = flags.any()
            || !findings.adherence_signals.is_empty()
            || !findings.observation_associations.is_empty();

        tracing::debug!(
            user = %user_id,
            window = time_window.as_str(),
            patterns = findings.medication_patterns.len(),
            signals = findings.adherence_signals.len(),
            associations = findings.observation_associations.len(),
            data_sufficiency,
            "Persisting awareness snapshot"
        );

        self.store
            .upsert_snapshot(user_id, time_window, &findings, data_sufficiency)
    }
}
