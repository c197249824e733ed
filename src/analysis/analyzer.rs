use super::client::ChatCompletionsClient;
use super::parser::parse_analysis_response;
use super::prompt::{build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
use super::sufficiency::assess_coverage;
use super::types::{ChatClient, DataQuality, PatternAnalysis};
use crate::config::AiConfig;
use crate::metrics::IntakeMetricsBundle;

/// Constrained pattern analysis over a metrics bundle.
///
/// Hard invariant: `analyze` never fails. Missing credential, unreachable
/// service, non-2xx status, unparsable output — every path degrades to empty
/// findings carrying the computed sufficiency level, so snapshot generation
/// is never blocked on AI availability.
pub struct PatternAnalyzer {
    client: Option<Box<dyn ChatClient + Send + Sync>>,
}

impl PatternAnalyzer {
    pub fn new(client: Option<Box<dyn ChatClient + Send + Sync>>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        let client = ChatCompletionsClient::from_config(config)
            .map(|c| Box::new(c) as Box<dyn ChatClient + Send + Sync>);
        if client.is_none() {
            tracing::info!("No analysis credential configured; AI pattern step disabled");
        }
        Self::new(client)
    }

    /// Analyzer with the AI step permanently off.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn analyze(&self, bundle: &IntakeMetricsBundle) -> PatternAnalysis {
        // Coverage is judged against the adherence denominator; the bundle
        // does not carry a raw log count.
        let logs_in_window = bundle.adherence.expected_count;
        let sufficiency = assess_coverage(
            logs_in_window,
            bundle.missed.per_schedule.len(),
            bundle.window.days,
        );
        let quality = DataQuality {
            logs_in_window,
            sufficiency_level: sufficiency,
        };

        if !sufficiency.is_sufficient_for_analysis() {
            return PatternAnalysis::empty(quality);
        }

        let Some(client) = &self.client else {
            return PatternAnalysis::empty(quality);
        };

        let user_prompt = build_analysis_prompt(bundle);
        let response = match client.complete(ANALYSIS_SYSTEM_PROMPT, &user_prompt) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    medication = %bundle.medication_id,
                    error = %e,
                    "Pattern analysis call failed; returning empty findings"
                );
                return PatternAnalysis::empty(quality);
            }
        };

        match parse_analysis_response(&response) {
            Some(findings) => PatternAnalysis {
                medication_patterns: findings.medication_patterns,
                adherence_signals: findings.adherence_signals,
                observation_associations: findings.observation_associations,
                data_quality: quality,
            },
            None => {
                tracing::warn!(
                    medication = %bundle.medication_id,
                    "Pattern analysis response had no parseable JSON; returning empty findings"
                );
                PatternAnalysis::empty(quality)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analysis::client::MockChatClient;
    use crate::analysis::types::SufficiencyLevel;
    use crate::analysis::AnalysisError;
    use crate::metrics::compute_intake_metrics_bundle;
    use crate::models::{IntakeLog, IntakeStatus, MedicationSchedule, TimeSlot};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn schedule_created(med: Uuid, created: NaiveDate) -> MedicationSchedule {
        MedicationSchedule {
            id: Uuid::new_v4(),
            medication_id: med,
            time_slot: TimeSlot::Evening,
            frequency: "once-daily".into(),
            timing: "with food".into(),
            note: None,
            created_at: created.and_hms_opt(8, 0, 0).unwrap().and_utc(),
            updated_at: created.and_hms_opt(8, 0, 0).unwrap().and_utc(),
        }
    }

    /// Full-window schedule: coverage reads robust.
    fn robust_bundle() -> crate::metrics::IntakeMetricsBundle {
        let med = Uuid::new_v4();
        let sched = schedule_created(med, day(1));
        let logs: Vec<IntakeLog> = (1..=10)
            .map(|d| IntakeLog {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                medication_id: med,
                schedule_id: sched.id,
                scheduled_time: TimeSlot::Evening,
                actual_time: None,
                status: IntakeStatus::Taken,
                observation: None,
                log_date: day(d),
                created_at: day(d).and_hms_opt(19, 0, 0).unwrap().and_utc(),
            })
            .collect();
        compute_intake_metrics_bundle(&med, &logs, &[sched], day(1), day(10))
    }

    /// Schedule created on the last window day: coverage reads insufficient.
    fn sparse_bundle() -> crate::metrics::IntakeMetricsBundle {
        let med = Uuid::new_v4();
        let sched = schedule_created(med, day(10));
        compute_intake_metrics_bundle(&med, &[], &[sched], day(1), day(10))
    }

    fn analysis_json() -> &'static str {
        r#"{
            "medicationPatterns": [
              {"type": "irregular_intake", "medicationId": "m1", "context": "Intake gaps of 2-3 days recur", "confidence": "moderate"}
            ],
            "adherenceSignals": [
              {"signal": "low_adherence", "medicationId": "m1", "severity": "moderate"}
            ],
            "observationAssociations": []
        }"#
    }

    #[test]
    fn returns_findings_for_sufficient_data() {
        let mock = Arc::new(MockChatClient::new(analysis_json()));
        let analyzer = PatternAnalyzer::new(Some(Box::new(mock.clone())));

        let analysis = analyzer.analyze(&robust_bundle());
        assert_eq!(mock.calls(), 1);
        assert_eq!(analysis.medication_patterns.len(), 1);
        assert_eq!(analysis.adherence_signals.len(), 1);
        assert_eq!(analysis.data_quality.sufficiency_level, SufficiencyLevel::Robust);
    }

    #[test]
    fn insufficient_coverage_skips_the_model_entirely() {
        let mock = Arc::new(MockChatClient::new(analysis_json()));
        let analyzer = PatternAnalyzer::new(Some(Box::new(mock.clone())));

        let analysis = analyzer.analyze(&sparse_bundle());
        assert_eq!(mock.calls(), 0);
        assert!(analysis.medication_patterns.is_empty());
        assert_eq!(
            analysis.data_quality.sufficiency_level,
            SufficiencyLevel::Insufficient
        );
    }

    #[test]
    fn missing_credential_is_a_supported_skip() {
        let analyzer = PatternAnalyzer::disabled();
        let analysis = analyzer.analyze(&robust_bundle());
        assert!(analysis.medication_patterns.is_empty());
        // Quality still reflects the data, not the missing credential.
        assert_eq!(analysis.data_quality.sufficiency_level, SufficiencyLevel::Robust);
    }

    #[test]
    fn transport_failure_degrades_to_empty_findings() {
        let mock = Arc::new(MockChatClient::failing(|| AnalysisError::Api {
            status: 500,
            body: "upstream".into(),
        }));
        let analyzer = PatternAnalyzer::new(Some(Box::new(mock.clone())));

        let analysis = analyzer.analyze(&robust_bundle());
        assert_eq!(mock.calls(), 1);
        assert!(analysis.medication_patterns.is_empty());
        assert!(analysis.adherence_signals.is_empty());
        assert!(analysis.observation_associations.is_empty());
    }

    #[test]
    fn malformed_response_degrades_to_empty_findings() {
        let mock = Arc::new(MockChatClient::new("The data shows no clear pattern."));
        let analyzer = PatternAnalyzer::new(Some(Box::new(mock)));

        let analysis = analyzer.analyze(&robust_bundle());
        assert!(analysis.medication_patterns.is_empty());
        assert_eq!(analysis.data_quality.sufficiency_level, SufficiencyLevel::Robust);
    }

    #[test]
    fn from_config_without_key_disables_ai() {
        let analyzer = PatternAnalyzer::from_config(&AiConfig::disabled());
        assert!(analyzer.client.is_none());
    }
}
