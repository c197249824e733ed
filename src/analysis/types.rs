use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::models::{AdherenceSignal, MedicationPattern, ObservationAssociation};

/// Coarse coverage classification of a medication's window. Only `adequate`
/// and `robust` windows are worth a model invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SufficiencyLevel {
    Insufficient,
    Minimal,
    Adequate,
    Robust,
}

impl SufficiencyLevel {
    pub fn is_sufficient_for_analysis(&self) -> bool {
        !matches!(self, SufficiencyLevel::Insufficient | SufficiencyLevel::Minimal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub logs_in_window: u32,
    pub sufficiency_level: SufficiencyLevel,
}

/// Constrained model output for one medication: three bounded finding lists
/// plus the data-quality descriptor attached by the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub medication_patterns: Vec<MedicationPattern>,
    pub adherence_signals: Vec<AdherenceSignal>,
    pub observation_associations: Vec<ObservationAssociation>,
    pub data_quality: DataQuality,
}

impl PatternAnalysis {
    /// The safe fallback: no findings, quality descriptor preserved.
    pub fn empty(data_quality: DataQuality) -> Self {
        PatternAnalysis {
            medication_patterns: Vec::new(),
            adherence_signals: Vec::new(),
            observation_associations: Vec::new(),
            data_quality,
        }
    }
}

/// Chat-completion transport. One blocking call per analysis; implementations
/// must not retry internally.
pub trait ChatClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, AnalysisError>;
}

impl<T: ChatClient + ?Sized> ChatClient for std::sync::Arc<T> {
    fn complete(&self, system: &str, user: &str) -> Result<String, AnalysisError> {
        (**self).complete(system, user)
    }
}
