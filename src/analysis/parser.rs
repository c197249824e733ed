use serde::Deserialize;

use crate::models::{AdherenceSignal, MedicationPattern, ObservationAssociation};

/// Findings extracted from a model response, before data quality is attached.
#[derive(Debug, Clone, Default)]
pub struct ParsedFindings {
    pub medication_patterns: Vec<MedicationPattern>,
    pub adherence_signals: Vec<AdherenceSignal>,
    pub observation_associations: Vec<ObservationAssociation>,
}

/// Parse a model response into findings.
///
/// Takes the first balanced `{...}` region, parses it as JSON, coerces any
/// non-array expected field to an empty array and discards everything else.
/// Returns None only when no parseable JSON object exists at all — the caller
/// degrades to empty findings either way, never an error.
pub fn parse_analysis_response(response: &str) -> Option<ParsedFindings> {
    let json_region = extract_balanced_object(response)?;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawResponse {
        medication_patterns: Option<Vec<serde_json::Value>>,
        adherence_signals: Option<Vec<serde_json::Value>>,
        observation_associations: Option<Vec<serde_json::Value>>,
    }

    let raw: RawResponse = serde_json::from_str(json_region).ok()?;

    Some(ParsedFindings {
        medication_patterns: parse_array_lenient(raw.medication_patterns.as_deref()),
        adherence_signals: parse_array_lenient(raw.adherence_signals.as_deref()),
        observation_associations: parse_array_lenient(raw.observation_associations.as_deref()),
    })
}

/// First balanced `{...}` region of the text, if any.
fn extract_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse an array leniently — skip items that fail to deserialize.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(items: Option<&[serde_json::Value]>) -> Vec<T> {
    match items {
        None => vec![],
        Some(arr) => arr
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}
