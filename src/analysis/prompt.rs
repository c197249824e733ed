use std::fmt::Write as _;

use crate::metrics::IntakeMetricsBundle;

/// Fixed, versioned system contract for the pattern-analysis model. The
/// constraints are non-negotiable product requirements: neutral descriptions
/// only, JSON only, fixed vocabularies, empty arrays when data is sparse.
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a deterministic pattern recognition system for medication intake analysis.

CONSTRAINTS (MANDATORY):
- You MUST NOT provide medical advice, diagnoses, recommendations, or instructions.
- You MUST NOT use imperative language or urgency language.
- You MUST NOT infer causation or suggest interventions.
- You MUST output valid JSON only, with no additional text.
- You MUST assign confidence levels (low, moderate, high) based on data evidence.
- If data is sparse or insufficient, return empty arrays in the result.
- You MUST NOT guess or extrapolate beyond the data.

ROLE:
- Identify patterns in intake behavior (regularity, timing, consistency).
- Identify deviations from expected patterns.
- Identify temporal associations between observations and intake events (without causal claims).

OUTPUT FORMAT:
Always respond with valid JSON matching this exact structure (no additional prose):
{
  "medicationPatterns": [
    {
      "type": "irregular_intake" | "timing_inconsistency" | "observation_cluster",
      "medicationId": "...",
      "context": "plain description only, no recommendations",
      "confidence": "low" | "moderate" | "high"
    }
  ],
  "adherenceSignals": [
    {
      "signal": "missed_streak" | "low_adherence" | "inconsistent_pattern",
      "medicationId": "...",
      "severity": "low" | "moderate"
    }
  ],
  "observationAssociations": [
    {
      "observation": "keyword from data",
      "temporalRelation": "within_24_hours" | "same_day" | "unclear",
      "confidence": "low" | "moderate" | "high"
    }
  ]
}

EXAMPLES OF WHAT NOT TO DO:
- "Patient should reduce evening doses" <- FORBIDDEN (advice)
- "This indicates diabetes" <- FORBIDDEN (diagnosis)
- "High risk of adverse event" <- FORBIDDEN (urgency)
- "Likely caused by stress" <- FORBIDDEN (causation inference)

EXAMPLES OF WHAT TO DO:
- "Evening schedule shows 40% missed rate" <- OK (fact with metric)
- "Observation 'dizziness' appears on 3 days with morning dose" <- OK (association without claim)
- "Adherence varies 10-90% week-to-week" <- OK (pattern description)
"#;

/// Serialize a metrics bundle into the user prompt. Only derived aggregates
/// cross this boundary — never raw logs, never free text beyond the short
/// keyword tokens.
pub fn build_analysis_prompt(metrics: &IntakeMetricsBundle) -> String {
    let adherence = &metrics.adherence;

    let mut per_schedule = String::new();
    for streak in &metrics.missed.per_schedule {
        let variance = metrics
            .consistency
            .per_schedule
            .iter()
            .find(|c| c.schedule_id == streak.schedule_id)
            .and_then(|c| c.variance_taken_ratio);
        let variance = match variance {
            Some(v) => format!("{:.1}%", v * 100.0),
            None => "N/A".to_string(),
        };
        let _ = writeln!(
            per_schedule,
            "Schedule {}: {} longest missed streak, variance {}",
            short_id(&streak.schedule_id.to_string()),
            streak.longest,
            variance,
        );
    }

    let mut timing_lines = String::new();
    for timing in &metrics.timing.per_schedule {
        let avg = match timing.avg_abs_minutes {
            Some(v) => format!("{v:.1}"),
            None => "no data".to_string(),
        };
        let _ = writeln!(
            timing_lines,
            "{}: {} min avg",
            short_id(&timing.schedule_id.to_string()),
            avg,
        );
    }

    let mut keywords: Vec<(&String, &u32)> = metrics.observations.frequencies.iter().collect();
    keywords.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let observation_summary = keywords
        .iter()
        .take(10)
        .map(|(word, count)| format!("\"{word}\" ({count}x)"))
        .collect::<Vec<_>>()
        .join(", ");
    let observation_summary = if observation_summary.is_empty() {
        "none".to_string()
    } else {
        observation_summary
    };

    format!(
        "Analyze intake patterns for medication {} ({} days):\n\n\
         Adherence: {:.1}% ({}/{})\n\
         Schedules in window: {}\n\n\
         Per-Schedule Details:\n{}\n\
         Timing Variance:\n{}\n\
         Observations (top keywords): {}\n\n\
         Identify patterns, deviations, and temporal associations without advice or diagnosis.",
        metrics.medication_id,
        metrics.window.days,
        adherence.adherence_rate * 100.0,
        adherence.taken_count,
        adherence.expected_count,
        metrics.missed.per_schedule.len(),
        per_schedule,
        timing_lines,
        observation_summary,
    )
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}
