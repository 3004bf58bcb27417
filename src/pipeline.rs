//! Pipeline orchestration
//!
//! This module provides the JSON-facing API. It runs measurements through the
//! score engine, feeds the result into the nudge engine, and encodes a report.

use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::nudge::NudgeEngine;
use crate::policy::Policy;
use crate::score::ScoreEngine;
use crate::types::{AlignmentReport, Nudge, RawMeasurements, ScoreResult};
use tracing::debug;

/// Parse a measurements JSON object. Missing fields default to 0.
pub fn parse_measurements(json: &str) -> Result<RawMeasurements, ComputeError> {
    serde_json::from_str(json).map_err(|e| ComputeError::InvalidInput(e.to_string()))
}

/// Convert measurements JSON to report JSON (stateless, one-shot, default policy).
///
/// # Example
/// ```
/// let report = cap_core::measurements_to_report(r#"{"indoor_hours": 6.7}"#).unwrap();
/// assert!(report.contains("\"composite\""));
/// ```
pub fn measurements_to_report(json: &str) -> Result<String, ComputeError> {
    AlignmentProcessor::new().process(json)
}

/// Processor holding a policy and an encoder identity.
///
/// Nothing but configuration carries across calls.
pub struct AlignmentProcessor {
    score_engine: ScoreEngine,
    nudge_engine: NudgeEngine,
    encoder: ReportEncoder,
}

impl Default for AlignmentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AlignmentProcessor {
    /// Create a processor with the default policy
    pub fn new() -> Self {
        Self {
            score_engine: ScoreEngine::new(),
            nudge_engine: NudgeEngine::new(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor with a validated policy
    pub fn with_policy(policy: Policy) -> Result<Self, ComputeError> {
        policy.validate()?;
        Ok(Self {
            score_engine: ScoreEngine::with_policy(policy.scoring),
            nudge_engine: NudgeEngine::with_policy(policy.nudges),
            encoder: ReportEncoder::new(),
        })
    }

    /// Effective policy
    pub fn policy(&self) -> Policy {
        Policy {
            scoring: self.score_engine.policy().clone(),
            nudges: self.nudge_engine.policy().clone(),
        }
    }

    /// Score measurements
    pub fn score(&self, measurements: &RawMeasurements) -> ScoreResult {
        self.score_engine.compute(measurements)
    }

    /// Generate nudges for a score, using the raw values the score was computed from
    pub fn nudges(&self, score: &ScoreResult, measurements: &RawMeasurements) -> Vec<Nudge> {
        self.nudge_engine.generate(
            score,
            measurements.indoor_hours,
            measurements.nature_minutes_this_week,
        )
    }

    /// Run both stages and build the report
    pub fn report(&self, measurements: &RawMeasurements) -> AlignmentReport {
        let (score, nudges) = self.evaluate(measurements);
        self.encoder.encode(measurements, score, nudges)
    }

    /// Process measurements JSON and return report JSON
    pub fn process(&self, json: &str) -> Result<String, ComputeError> {
        let measurements = parse_measurements(json)?;
        let (score, nudges) = self.evaluate(&measurements);
        self.encoder.encode_to_json(&measurements, score, nudges)
    }

    fn evaluate(&self, measurements: &RawMeasurements) -> (ScoreResult, Vec<Nudge>) {
        let score = self.score(measurements);
        let nudges = self.nudges(&score, measurements);

        debug!(
            composite = score.composite,
            verdict = %score.verdict,
            nudges = nudges.len(),
            "processed measurements"
        );

        (score, nudges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NudgeKind, Verdict};
    use pretty_assertions::assert_eq;

    fn sample_measurements_json() -> &'static str {
        r#"{
            "indoor_hours": 5.1,
            "nature_minutes_this_week": 30,
            "screen_switches_per_minute": 2.3,
            "late_night_screen_minutes": 90,
            "social_proximity_events": 1
        }"#
    }

    #[test]
    fn test_measurements_to_report() {
        let json = measurements_to_report(sample_measurements_json()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["report_version"], "1.0.0");
        assert_eq!(payload["producer"]["name"], "cap-core");
        assert_eq!(payload["score"]["composite"], 97);
        assert_eq!(payload["score"]["verdict"], "high_mismatch");
        assert_eq!(payload["score"]["components"]["social"], 85);

        let nudges = payload["nudges"].as_array().unwrap();
        assert_eq!(nudges.len(), 3);
        assert_eq!(nudges[0]["kind"], "high_mismatch");
        assert!(nudges[0].get("value_usd").is_none());
        assert_eq!(nudges[1]["value_usd"], 7.55);
        assert!((payload["total_value_usd"].as_f64().unwrap() - 7.55).abs() < 1e-9);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let processor = AlignmentProcessor::new();
        let measurements = parse_measurements("{}").unwrap();
        assert_eq!(measurements, RawMeasurements::default());

        // Nature and social fully deficient: raw = 0.40, composite 26
        let report = processor.report(&measurements);
        assert_eq!(report.score.composite, 26);
        assert_eq!(report.score.verdict, Verdict::Aligned);
        assert_eq!(
            report.nudges.iter().map(|n| n.kind).collect::<Vec<_>>(),
            vec![NudgeKind::NatureDeficit, NudgeKind::SocialIsolation]
        );
    }

    #[test]
    fn test_invalid_type_is_invalid_input() {
        let result = measurements_to_report(r#"{"indoor_hours": "five"}"#);
        assert!(matches!(result, Err(ComputeError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = measurements_to_report("not valid json");
        assert!(matches!(result, Err(ComputeError::InvalidInput(_))));
    }

    #[test]
    fn test_custom_policy() {
        let mut policy = Policy::default();
        policy.nudges.max_nudges = 6;
        let processor = AlignmentProcessor::with_policy(policy.clone()).unwrap();
        assert_eq!(processor.policy(), policy);

        let measurements = parse_measurements(sample_measurements_json()).unwrap();
        let report = processor.report(&measurements);
        // Circadian is exactly 75 here; all six rules fire
        assert_eq!(report.nudges.len(), 6);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let mut policy = Policy::default();
        policy.scoring.weights.social = 0.5;
        assert!(AlignmentProcessor::with_policy(policy).is_err());
    }

    #[test]
    fn test_process_reports_rounded_values() {
        let processor = AlignmentProcessor::new();
        let json = processor
            .process(r#"{"indoor_hours": 3.5, "nature_minutes_this_week": 25}"#)
            .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        let nudges = payload["nudges"].as_array().unwrap();
        assert_eq!(nudges[0]["kind"], "indoor_confinement");
        assert_eq!(nudges[0]["value_usd"], 1.6);
        assert_eq!(nudges[1]["kind"], "nature_deficit");
        assert_eq!(nudges[1]["value_usd"], 40.56);
        assert_eq!(payload["total_value_usd"], 42.16);
        assert_eq!(
            payload["producer"]["instance_id"],
            processor.encoder.instance_id()
        );
    }

    #[test]
    fn test_huge_measurements_keep_values_numeric() {
        let json = measurements_to_report(
            r#"{"indoor_hours": 1e308, "nature_minutes_this_week": -1e308}"#,
        )
        .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        for nudge in payload["nudges"].as_array().unwrap() {
            if let Some(value) = nudge.get("value_usd") {
                assert!(value.is_f64(), "{} value is {value}", nudge["kind"]);
            }
        }
        assert!(payload["total_value_usd"].is_f64());
    }

    #[test]
    fn test_repeated_calls_identical_score() {
        let processor = AlignmentProcessor::new();
        let measurements = parse_measurements(sample_measurements_json()).unwrap();
        let first = processor.report(&measurements);
        let second = processor.report(&measurements);

        assert_eq!(first.score, second.score);
        assert_eq!(first.nudges, second.nudges);
        assert_eq!(first.producer.instance_id, second.producer.instance_id);
    }
}
