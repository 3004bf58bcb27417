//! Alignment report encoder
//!
//! Wraps a score result and its nudges in a report payload with producer
//! metadata and provenance timestamps.

use crate::error::ComputeError;
use crate::nudge::round_cents;
use crate::types::{AlignmentReport, Nudge, RawMeasurements, ReportProducer, ScoreResult};
use crate::{CAP_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build the report payload
    pub fn encode(
        &self,
        measurements: &RawMeasurements,
        score: ScoreResult,
        nudges: Vec<Nudge>,
    ) -> AlignmentReport {
        let total_value_usd = round_cents(nudges.iter().filter_map(|n| n.value_usd).sum::<f64>());

        AlignmentReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: CAP_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            measurements: *measurements,
            score,
            nudges,
            total_value_usd,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        measurements: &RawMeasurements,
        score: ScoreResult,
        nudges: Vec<Nudge>,
    ) -> Result<String, ComputeError> {
        let report = self.encode(measurements, score, nudges);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Components, NudgeKind, Verdict};
    use pretty_assertions::assert_eq;

    fn sample_score() -> ScoreResult {
        ScoreResult {
            composite: 82,
            verdict: Verdict::HighMismatch,
            components: Components {
                indoor: 95,
                nature: 88,
                attention: 92,
                circadian: 75,
                social: 80,
            },
        }
    }

    fn nudge(kind: NudgeKind, value_usd: Option<f64>) -> Nudge {
        Nudge {
            kind,
            priority: 2,
            title: String::new(),
            body: String::new(),
            suggestion: String::new(),
            value_usd,
        }
    }

    #[test]
    fn test_total_value_skips_absent() {
        let encoder = ReportEncoder::new();
        let report = encoder.encode(
            &RawMeasurements::default(),
            sample_score(),
            vec![
                nudge(NudgeKind::IndoorConfinement, Some(3.32)),
                nudge(NudgeKind::SocialIsolation, None),
                nudge(NudgeKind::NatureDeficit, Some(38.43)),
            ],
        );
        assert_eq!(report.total_value_usd, 41.75);
        assert_eq!(report.producer.instance_id, encoder.instance_id());
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.report_version, REPORT_VERSION);
    }

    #[test]
    fn test_empty_nudges_total_zero() {
        let report =
            ReportEncoder::new().encode(&RawMeasurements::default(), sample_score(), vec![]);
        assert_eq!(report.total_value_usd, 0.0);
        assert!(report.total_value_usd.is_sign_positive());
        assert!(report.nudges.is_empty());
    }

    #[test]
    fn test_total_value_rounded_to_cents() {
        let report = ReportEncoder::new().encode(
            &RawMeasurements::default(),
            sample_score(),
            vec![
                nudge(NudgeKind::IndoorConfinement, Some(0.1)),
                nudge(NudgeKind::NatureDeficit, Some(0.2)),
            ],
        );
        assert_eq!(report.total_value_usd, 0.3);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"total_value_usd\":0.3"));
    }

    #[test]
    fn test_encode_to_json_shape() {
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json(&RawMeasurements::default(), sample_score(), vec![])
            .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["score"]["composite"], 82);
        assert_eq!(payload["score"]["verdict"], "high_mismatch");
        assert_eq!(payload["score"]["components"]["circadian"], 75);
        assert!(payload["computed_at_utc"].is_string());
        assert!(payload["nudges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_unique_instance_ids() {
        assert_ne!(
            ReportEncoder::new().instance_id(),
            ReportEncoder::new().instance_id()
        );
    }
}
