//! Misalignment index computation
//!
//! Combines the five normalized mismatch scores into a single 0-100 index:
//!
//! ```text
//! raw       = 0.25 * nature + 0.20 * indoor + 0.20 * attention
//!           + 0.20 * circadian + 0.15 * social
//! composite = floor(100 / (1 + exp(-10 * raw + 5)))
//! ```
//!
//! The logistic reshape compresses the extremes and steepens the mid-range.
//! Both the composite and the per-dimension components truncate toward zero.

use crate::normalizer::MismatchNormalizer;
use crate::policy::{DimensionWeights, LogisticCurve, ScoringPolicy, VerdictBreakpoints};
use crate::types::{Components, MismatchScores, RawMeasurements, ScoreResult, Verdict};
use tracing::trace;

/// Score engine holding a scoring policy
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    policy: ScoringPolicy,
}

impl ScoreEngine {
    /// Create an engine with the default scoring policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a specific scoring policy
    pub fn with_policy(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Compute the misalignment index for one set of measurements
    pub fn compute(&self, raw: &RawMeasurements) -> ScoreResult {
        let scores = MismatchNormalizer::normalize(raw, &self.policy.saturation);
        self.score(&scores)
    }

    /// Score already-normalized mismatch values
    pub fn score(&self, scores: &MismatchScores) -> ScoreResult {
        let raw_mismatch = weighted_mismatch(scores, &self.policy.weights);
        let composite = reshape(raw_mismatch, &self.policy.curve);
        let verdict = classify_verdict(composite, &self.policy.verdict);

        trace!(raw_mismatch, composite, ?verdict, "computed misalignment index");

        ScoreResult {
            composite,
            verdict,
            components: scale_components(scores),
        }
    }
}

/// Compute the misalignment index with the default policy.
///
/// # Example
/// ```
/// use cap_core::{compute_index, RawMeasurements, Verdict};
///
/// let result = compute_index(&RawMeasurements {
///     indoor_hours: 5.1,
///     nature_minutes_this_week: 30.0,
///     screen_switches_per_minute: 2.3,
///     late_night_screen_minutes: 90.0,
///     social_proximity_events: 1.0,
/// });
/// assert_eq!(result.verdict, Verdict::HighMismatch);
/// ```
pub fn compute_index(measurements: &RawMeasurements) -> ScoreResult {
    ScoreEngine::new().compute(measurements)
}

/// Weighted combination of mismatch scores, in [0, 1] for valid weights
fn weighted_mismatch(scores: &MismatchScores, weights: &DimensionWeights) -> f64 {
    weights.nature * scores.nature
        + weights.indoor * scores.indoor
        + weights.attention * scores.attention
        + weights.circadian * scores.circadian
        + weights.social * scores.social
}

/// Logistic reshape to a truncated 0-100 integer
///
/// Formula: `floor(100 / (1 + exp(-k * raw + k * midpoint)))`
fn reshape(raw_mismatch: f64, curve: &LogisticCurve) -> u8 {
    let exponent = -curve.steepness * raw_mismatch + curve.steepness * curve.midpoint;
    let value = 100.0 / (1.0 + exponent.exp());
    value.clamp(0.0, 100.0) as u8
}

/// Classify a composite index with strict-greater breakpoints
pub fn classify_verdict(composite: u8, breakpoints: &VerdictBreakpoints) -> Verdict {
    if composite > breakpoints.high_above {
        Verdict::HighMismatch
    } else if composite > breakpoints.mild_above {
        Verdict::MildMismatch
    } else {
        Verdict::Aligned
    }
}

/// Scale each mismatch score to 0-100, truncating toward zero
fn scale_components(scores: &MismatchScores) -> Components {
    Components {
        indoor: to_percent(scores.indoor),
        nature: to_percent(scores.nature),
        attention: to_percent(scores.attention),
        circadian: to_percent(scores.circadian),
        social: to_percent(scores.social),
    }
}

fn to_percent(score: f64) -> u8 {
    (score * 100.0).clamp(0.0, 100.0) as u8
}
