//! Scoring and nudge policy
//!
//! All thresholds, weights, and curve parameters live here so the policy can be
//! swapped without touching the engines. Every field has a serde default, so a
//! partial file only overrides what it names.
//!
//! ```toml
//! [scoring.weights]
//! nature = 0.25
//! indoor = 0.20
//! attention = 0.20
//! circadian = 0.20
//! social = 0.15
//!
//! [scoring.curve]
//! steepness = 10.0
//! midpoint = 0.5
//!
//! [nudges]
//! max_nudges = 3
//! component_threshold = 70
//! ```

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Complete policy for both engines
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub scoring: ScoringPolicy,
    #[serde(default)]
    pub nudges: NudgePolicy,
}

impl Policy {
    /// Parse a policy from TOML
    pub fn from_toml(s: &str) -> Result<Self, ComputeError> {
        let policy: Policy =
            toml::from_str(s).map_err(|e| ComputeError::PolicyParse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Parse a policy from JSON
    pub fn from_json(s: &str) -> Result<Self, ComputeError> {
        let policy: Policy =
            serde_json::from_str(s).map_err(|e| ComputeError::PolicyParse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn to_toml(&self) -> Result<String, ComputeError> {
        toml::to_string_pretty(self).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Check internal consistency of the policy
    pub fn validate(&self) -> Result<(), ComputeError> {
        self.scoring.validate()?;
        self.nudges.validate()
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Policy for the score engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringPolicy {
    #[serde(default)]
    pub saturation: SaturationPoints,
    #[serde(default)]
    pub weights: DimensionWeights,
    #[serde(default)]
    pub curve: LogisticCurve,
    #[serde(default)]
    pub verdict: VerdictBreakpoints,
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), ComputeError> {
        self.saturation.validate()?;
        if !self.weights.is_valid() {
            return Err(ComputeError::InvalidPolicy(format!(
                "dimension weights must sum to 1.0 (got {:.4})",
                self.weights.sum()
            )));
        }
        if !(self.curve.steepness.is_finite() && self.curve.steepness > 0.0) {
            return Err(ComputeError::InvalidPolicy(
                "curve steepness must be positive".to_string(),
            ));
        }
        if !self.curve.midpoint.is_finite() {
            return Err(ComputeError::InvalidPolicy(
                "curve midpoint must be finite".to_string(),
            ));
        }
        if self.verdict.mild_above >= self.verdict.high_above {
            return Err(ComputeError::InvalidPolicy(format!(
                "mild breakpoint ({}) must be below high breakpoint ({})",
                self.verdict.mild_above, self.verdict.high_above
            )));
        }
        Ok(())
    }
}

/// Raw values at which each dimension reaches full mismatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaturationPoints {
    /// Indoor hours at which the indoor score saturates (default: 4.0)
    #[serde(default = "default_indoor_hours")]
    pub indoor_hours: f64,
    /// Weekly nature minutes that eliminate the nature deficit (default: 120.0)
    #[serde(default = "default_nature_target_minutes")]
    pub nature_target_minutes: f64,
    /// Switches per minute at which attention saturates (default: 1.5)
    #[serde(default = "default_switch_rate")]
    pub switches_per_minute: f64,
    /// Late-night screen minutes at which circadian saturates (default: 120.0)
    #[serde(default = "default_late_night_minutes")]
    pub late_night_minutes: f64,
    /// Social events at which social mismatch reaches zero (default: 7.0)
    #[serde(default = "default_social_events")]
    pub social_events: f64,
}

impl Default for SaturationPoints {
    fn default() -> Self {
        Self {
            indoor_hours: default_indoor_hours(),
            nature_target_minutes: default_nature_target_minutes(),
            switches_per_minute: default_switch_rate(),
            late_night_minutes: default_late_night_minutes(),
            social_events: default_social_events(),
        }
    }
}

impl SaturationPoints {
    fn validate(&self) -> Result<(), ComputeError> {
        let points = [
            ("indoor_hours", self.indoor_hours),
            ("nature_target_minutes", self.nature_target_minutes),
            ("switches_per_minute", self.switches_per_minute),
            ("late_night_minutes", self.late_night_minutes),
            ("social_events", self.social_events),
        ];
        for (name, value) in points {
            if !(value.is_finite() && value > 0.0) {
                return Err(ComputeError::InvalidPolicy(format!(
                    "saturation point {name} must be positive and finite (got {value})"
                )));
            }
        }
        Ok(())
    }
}

fn default_indoor_hours() -> f64 {
    4.0
}
fn default_nature_target_minutes() -> f64 {
    120.0
}
fn default_switch_rate() -> f64 {
    1.5
}
fn default_late_night_minutes() -> f64 {
    120.0
}
fn default_social_events() -> f64 {
    7.0
}

/// Weights for the five dimensions (must sum to 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    #[serde(default = "default_nature_weight")]
    pub nature: f64,
    #[serde(default = "default_indoor_weight")]
    pub indoor: f64,
    #[serde(default = "default_attention_weight")]
    pub attention: f64,
    #[serde(default = "default_circadian_weight")]
    pub circadian: f64,
    #[serde(default = "default_social_weight")]
    pub social: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            nature: default_nature_weight(),
            indoor: default_indoor_weight(),
            attention: default_attention_weight(),
            circadian: default_circadian_weight(),
            social: default_social_weight(),
        }
    }
}

fn default_nature_weight() -> f64 {
    0.25
}
fn default_indoor_weight() -> f64 {
    0.20
}
fn default_attention_weight() -> f64 {
    0.20
}
fn default_circadian_weight() -> f64 {
    0.20
}
fn default_social_weight() -> f64 {
    0.15
}

impl DimensionWeights {
    pub fn sum(&self) -> f64 {
        self.nature + self.indoor + self.attention + self.circadian + self.social
    }

    /// Validate that weights are non-negative and sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        let all_non_negative = [
            self.nature,
            self.indoor,
            self.attention,
            self.circadian,
            self.social,
        ]
        .iter()
        .all(|w| w.is_finite() && *w >= 0.0);
        all_non_negative && (self.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE
    }
}

/// Logistic reshape applied to the weighted raw mismatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticCurve {
    #[serde(default = "default_steepness")]
    pub steepness: f64,
    #[serde(default = "default_midpoint")]
    pub midpoint: f64,
}

impl Default for LogisticCurve {
    fn default() -> Self {
        Self {
            steepness: default_steepness(),
            midpoint: default_midpoint(),
        }
    }
}

fn default_steepness() -> f64 {
    10.0
}
fn default_midpoint() -> f64 {
    0.5
}

/// Strict-greater breakpoints on the composite index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictBreakpoints {
    /// Composite strictly above this is HighMismatch (default: 60)
    #[serde(default = "default_high_above")]
    pub high_above: u8,
    /// Composite strictly above this is MildMismatch (default: 30)
    #[serde(default = "default_mild_above")]
    pub mild_above: u8,
}

impl Default for VerdictBreakpoints {
    fn default() -> Self {
        Self {
            high_above: default_high_above(),
            mild_above: default_mild_above(),
        }
    }
}

fn default_high_above() -> u8 {
    60
}
fn default_mild_above() -> u8 {
    30
}

// ============================================================================
// Nudges
// ============================================================================

/// Policy for the nudge engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NudgePolicy {
    /// Maximum nudges returned per call (default: 3)
    #[serde(default = "default_max_nudges")]
    pub max_nudges: usize,
    /// Composite strictly above this fires the overall nudge (default: 75)
    #[serde(default = "default_high_mismatch_composite")]
    pub high_mismatch_composite: u8,
    /// Component strictly above this fires its dimension nudge (default: 70)
    #[serde(default = "default_component_threshold")]
    pub component_threshold: u8,
    #[serde(default)]
    pub values: RecoveryValues,
}

impl Default for NudgePolicy {
    fn default() -> Self {
        Self {
            max_nudges: default_max_nudges(),
            high_mismatch_composite: default_high_mismatch_composite(),
            component_threshold: default_component_threshold(),
            values: RecoveryValues::default(),
        }
    }
}

impl NudgePolicy {
    pub fn validate(&self) -> Result<(), ComputeError> {
        let values = [
            ("indoor_baseline_hours", self.values.indoor_baseline_hours),
            ("indoor_usd_per_hour", self.values.indoor_usd_per_hour),
            ("nature_target_minutes", self.values.nature_target_minutes),
            ("nature_usd_per_minute", self.values.nature_usd_per_minute),
            ("attention_usd", self.values.attention_usd),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(ComputeError::InvalidPolicy(format!(
                    "recovery value {name} must be finite"
                )));
            }
        }
        Ok(())
    }
}

fn default_max_nudges() -> usize {
    3
}
fn default_high_mismatch_composite() -> u8 {
    75
}
fn default_component_threshold() -> u8 {
    70
}

/// Constants for the monetary value formulas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryValues {
    /// Hours indoors above which time counts toward the value (default: 2.0)
    #[serde(default = "default_indoor_baseline_hours")]
    pub indoor_baseline_hours: f64,
    /// Value per indoor hour above baseline (default: 1.07)
    #[serde(default = "default_indoor_usd_per_hour")]
    pub indoor_usd_per_hour: f64,
    /// Weekly nature target in minutes (default: 120.0)
    #[serde(default = "default_nature_target_minutes")]
    pub nature_target_minutes: f64,
    /// Value per minute of nature shortfall (default: 0.427)
    #[serde(default = "default_nature_usd_per_minute")]
    pub nature_usd_per_minute: f64,
    /// Flat value of an attention recovery break (default: 7.55)
    #[serde(default = "default_attention_usd")]
    pub attention_usd: f64,
}

impl Default for RecoveryValues {
    fn default() -> Self {
        Self {
            indoor_baseline_hours: default_indoor_baseline_hours(),
            indoor_usd_per_hour: default_indoor_usd_per_hour(),
            nature_target_minutes: default_nature_target_minutes(),
            nature_usd_per_minute: default_nature_usd_per_minute(),
            attention_usd: default_attention_usd(),
        }
    }
}

fn default_indoor_baseline_hours() -> f64 {
    2.0
}
fn default_indoor_usd_per_hour() -> f64 {
    1.07
}
fn default_nature_usd_per_minute() -> f64 {
    0.427
}
fn default_attention_usd() -> f64 {
    7.55
}
