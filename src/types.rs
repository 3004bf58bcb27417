//! Core data types
//!
//! This module defines the measurements, scores, and recommendation records
//! that flow through the scoring and nudge pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Inputs
// ============================================================================

/// Daily/weekly behavioral measurements for one person.
///
/// Every field defaults to 0 when absent. No field has an upper bound;
/// normalization saturates instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMeasurements {
    /// Hours spent indoors in the observation day
    pub indoor_hours: f64,
    /// Cumulative minutes in natural settings this week
    pub nature_minutes_this_week: f64,
    /// Rate of app/context switches per minute
    pub screen_switches_per_minute: f64,
    /// Minutes of screen exposure in the late-night window
    pub late_night_screen_minutes: f64,
    /// In-person social proximity events detected in the last 24h
    pub social_proximity_events: f64,
}

/// The five mismatch dimensions, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Indoor,
    Nature,
    Attention,
    Circadian,
    Social,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Indoor,
        Dimension::Nature,
        Dimension::Attention,
        Dimension::Circadian,
        Dimension::Social,
    ];

    /// Key used in the components breakdown
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Indoor => "indoor",
            Dimension::Nature => "nature",
            Dimension::Attention => "attention",
            Dimension::Circadian => "circadian",
            Dimension::Social => "social",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Scores
// ============================================================================

/// Fractional mismatch per dimension, each in [0, 1] (1 = maximal mismatch).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MismatchScores {
    pub indoor: f64,
    pub nature: f64,
    pub attention: f64,
    pub circadian: f64,
    pub social: f64,
}

impl MismatchScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Indoor => self.indoor,
            Dimension::Nature => self.nature,
            Dimension::Attention => self.attention,
            Dimension::Circadian => self.circadian,
            Dimension::Social => self.social,
        }
    }
}

/// Per-dimension sub-scores scaled to 0-100 and truncated toward zero.
///
/// Always carries exactly the five dimension keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Components {
    pub indoor: u8,
    pub nature: u8,
    pub attention: u8,
    pub circadian: u8,
    pub social: u8,
}

impl Components {
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Indoor => self.indoor,
            Dimension::Nature => self.nature,
            Dimension::Attention => self.attention,
            Dimension::Circadian => self.circadian,
            Dimension::Social => self.social,
        }
    }

    /// Iterate `(dimension, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u8)> + '_ {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }
}

/// Three-level classification of the composite index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Aligned,
    MildMismatch,
    HighMismatch,
}

impl Verdict {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Aligned => "Aligned",
            Verdict::MildMismatch => "Mild Mismatch",
            Verdict::HighMismatch => "High Mismatch",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of the score engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Misalignment index, 0-100
    pub composite: u8,
    pub verdict: Verdict,
    pub components: Components,
}

// ============================================================================
// Nudges
// ============================================================================

/// Which rule produced a nudge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeKind {
    HighMismatch,
    IndoorConfinement,
    NatureDeficit,
    AttentionFragmentation,
    CircadianDisruption,
    SocialIsolation,
}

/// A prioritized, human-readable recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nudge {
    pub kind: NudgeKind,
    /// 1-3, higher is more urgent
    pub priority: u8,
    pub title: String,
    pub body: String,
    pub suggestion: String,
    /// Estimated monetary value of following the nudge, when the rule defines one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_usd: Option<f64>,
}

// ============================================================================
// Report payload
// ============================================================================

/// Producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Full output of one pipeline run: score, nudges, and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub measurements: RawMeasurements,
    pub score: ScoreResult,
    pub nudges: Vec<Nudge>,
    /// Sum of `value_usd` over the selected nudges
    pub total_value_usd: f64,
}
