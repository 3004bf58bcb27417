//! Measurement normalization
//!
//! Maps each raw behavioral measurement onto a 0-1 mismatch scale, where 1 is
//! maximal mismatch for that dimension.
//! - Linear ramps saturate at their policy saturation point
//! - Out-of-range input (negative, far beyond saturation, infinite) clamps
//! - NaN is treated as a missing measurement (0)

use crate::policy::SaturationPoints;
use crate::types::{MismatchScores, RawMeasurements};

/// Normalizer for converting raw measurements to mismatch scores
pub struct MismatchNormalizer;

impl MismatchNormalizer {
    /// Normalize raw measurements against the given saturation points
    pub fn normalize(raw: &RawMeasurements, saturation: &SaturationPoints) -> MismatchScores {
        MismatchScores {
            indoor: normalize_indoor(sanitize(raw.indoor_hours), saturation.indoor_hours),
            nature: normalize_nature(
                sanitize(raw.nature_minutes_this_week),
                saturation.nature_target_minutes,
            ),
            attention: normalize_attention(
                sanitize(raw.screen_switches_per_minute),
                saturation.switches_per_minute,
            ),
            circadian: normalize_circadian(
                sanitize(raw.late_night_screen_minutes),
                saturation.late_night_minutes,
            ),
            social: normalize_social(
                sanitize(raw.social_proximity_events),
                saturation.social_events,
            ),
        }
    }
}

/// Treat NaN as an omitted measurement
pub(crate) fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Indoor confinement: linear ramp to saturation
///
/// Formula: `min(indoor_hours / saturation, 1.0)`
fn normalize_indoor(indoor_hours: f64, saturation_hours: f64) -> f64 {
    (indoor_hours / saturation_hours).clamp(0.0, 1.0)
}

/// Nature deficit: shortfall against the weekly target
///
/// Formula: `max(0, target - minutes) / target`
fn normalize_nature(nature_minutes: f64, target_minutes: f64) -> f64 {
    let shortfall = (target_minutes - nature_minutes).max(0.0);
    (shortfall / target_minutes).clamp(0.0, 1.0)
}

/// Attention fragmentation: linear ramp on app switch rate
///
/// Formula: `min(switches_per_minute / saturation, 1.0)`
fn normalize_attention(switches_per_minute: f64, saturation_rate: f64) -> f64 {
    (switches_per_minute / saturation_rate).clamp(0.0, 1.0)
}

/// Circadian disruption: linear ramp on late-night screen time
///
/// Formula: `min(late_night_minutes / saturation, 1.0)`
fn normalize_circadian(late_night_minutes: f64, saturation_minutes: f64) -> f64 {
    (late_night_minutes / saturation_minutes).clamp(0.0, 1.0)
}

/// Social isolation: each proximity event reduces mismatch
///
/// Formula: `clamp(1.0 - events / saturation, 0.0, 1.0)`
fn normalize_social(events: f64, saturation_events: f64) -> f64 {
    (1.0 - events / saturation_events).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_case() -> RawMeasurements {
        RawMeasurements {
            indoor_hours: 5.1,
            nature_minutes_this_week: 30.0,
            screen_switches_per_minute: 2.3,
            late_night_screen_minutes: 90.0,
            social_proximity_events: 1.0,
        }
    }

    fn in_unit_range(scores: &MismatchScores) -> bool {
        [
            scores.indoor,
            scores.nature,
            scores.attention,
            scores.circadian,
            scores.social,
        ]
        .iter()
        .all(|s| (0.0..=1.0).contains(s))
    }

    #[test]
    fn test_normalize_worked_case() {
        let scores = MismatchNormalizer::normalize(&worked_case(), &SaturationPoints::default());

        assert_eq!(scores.indoor, 1.0);
        assert!((scores.nature - 0.75).abs() < 1e-12);
        assert_eq!(scores.attention, 1.0);
        assert!((scores.circadian - 0.75).abs() < 1e-12);
        assert!((scores.social - 6.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_input() {
        let scores = MismatchNormalizer::normalize(
            &RawMeasurements::default(),
            &SaturationPoints::default(),
        );

        // Nothing measured: no indoor/attention/circadian mismatch, full nature/social deficit
        assert_eq!(scores.indoor, 0.0);
        assert_eq!(scores.attention, 0.0);
        assert_eq!(scores.circadian, 0.0);
        assert_eq!(scores.nature, 1.0);
        assert_eq!(scores.social, 1.0);
    }

    #[test]
    fn test_saturation_holds_for_large_values() {
        let raw = RawMeasurements {
            indoor_hours: 1000.0,
            nature_minutes_this_week: 1e9,
            screen_switches_per_minute: 1e6,
            late_night_screen_minutes: 1e6,
            social_proximity_events: 1e6,
        };
        let scores = MismatchNormalizer::normalize(&raw, &SaturationPoints::default());

        assert_eq!(scores.indoor, 1.0);
        assert_eq!(scores.nature, 0.0);
        assert_eq!(scores.attention, 1.0);
        assert_eq!(scores.circadian, 1.0);
        assert_eq!(scores.social, 0.0);
    }

    #[test]
    fn test_nature_met_target() {
        assert_eq!(normalize_nature(120.0, 120.0), 0.0);
        assert_eq!(normalize_nature(150.0, 120.0), 0.0);
        assert!((normalize_nature(60.0, 120.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_social_floor_at_seven_events() {
        assert_eq!(normalize_social(7.0, 7.0), 0.0);
        assert_eq!(normalize_social(12.0, 7.0), 0.0);
        assert!(normalize_social(3.0, 7.0) > normalize_social(4.0, 7.0));
    }

    #[test]
    fn test_negative_input_clamps() {
        let raw = RawMeasurements {
            indoor_hours: -3.0,
            nature_minutes_this_week: -50.0,
            screen_switches_per_minute: -1.0,
            late_night_screen_minutes: -10.0,
            social_proximity_events: -2.0,
        };
        let scores = MismatchNormalizer::normalize(&raw, &SaturationPoints::default());

        assert!(in_unit_range(&scores));
        assert_eq!(scores.indoor, 0.0);
        assert_eq!(scores.nature, 1.0);
        assert_eq!(scores.social, 1.0);
    }

    #[test]
    fn test_non_finite_input() {
        let raw = RawMeasurements {
            indoor_hours: f64::NAN,
            nature_minutes_this_week: f64::INFINITY,
            screen_switches_per_minute: f64::INFINITY,
            late_night_screen_minutes: f64::NEG_INFINITY,
            social_proximity_events: f64::NAN,
        };
        let scores = MismatchNormalizer::normalize(&raw, &SaturationPoints::default());

        assert!(in_unit_range(&scores));
        // NaN behaves like an omitted measurement
        assert_eq!(scores.indoor, 0.0);
        assert_eq!(scores.social, 1.0);
        assert_eq!(scores.nature, 0.0);
        assert_eq!(scores.attention, 1.0);
        assert_eq!(scores.circadian, 0.0);
    }

    #[test]
    fn test_custom_saturation() {
        let saturation = SaturationPoints {
            indoor_hours: 8.0,
            ..Default::default()
        };
        let raw = RawMeasurements {
            indoor_hours: 4.0,
            ..Default::default()
        };
        let scores = MismatchNormalizer::normalize(&raw, &saturation);
        assert!((scores.indoor - 0.5).abs() < 1e-12);
    }
}
