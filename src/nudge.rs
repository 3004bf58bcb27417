//! Nudge generation
//!
//! Applies an ordered table of independent threshold rules to a score result.
//! Every rule is evaluated; the fired nudges are stable-sorted by priority
//! (descending) and capped. Rule order is the tie-break order.

use crate::normalizer::sanitize;
use crate::policy::NudgePolicy;
use crate::types::{Dimension, Nudge, NudgeKind, ScoreResult};
use tracing::debug;

/// Upper bound on indoor hours used in the value formula and body text
const HOURS_PER_DAY: f64 = 24.0;

/// Everything a rule may look at
struct RuleContext<'a> {
    score: &'a ScoreResult,
    indoor_hours: f64,
    nature_minutes_this_week: f64,
    policy: &'a NudgePolicy,
}

impl RuleContext<'_> {
    fn component_exceeds(&self, dimension: Dimension) -> bool {
        self.score.components.get(dimension) > self.policy.component_threshold
    }

    /// Indoor hours bounded to a single day
    fn bounded_indoor_hours(&self) -> f64 {
        self.indoor_hours.clamp(0.0, HOURS_PER_DAY)
    }

    /// Minutes short of the weekly target, saturating at the target itself
    fn nature_shortfall(&self) -> f64 {
        let target = self.policy.values.nature_target_minutes.max(0.0);
        (target - self.nature_minutes_this_week).clamp(0.0, target)
    }
}

/// A predicate paired with the nudge it builds
struct NudgeRule {
    kind: NudgeKind,
    fires: fn(&RuleContext) -> bool,
    build: fn(&RuleContext) -> Nudge,
}

/// Rules in evaluation order
const RULES: [NudgeRule; 6] = [
    NudgeRule {
        kind: NudgeKind::HighMismatch,
        fires: high_mismatch_fires,
        build: high_mismatch_nudge,
    },
    NudgeRule {
        kind: NudgeKind::IndoorConfinement,
        fires: indoor_fires,
        build: indoor_nudge,
    },
    NudgeRule {
        kind: NudgeKind::NatureDeficit,
        fires: nature_fires,
        build: nature_nudge,
    },
    NudgeRule {
        kind: NudgeKind::AttentionFragmentation,
        fires: attention_fires,
        build: attention_nudge,
    },
    NudgeRule {
        kind: NudgeKind::CircadianDisruption,
        fires: circadian_fires,
        build: circadian_nudge,
    },
    NudgeRule {
        kind: NudgeKind::SocialIsolation,
        fires: social_fires,
        build: social_nudge,
    },
];

fn high_mismatch_fires(ctx: &RuleContext) -> bool {
    ctx.score.composite > ctx.policy.high_mismatch_composite
}

fn high_mismatch_nudge(_: &RuleContext) -> Nudge {
    Nudge {
        kind: NudgeKind::HighMismatch,
        priority: 3,
        title: "⚠️ High Cognitive Misalignment".to_string(),
        body: "Your mind is out of sync with its biological design. Recovery is possible — right now."
            .to_string(),
        suggestion: "Pause. Breathe. Step into nature or silence for 5+ minutes.".to_string(),
        value_usd: None,
    }
}

fn indoor_fires(ctx: &RuleContext) -> bool {
    ctx.component_exceeds(Dimension::Indoor)
}

fn indoor_nudge(ctx: &RuleContext) -> Nudge {
    let values = &ctx.policy.values;
    let hours = ctx.bounded_indoor_hours();
    // Fewer hours than the baseline yields a negative value
    let value = round_cents((hours - values.indoor_baseline_hours) * values.indoor_usd_per_hour);
    Nudge {
        kind: NudgeKind::IndoorConfinement,
        priority: 2,
        title: "You’ve Been Indoors Too Long".to_string(),
        body: format!(
            "You’ve been inside {hours:.1} hours. Your brain evolved for open skies."
        ),
        suggestion: "Step outside for 12 minutes. Any green space counts.".to_string(),
        value_usd: Some(value),
    }
}

fn nature_fires(ctx: &RuleContext) -> bool {
    ctx.component_exceeds(Dimension::Nature)
}

fn nature_nudge(ctx: &RuleContext) -> Nudge {
    let shortfall = ctx.nature_shortfall();
    Nudge {
        kind: NudgeKind::NatureDeficit,
        priority: 2,
        title: "Nature Deficit Detected".to_string(),
        body: format!(
            "You’re {} minutes behind this week on restorative nature exposure.",
            shortfall as u64
        ),
        suggestion: "Visit a park, garden, or tree-lined street today.".to_string(),
        value_usd: Some(round_cents(shortfall * ctx.policy.values.nature_usd_per_minute)),
    }
}

fn attention_fires(ctx: &RuleContext) -> bool {
    ctx.component_exceeds(Dimension::Attention)
}

fn attention_nudge(ctx: &RuleContext) -> Nudge {
    Nudge {
        kind: NudgeKind::AttentionFragmentation,
        priority: 3,
        title: "Your Attention Is Fragmenting".to_string(),
        body: "Excessive app switching reduces deep focus and increases stress.".to_string(),
        suggestion: "Try 10 minutes of silent walking or stillness.".to_string(),
        value_usd: Some(round_cents(ctx.policy.values.attention_usd)),
    }
}

fn circadian_fires(ctx: &RuleContext) -> bool {
    ctx.component_exceeds(Dimension::Circadian)
}

fn circadian_nudge(_: &RuleContext) -> Nudge {
    Nudge {
        kind: NudgeKind::CircadianDisruption,
        priority: 3,
        title: "Night Screen = Melatonin Suppression".to_string(),
        body: "Your screen use after 10 PM is suppressing melatonin by up to 88%.".to_string(),
        suggestion: "Enable night mode and avoid screens 1 hour before bed.".to_string(),
        value_usd: None,
    }
}

fn social_fires(ctx: &RuleContext) -> bool {
    ctx.component_exceeds(Dimension::Social)
}

fn social_nudge(_: &RuleContext) -> Nudge {
    Nudge {
        kind: NudgeKind::SocialIsolation,
        priority: 2,
        title: "Your Brain Craves Real Connection".to_string(),
        body: "Loneliness harms health like smoking 15 cigarettes/day.".to_string(),
        suggestion: "Meet someone in person — even a brief chat helps.".to_string(),
        value_usd: None,
    }
}

/// Nudge engine holding a nudge policy
#[derive(Debug, Clone, Default)]
pub struct NudgeEngine {
    policy: NudgePolicy,
}

impl NudgeEngine {
    /// Create an engine with the default nudge policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a specific nudge policy
    pub fn with_policy(policy: NudgePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &NudgePolicy {
        &self.policy
    }

    /// Generate the prioritized nudge list for a score result
    ///
    /// # Arguments
    /// * `score` - Output of the score engine
    /// * `indoor_hours` - Raw indoor hours (used in the indoor value and body text)
    /// * `nature_minutes_this_week` - Raw weekly nature minutes (used for the shortfall)
    pub fn generate(
        &self,
        score: &ScoreResult,
        indoor_hours: f64,
        nature_minutes_this_week: f64,
    ) -> Vec<Nudge> {
        let ctx = RuleContext {
            score,
            indoor_hours: sanitize(indoor_hours),
            nature_minutes_this_week: sanitize(nature_minutes_this_week),
            policy: &self.policy,
        };

        let mut nudges: Vec<Nudge> = RULES
            .iter()
            .filter(|rule| (rule.fires)(&ctx))
            .map(|rule| {
                debug!(kind = ?rule.kind, "nudge rule fired");
                (rule.build)(&ctx)
            })
            .collect();

        // Stable: equal priorities keep rule order
        nudges.sort_by(|a, b| b.priority.cmp(&a.priority));
        nudges.truncate(self.policy.max_nudges);
        nudges
    }
}

/// Generate nudges with the default policy.
pub fn generate_nudges(
    score: &ScoreResult,
    indoor_hours: f64,
    nature_minutes_this_week: f64,
) -> Vec<Nudge> {
    NudgeEngine::new().generate(score, indoor_hours, nature_minutes_this_week)
}

/// Round a dollar amount to two decimals.
///
/// Formatting rounds the exact binary value, so 1.605 (stored as 1.60499...)
/// rounds down instead of being pushed onto the half cent by `* 100.0`.
pub(crate) fn round_cents(value: f64) -> f64 {
    match format!("{value:.2}").parse::<f64>() {
        Ok(rounded) if rounded == 0.0 => 0.0,
        Ok(rounded) => rounded,
        Err(_) => value,
    }
}
