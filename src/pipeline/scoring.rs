use crate::config::config::{CompositeConfig, FeedbackConfig};
use crate::pipeline::aggregate::AggregateMetrics;

pub const NO_FACE_FEEDBACK: &str = "No face detected in the video. Please ensure proper lighting and camera positioning.";

const EYE_CONTACT_FEEDBACK: [&str; 4] = [
    "You maintained natural and engaging eye contact throughout the interview.",
    "Your eye contact was appropriate, with a good balance of engagement and natural breaks.",
    "Your eye contact was adequate but could be more consistent while still maintaining natural breaks.",
    "Try to increase eye contact while speaking, but remember it's natural to look away occasionally when thinking or listening.",
];

const CONFIDENCE_FEEDBACK: [&str; 4] = [
    "Your body language shows strong confidence while remaining approachable.",
    "You appear confident and composed, with room for slight improvement in your body language.",
    "Try to project more confidence while maintaining your natural demeanor.",
    "Work on appearing more confident while staying authentic. Consider practicing power poses before interviews.",
];

const NERVOUSNESS_FEEDBACK: [&str; 4] = [
    "You appeared very calm and natural.",
    "You showed good composure with normal levels of interview energy.",
    "Some nervous energy was visible, but this is natural in interviews. Try deep breathing exercises to stay centered.",
    "You showed signs of nervousness, which is completely normal. Practice more mock interviews to build comfort.",
];

/// CompositeScorer weighs the video metrics into a single bounded score.
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    config: CompositeConfig,
}

impl CompositeScorer {
    pub fn new(config: CompositeConfig) -> Self {
        CompositeScorer { config }
    }

    /// score returns `confidence·w_c·scale + eye_contact·w_e·scale − nervousness·w_n·scale`,
    /// clamped to `[min_score, max_score]`. Non-finite inputs end at `min_score`.
    pub fn score(&self, metrics: &AggregateMetrics) -> f32 {
        let config = &self.config;
        let score = metrics.confidence * config.confidence_weight * config.scale
            + metrics.eye_contact * config.eye_contact_weight * config.scale
            - metrics.nervousness * config.nervousness_weight * config.scale;

        score.max(config.min_score).min(config.max_score)
    }
}

/// FeedbackGenerator describes the video metrics in three sentences:
/// eye contact, confidence, then nervousness.
#[derive(Debug, Clone, Default)]
pub struct FeedbackGenerator {
    config: FeedbackConfig,
}

impl FeedbackGenerator {
    pub fn new(config: FeedbackConfig) -> Self {
        FeedbackGenerator { config }
    }

    pub fn generate(&self, metrics: &AggregateMetrics) -> String {
        let feedback = [
            EYE_CONTACT_FEEDBACK[tier_above(metrics.eye_contact, &self.config.eye_contact_tiers)],
            CONFIDENCE_FEEDBACK[tier_above(metrics.confidence, &self.config.confidence_tiers)],
            NERVOUSNESS_FEEDBACK[tier_below(metrics.nervousness, &self.config.nervousness_tiers)],
        ];
        feedback.join(" ")
    }
}

/// tier_above returns the first tier whose threshold `value` strictly exceeds, or the last tier.
fn tier_above(value: f32, thresholds: &[f32; 3]) -> usize {
    thresholds
        .iter()
        .position(|&threshold| value > threshold)
        .unwrap_or(thresholds.len())
}

/// tier_below returns the first tier whose threshold `value` stays strictly under, or the last tier.
fn tier_below(value: f32, thresholds: &[f32; 3]) -> usize {
    thresholds
        .iter()
        .position(|&threshold| value < threshold)
        .unwrap_or(thresholds.len())
}
