use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl DetectorConfig {
    pub fn new() -> Self {
        DetectorConfig {
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Weights applied to a micro-expression profile. `lips_relaxation` multiplies `1 - lips_tension`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MicroExpressionWeights {
    pub eye_asymmetry: f32,
    pub brow_asymmetry: f32,
    pub lips_relaxation: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AffectConfig {
    pub eye_contact_floor: f32,
    pub confidence_weights: MicroExpressionWeights,
    pub nervousness_weights: MicroExpressionWeights,
    pub nervousness_floor: f32,
    pub blink_threshold: f32,
}

impl AffectConfig {
    pub fn new() -> Self {
        AffectConfig {
            eye_contact_floor: 0.3,
            confidence_weights: MicroExpressionWeights {
                eye_asymmetry: 0.2,
                brow_asymmetry: 0.3,
                lips_relaxation: 0.5,
            },
            nervousness_weights: MicroExpressionWeights {
                eye_asymmetry: 0.3,
                brow_asymmetry: 0.3,
                lips_relaxation: 0.4,
            },
            nervousness_floor: 0.2,
            blink_threshold: 0.2,
        }
    }
}

impl Default for AffectConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub window_size: usize,
    pub good_window_threshold: f32,
    pub quality_span: f32,
    pub floor: f32,
}

impl WindowConfig {
    pub fn new() -> Self {
        WindowConfig {
            window_size: 30,
            good_window_threshold: 0.5,
            quality_span: 0.7,
            floor: 0.3,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompositeConfig {
    pub confidence_weight: f32,
    pub eye_contact_weight: f32,
    pub nervousness_weight: f32,
    pub scale: f32,
    pub min_score: f32,
    pub max_score: f32,
}

impl CompositeConfig {
    pub fn new() -> Self {
        CompositeConfig {
            confidence_weight: 0.5,
            eye_contact_weight: 0.3,
            nervousness_weight: 0.2,
            scale: 10.0,
            min_score: 0.0,
            max_score: 10.0,
        }
    }
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Tier thresholds, best tier first. Eye contact and confidence tiers use `>`,
/// nervousness tiers use `<`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedbackConfig {
    pub eye_contact_tiers: [f32; 3],
    pub confidence_tiers: [f32; 3],
    pub nervousness_tiers: [f32; 3],
}

impl FeedbackConfig {
    pub fn new() -> Self {
        FeedbackConfig {
            eye_contact_tiers: [0.7, 0.5, 0.3],
            confidence_tiers: [0.8, 0.6, 0.4],
            nervousness_tiers: [0.3, 0.5, 0.7],
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ScoringConfig {
    pub affect: AffectConfig,
    pub window: WindowConfig,
    pub composite: CompositeConfig,
    pub feedback: FeedbackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub frame_stride: usize,
    pub audio_weight: f32,
    pub video_weight: f32,
    pub bonus: f32,
    pub ceiling: f32,
    pub allowed_extensions: Vec<String>,
    pub video_score_decimals: u32,
    pub final_score_decimals: u32,
}

impl SessionConfig {
    pub fn new() -> Self {
        SessionConfig {
            frame_stride: 3,
            audio_weight: 0.7,
            video_weight: 0.3,
            bonus: 3.0,
            ceiling: 10.0,
            allowed_extensions: vec!["mp4".to_string(), "avi".to_string(), "mov".to_string()],
            video_score_decimals: 1,
            final_score_decimals: 2,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// PipelineConfig groups every tunable of the pipeline. The defaults are the product constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub scoring: ScoringConfig,
    pub session: SessionConfig,
}

impl PipelineConfig {
    /// from_json parses a configuration, filling missing fields with the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// load reads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// save writes the configuration as pretty printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::config::PipelineConfig;
    use crate::error::Error;

    #[test]
    fn test_default_product_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.session.frame_stride, 3);
        assert_eq!(config.scoring.window.window_size, 30);
        assert_eq!(config.scoring.composite.confidence_weight, 0.5);
        assert_eq!(config.scoring.affect.nervousness_floor, 0.2);
        assert_eq!(config.detector.min_detection_confidence, 0.5);
        assert_eq!(config.session.allowed_extensions, vec!["mp4", "avi", "mov"]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{"scoring": {"window": {"window_size": 10}}}"#).unwrap();
        assert_eq!(config.scoring.window.window_size, 10);
        assert_eq!(config.scoring.window.floor, 0.3);
        assert_eq!(config.session, PipelineConfig::default().session);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let mut config = PipelineConfig::default();
        config.detector.min_tracking_confidence = 0.7;
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let result = PipelineConfig::from_json("{ not json");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
