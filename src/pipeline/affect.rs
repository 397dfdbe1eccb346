use std::f32::consts::PI;
use crate::config::config::{AffectConfig, MicroExpressionWeights};
use crate::error::Result;
use crate::helper::face_helper::{is_blinking, FaceHelper, GeometricMetrics};
use crate::utils::coordinate::LandmarkSet;

/// Asymmetry and tension features of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MicroExpressionProfile {
    pub eye_asymmetry: f32,
    pub lips_tension: f32,
    pub brow_asymmetry: f32,
}

impl MicroExpressionProfile {
    pub fn from_metrics(metrics: &GeometricMetrics) -> Self {
        MicroExpressionProfile {
            eye_asymmetry: (metrics.left_eye_ratio - metrics.right_eye_ratio).abs(),
            lips_tension: metrics.lip_ratio,
            brow_asymmetry: (metrics.left_brow_ratio - metrics.right_brow_ratio).abs(),
        }
    }

    fn weighted(&self, weights: &MicroExpressionWeights) -> f32 {
        self.eye_asymmetry * weights.eye_asymmetry
            + self.brow_asymmetry * weights.brow_asymmetry
            + (1.0 - self.lips_tension) * weights.lips_relaxation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAffect {
    pub confidence: f32,
    pub nervousness: f32,
    pub eye_contact: f32,
    pub blinking: bool,
    pub micro_expressions: MicroExpressionProfile,
}

/// FrameAffectAnalyzer turns the landmarks of one frame into affect estimates.
#[derive(Debug, Clone)]
pub struct FrameAffectAnalyzer {
    face_helper: FaceHelper,
    config: AffectConfig,
}

impl FrameAffectAnalyzer {
    pub fn new(face_helper: FaceHelper, config: AffectConfig) -> Self {
        FrameAffectAnalyzer { face_helper, config }
    }

    pub fn config(&self) -> &AffectConfig {
        &self.config
    }

    /// analyze estimates confidence, nervousness and eye contact for one face.
    ///
    /// # Arguments
    /// * `landmarks` - &LandmarkSet
    ///
    /// # Returns
    /// * `Result<FrameAffect>`
    pub fn analyze(&self, landmarks: &LandmarkSet) -> Result<FrameAffect> {
        let (left_direction, right_direction) = self.face_helper.gaze_deviations(landmarks)?;
        let metrics = self.face_helper.geometric_metrics(landmarks)?;
        let micro_expressions = MicroExpressionProfile::from_metrics(&metrics);

        let blinking = is_blinking(metrics.left_eye_ratio, self.config.blink_threshold)
            || is_blinking(metrics.right_eye_ratio, self.config.blink_threshold);

        Ok(FrameAffect {
            confidence: self.confidence(&micro_expressions),
            nervousness: self.nervousness(&micro_expressions),
            eye_contact: self.eye_contact(left_direction, right_direction),
            blinking,
            micro_expressions,
        })
    }

    /// eye_contact maps the average gaze deviation of both eyes to `[floor, 1]`.
    /// An eye without a measurable gaze direction yields the floor.
    pub fn eye_contact(&self, left_direction: Option<f32>, right_direction: Option<f32>) -> f32 {
        let floor = self.config.eye_contact_floor;
        match (left_direction, right_direction) {
            (Some(left), Some(right)) => {
                let avg_eye_direction = (left + right) / 2.0;
                floor.max(1.0 - avg_eye_direction / PI)
            }
            _ => floor
        }
    }

    /// confidence is left unclamped, extreme asymmetries may push it below zero.
    pub fn confidence(&self, profile: &MicroExpressionProfile) -> f32 {
        1.0 - profile.weighted(&self.config.confidence_weights)
    }

    pub fn nervousness(&self, profile: &MicroExpressionProfile) -> f32 {
        self.config.nervousness_floor.max(profile.weighted(&self.config.nervousness_weights))
    }
}

impl Default for FrameAffectAnalyzer {
    fn default() -> Self {
        Self::new(FaceHelper::default(), AffectConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};
    use ndarray::Array2;
    use crate::error::Error;
    use crate::helper::face_helper::{FaceHelper, GeometricMetrics, FACE_MESH_POINTS};
    use crate::pipeline::affect::{FrameAffectAnalyzer, MicroExpressionProfile};
    use crate::utils::coordinate::LandmarkSet;

    fn profile(eye_asymmetry: f32, lips_tension: f32, brow_asymmetry: f32) -> MicroExpressionProfile {
        MicroExpressionProfile { eye_asymmetry, lips_tension, brow_asymmetry }
    }

    #[test]
    fn test_micro_expressions_from_metrics() {
        let metrics = GeometricMetrics {
            left_eye_ratio: 0.30,
            right_eye_ratio: 0.25,
            lip_ratio: 0.4,
            left_brow_ratio: 0.1,
            right_brow_ratio: 0.2,
        };
        let profile = MicroExpressionProfile::from_metrics(&metrics);
        assert!((profile.eye_asymmetry - 0.05).abs() < 1e-6);
        assert_eq!(profile.lips_tension, 0.4);
        assert!((profile.brow_asymmetry - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_eye_contact_formula_and_floor() {
        let analyzer = FrameAffectAnalyzer::default();
        assert_eq!(analyzer.eye_contact(Some(0.0), Some(0.0)), 1.0);
        assert!((analyzer.eye_contact(Some(FRAC_PI_2), Some(FRAC_PI_2)) - 0.5).abs() < 1e-6);
        assert!((analyzer.eye_contact(Some(0.0), Some(FRAC_PI_2)) - 0.75).abs() < 1e-6);
        assert_eq!(analyzer.eye_contact(Some(PI), Some(PI)), 0.3);
        assert_eq!(analyzer.eye_contact(None, Some(0.0)), 0.3);
    }

    #[test]
    fn test_confidence_formula() {
        let analyzer = FrameAffectAnalyzer::default();
        // 1 - (0.1 * 0.2 + 0.2 * 0.3 + (1 - 0.6) * 0.5)
        let confidence = analyzer.confidence(&profile(0.1, 0.6, 0.2));
        assert!((confidence - 0.72).abs() < 1e-6);
        assert_eq!(analyzer.confidence(&profile(0.0, 1.0, 0.0)), 1.0);
    }

    #[test]
    fn test_confidence_is_not_clamped() {
        let analyzer = FrameAffectAnalyzer::default();
        let confidence = analyzer.confidence(&profile(3.0, 0.0, 2.0));
        assert!(confidence < 0.0);
    }

    #[test]
    fn test_nervousness_formula_and_floor() {
        let analyzer = FrameAffectAnalyzer::default();
        // 0.2 * 0.3 + 0.2 * 0.3 + (1 - 0.5) * 0.4
        let nervousness = analyzer.nervousness(&profile(0.2, 0.5, 0.2));
        assert!((nervousness - 0.32).abs() < 1e-6);
        assert_eq!(analyzer.nervousness(&profile(0.0, 1.0, 0.0)), 0.2);
    }

    #[test]
    fn test_analyze_degenerate_face() {
        let analyzer = FrameAffectAnalyzer::new(FaceHelper::default(), Default::default());
        let set = LandmarkSet::new(Array2::from_elem((FACE_MESH_POINTS, 3), 0.5)).unwrap();
        let affect = analyzer.analyze(&set).unwrap();

        // every ratio is zero and no gaze direction can be measured
        assert_eq!(affect.eye_contact, 0.3);
        assert!((affect.confidence - 0.5).abs() < 1e-6);
        assert!((affect.nervousness - 0.4).abs() < 1e-6);
        assert!(affect.blinking);
    }

    #[test]
    fn test_analyze_incomplete_mesh() {
        let analyzer = FrameAffectAnalyzer::default();
        let set = LandmarkSet::new(Array2::zeros((68, 3))).unwrap();
        assert!(matches!(analyzer.analyze(&set), Err(Error::Landmark(_))));
    }
}
