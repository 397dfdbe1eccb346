use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use crate::config::config::{PipelineConfig, ScoringConfig, SessionConfig};
use crate::error::{Error, Result};
use crate::helper::face_helper::FaceHelper;
use crate::modules::landmark_provider::{FrameSource, LandmarkProvider};
use crate::pipeline::affect::{FrameAffect, FrameAffectAnalyzer};
use crate::pipeline::aggregate::{AggregateMetrics, TemporalAggregator};
use crate::pipeline::scoring::{CompositeScorer, FeedbackGenerator, NO_FACE_FEEDBACK};
use crate::utils::utils::round_to;

/// Frame counters of one analysis run. They do not influence the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub decoded_frames: usize,
    pub sampled_frames: usize,
    pub analyzed_frames: usize,
    pub blink_frames: usize,
}

/// Body-language assessment of one video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoResult {
    pub score: f32,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<AggregateMetrics>,
    #[serde(skip)]
    pub stats: FrameStats,
}

impl VideoResult {
    /// no_face is the result of a video in which no sampled frame showed a face.
    pub fn no_face(stats: FrameStats) -> Self {
        VideoResult {
            score: 0.0,
            feedback: NO_FACE_FEEDBACK.to_string(),
            metrics: None,
            stats,
        }
    }
}

/// InterviewPipeline scores the body language of a candidate from video frames.
#[derive(Debug)]
pub struct InterviewPipeline<P: LandmarkProvider> {
    provider: P,
    analyzer: FrameAffectAnalyzer,
    scoring: ScoringConfig,
    scorer: CompositeScorer,
    feedback: FeedbackGenerator,
    frame_stride: usize,
    score_decimals: u32,
}

impl<P: LandmarkProvider> InterviewPipeline<P> {

    /// new initializes a pipeline around an already constructed landmark provider.
    ///
    /// # Arguments
    /// * `provider` - the landmark detector
    /// * `scoring` - ScoringConfig
    /// * `session` - &SessionConfig, for the frame stride and score rounding
    ///
    /// # Returns
    /// * `InterviewPipeline<P>`
    pub fn new(provider: P, scoring: ScoringConfig, session: &SessionConfig) -> Self {
        InterviewPipeline {
            provider,
            analyzer: FrameAffectAnalyzer::new(FaceHelper::new(None), scoring.affect.clone()),
            scorer: CompositeScorer::new(scoring.composite.clone()),
            feedback: FeedbackGenerator::new(scoring.feedback.clone()),
            scoring,
            frame_stride: session.frame_stride.max(1),
            score_decimals: session.video_score_decimals,
        }
    }

    pub fn from_config(provider: P, config: &PipelineConfig) -> Self {
        Self::new(provider, config.scoring.clone(), &config.session)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn frame_stride(&self) -> usize {
        self.frame_stride
    }

    /// analyze_frame runs landmark detection and affect analysis on a single frame.
    /// Returns None when the provider finds no face.
    pub fn analyze_frame(&self, frame: &P::Frame) -> Result<Option<FrameAffect>> {
        let landmarks = match self.provider.detect(frame) {
            Err(e) => return Err(Error::Landmark(format!("{e:#}"))),
            Ok(None) => return Ok(None),
            Ok(Some(landmarks)) => landmarks
        };
        Ok(Some(self.analyzer.analyze(&landmarks)?))
    }

    /// analyze_video decodes the whole source and scores every `frame_stride`-th frame.
    ///
    /// Frames without a face are left out of every aggregate. A video in which no
    /// sampled frame has a face yields the no-face result. Any decoding, landmark or
    /// aggregation failure aborts the analysis.
    ///
    /// # Arguments
    /// * `source` - FrameSource yielding the frames the provider understands
    ///
    /// # Returns
    /// * `Result<VideoResult>`
    pub fn analyze_video<S>(&self, mut source: S) -> Result<VideoResult>
    where
        S: FrameSource<Frame = P::Frame>,
    {
        info!("analyzing video, sampling every {} frame(s)", self.frame_stride);
        let mut stats = FrameStats::default();
        let mut aggregator = TemporalAggregator::new(self.scoring.window.clone());

        loop {
            let frame = match source.next_frame() {
                Err(e) => return Err(Error::Decode(format!("{e:#}"))),
                Ok(None) => break,
                Ok(Some(frame)) => frame
            };
            let index = stats.decoded_frames;
            stats.decoded_frames += 1;
            if index % self.frame_stride != 0 {
                continue
            }
            stats.sampled_frames += 1;

            match self.analyze_frame(&frame)? {
                None => debug!("frame {index}: no face"),
                Some(affect) => {
                    stats.analyzed_frames += 1;
                    if affect.blinking {
                        stats.blink_frames += 1;
                    }
                    aggregator.push(&affect);
                }
            }
        }

        if aggregator.is_empty() {
            warn!(
                "no face detected in {} sampled frame(s) of {}",
                stats.sampled_frames, stats.decoded_frames
            );
            return Ok(VideoResult::no_face(stats))
        }

        let metrics = match aggregator.finish() {
            None => return Err(Error::Aggregation("no frame affect to aggregate".to_string())),
            Some(metrics) => metrics
        };
        if !(metrics.confidence.is_finite() && metrics.nervousness.is_finite() && metrics.eye_contact.is_finite()) {
            return Err(Error::Aggregation(format!("non-finite video metrics {metrics:?}")))
        }

        let score = round_to(self.scorer.score(&metrics), self.score_decimals);
        let feedback = self.feedback.generate(&metrics);
        info!(
            "video analyzed: {} decoded, {} sampled, {} with a face, {} blinking, score {score}",
            stats.decoded_frames, stats.sampled_frames, stats.analyzed_frames, stats.blink_frames
        );

        Ok(VideoResult {
            score,
            feedback,
            metrics: Some(metrics),
            stats,
        })
    }
}
