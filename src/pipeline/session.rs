use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use crate::config::config::SessionConfig;
use crate::error::{Error, Result};
use crate::modules::answer_grader::AnswerGrader;
use crate::modules::landmark_provider::{FrameSource, LandmarkProvider};
use crate::pipeline::pipeline::InterviewPipeline;
use crate::utils::utils::round_to;

/// Combined assessment of one interview answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub question: String,
    pub final_score: f32,
    pub body_language: String,
    pub answer_quality: String,
}

/// UploadGuard owns an uploaded answer video and deletes it when dropped.
#[derive(Debug)]
pub struct UploadGuard {
    path: PathBuf,
}

impl UploadGuard {

    /// accept takes ownership of an upload whose extension is allowed.
    ///
    /// A rejected upload is left where it is.
    ///
    /// # Arguments
    /// * `path` - location of the uploaded file
    /// * `config` - &SessionConfig with the allowed extensions
    ///
    /// # Returns
    /// * `Result<UploadGuard>`
    pub fn accept<P: Into<PathBuf>>(path: P, config: &SessionConfig) -> Result<Self> {
        let path = path.into();
        let allowed = match path.extension().and_then(|extension| extension.to_str()) {
            None => false,
            Some(extension) => config
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(extension))
        };
        if !allowed {
            return Err(Error::UnsupportedMedia(format!(
                "{} is not one of {}",
                path.display(),
                config.allowed_extensions.join(", ")
            )))
        }
        Ok(UploadGuard { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("removed upload {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("session - failed to remove upload {}: {e}", self.path.display()),
        }
    }
}

/// InterviewSession combines the body-language score with the answer-quality score.
#[derive(Debug)]
pub struct InterviewSession<P: LandmarkProvider> {
    pipeline: InterviewPipeline<P>,
    config: SessionConfig,
}

impl<P: LandmarkProvider> InterviewSession<P> {
    pub fn new(pipeline: InterviewPipeline<P>, config: SessionConfig) -> Self {
        InterviewSession { pipeline, config }
    }

    pub fn pipeline(&self) -> &InterviewPipeline<P> {
        &self.pipeline
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// combine_scores returns `min(audio·w_a + video·w_v + bonus, ceiling)`,
    /// rounded to the final score decimals.
    pub fn combine_scores(&self, audio_score: f32, video_score: f32) -> f32 {
        let config = &self.config;
        let combined = audio_score * config.audio_weight + video_score * config.video_weight + config.bonus;
        round_to(combined.min(config.ceiling), config.final_score_decimals)
    }

    /// evaluate scores one answer: the video through the pipeline, the media through the grader.
    ///
    /// # Arguments
    /// * `media` - the answer recording handed to the grader
    /// * `source` - frames of the same recording
    /// * `grader` - answer-quality collaborator
    /// * `question` - the interview question
    ///
    /// # Returns
    /// * `Result<FinalResult>`
    pub async fn evaluate<S, G>(&self, media: &Path, source: S, grader: &G, question: &str) -> Result<FinalResult>
    where
        S: FrameSource<Frame = P::Frame>,
        G: AnswerGrader,
    {
        let video = self.pipeline.analyze_video(source)?;

        let answer = match grader.grade(media, question).await {
            Err(e) => return Err(Error::Grader(format!("{e:#}"))),
            Ok(answer) => answer
        };
        if !answer.score.is_finite() {
            return Err(Error::Grader(format!("answer score {} is not a number", answer.score)))
        }

        let final_score = self.combine_scores(answer.score, video.score);
        info!(
            "answer evaluated: audio score {}, video score {}, final score {final_score}",
            answer.score, video.score
        );

        Ok(FinalResult {
            question: question.to_string(),
            final_score,
            body_language: video.feedback,
            answer_quality: answer.feedback,
        })
    }

    /// evaluate_upload runs evaluate on an accepted upload. The upload is deleted
    /// once the evaluation ends, whatever its outcome.
    pub async fn evaluate_upload<S, G>(&self, upload: UploadGuard, source: S, grader: &G, question: &str) -> Result<FinalResult>
    where
        S: FrameSource<Frame = P::Frame>,
        G: AnswerGrader,
    {
        self.evaluate(upload.path(), source, grader, question).await
    }
}
