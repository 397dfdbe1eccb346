use std::future::Future;
use std::path::{Path, PathBuf};
use anyhow::Error;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_GRADER_FEEDBACK: &str = "No feedback provided.";

const MIN_ANSWER_SCORE: f32 = 0.0;
const MAX_ANSWER_SCORE: f32 = 10.0;

/// Content assessment of the transcribed answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerAssessment {
    pub score: f32,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl AnswerAssessment {
    /// unanswered is the assessment used when the grader reply carries nothing usable.
    pub fn unanswered() -> Self {
        AnswerAssessment {
            score: 0.0,
            feedback: DEFAULT_GRADER_FEEDBACK.to_string(),
            transcript: None,
        }
    }
}

/// AnswerGrader scores what the candidate said. Speech recognition and the
/// grading model live behind this trait.
pub trait AnswerGrader {
    fn grade(&self, media: &Path, question: &str) -> impl Future<Output = Result<AnswerAssessment, Error>> + Send;
}

/// parse_grader_reply extracts the assessment from a free-text grader reply.
///
/// The JSON object spanning the first `{` to the last `}` is read. `score` may be a
/// number or a numeric string and is clamped to `[0, 10]`. Replies that cannot be
/// read yield a zero score with the default feedback.
///
/// # Arguments
/// * `reply` - raw text returned by the grading model
///
/// # Returns
/// * `AnswerAssessment`
pub fn parse_grader_reply(reply: &str) -> AnswerAssessment {
    match try_parse_grader_reply(reply) {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!("answer_grader - cannot parse grader reply, using defaults: {e}");
            AnswerAssessment::unanswered()
        }
    }
}

fn try_parse_grader_reply(reply: &str) -> Result<AnswerAssessment, Error> {
    let (start, end) = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(Error::msg("reply contains no JSON object"))
    };
    let parsed: Value = serde_json::from_str(&reply[start..=end])?;

    let score = match parsed.get("score") {
        None => MIN_ANSWER_SCORE,
        Some(Value::Number(number)) => match number.as_f64() {
            None => return Err(Error::msg("score is not a finite number")),
            Some(score) => score as f32
        },
        Some(Value::String(text)) => text.trim().parse::<f32>()?,
        Some(other) => return Err(Error::msg(format!("unexpected score value {other}")))
    };
    if !score.is_finite() {
        return Err(Error::msg("score is not a finite number"))
    }

    let feedback = match parsed.get("feedback") {
        Some(Value::String(text)) => text.clone(),
        _ => DEFAULT_GRADER_FEEDBACK.to_string()
    };

    Ok(AnswerAssessment {
        score: score.clamp(MIN_ANSWER_SCORE, MAX_ANSWER_SCORE),
        feedback,
        transcript: None,
    })
}

/// ReplyFileGrader reads a grader reply that was produced ahead of time.
#[derive(Debug, Clone)]
pub struct ReplyFileGrader {
    path: PathBuf,
}

impl ReplyFileGrader {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ReplyFileGrader { path: path.into() }
    }
}

impl AnswerGrader for ReplyFileGrader {
    fn grade(&self, _media: &Path, _question: &str) -> impl Future<Output = Result<AnswerAssessment, Error>> + Send {
        let path = self.path.clone();
        async move {
            let reply = tokio::fs::read_to_string(&path).await?;
            Ok::<AnswerAssessment, Error>(parse_grader_reply(&reply))
        }
    }
}
