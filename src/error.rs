//! Error types for the interview pipeline

use thiserror::Error;

/// Main error type for the interview pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("video decoding error: {0}")]
    Decode(String),

    #[error("landmark extraction error: {0}")]
    Landmark(String),

    #[error("aggregation error: {0}")]
    Aggregation(String),

    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    #[error("answer grading error: {0}")]
    Grader(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// is_processing_failure reports whether the error aborted the video analysis itself.
    pub fn is_processing_failure(&self) -> bool {
        matches!(
            self,
            Error::Decode(_) | Error::Landmark(_) | Error::Aggregation(_)
        )
    }
}

/// Result type for interview pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Error::Landmark(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_processing_failures_are_distinguishable() {
        assert!(Error::Decode("eof".into()).is_processing_failure());
        assert!(Error::Landmark("mesh".into()).is_processing_failure());
        assert!(Error::Aggregation("nan".into()).is_processing_failure());
        assert!(!Error::Grader("timeout".into()).is_processing_failure());
        assert!(!Error::UnsupportedMedia("a.gif".into()).is_processing_failure());
    }
}
