pub mod answer_grader;
pub mod landmark_provider;
#[cfg(feature = "opencv")]
pub mod video_source;
