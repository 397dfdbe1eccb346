pub mod config;
pub mod error;
pub mod helper;
pub mod modules;
pub mod pipeline;
pub mod utils;

pub use error::{Error, Result};
pub use pipeline::pipeline::{InterviewPipeline, VideoResult};
pub use pipeline::session::{FinalResult, InterviewSession, UploadGuard};
