//! rs-interview-pipeline CLI
//!
//! Scores recorded interview answers from landmark tracks and grader replies.

use std::path::{Path, PathBuf};
use anyhow::Error;
use clap::{Parser, Subcommand};
use log::info;
use rs_interview_pipeline::config::config::PipelineConfig;
use rs_interview_pipeline::modules::answer_grader::ReplyFileGrader;
use rs_interview_pipeline::modules::landmark_provider::{LandmarkTrack, RecordedLandmarks};
use rs_interview_pipeline::{InterviewPipeline, InterviewSession};

#[derive(Parser)]
#[command(
    name = "rs-interview-pipeline",
    about = "Body-language and answer scoring for recorded interview answers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the body language of a recorded landmark track
    Analyze {
        /// Landmark track JSON file
        #[arg(short, long)]
        landmarks: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Combine the body-language score with a grader reply
    Evaluate {
        /// Landmark track JSON file
        #[arg(short, long)]
        landmarks: PathBuf,

        /// File holding the grader's reply
        #[arg(short, long)]
        reply: PathBuf,

        /// Interview question the answer responds to
        #[arg(short, long)]
        question: String,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate the default configuration file
    InitConfig {
        /// Output path for config file
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, Error> {
    match path {
        None => Ok(PipelineConfig::default()),
        Some(path) => {
            info!("loading configuration from {}", path.display());
            Ok(PipelineConfig::load(path)?)
        }
    }
}

fn build_pipeline(config: &PipelineConfig) -> InterviewPipeline<RecordedLandmarks> {
    InterviewPipeline::from_config(RecordedLandmarks::new(config.detector.clone()), config)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { landmarks, config } => {
            let config = load_config(config.as_deref())?;
            let track = LandmarkTrack::from_file(&landmarks)?;
            let result = build_pipeline(&config).analyze_video(track)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Evaluate { landmarks, reply, question, config } => {
            let config = load_config(config.as_deref())?;
            let track = LandmarkTrack::from_file(&landmarks)?;
            let session = InterviewSession::new(build_pipeline(&config), config.session.clone());
            let grader = ReplyFileGrader::new(reply);
            let result = session.evaluate(&landmarks, track, &grader, &question).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::InitConfig { output } => {
            PipelineConfig::default().save(&output)?;
            info!("default configuration written to {}", output.display());
        }
    }

    Ok(())
}
