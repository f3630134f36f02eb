use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipQaError {
    #[error("Clip extraction failed for {video_path}: {reason}")]
    ClipExtractionFailed { video_path: PathBuf, reason: String },

    #[error("Probe failed for {media_path}: {reason}")]
    ProbeFailed { media_path: PathBuf, reason: String },

    #[error("Frame sampling failed for {clip_path}: {reason}")]
    FrameSamplingFailed { clip_path: PathBuf, reason: String },

    #[error("Answer generation failed: {reason}")]
    AnswerFailed { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },
}

pub type Result<T> = std::result::Result<T, ClipQaError>;
