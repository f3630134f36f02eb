use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Temporal segment in seconds, serialized as a `[start, end]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl From<[f64; 2]> for Segment {
    fn from(pair: [f64; 2]) -> Self {
        Self { start: pair[0], end: pair[1] }
    }
}

impl From<Segment> for [f64; 2] {
    fn from(segment: Segment) -> Self {
        [segment.start, segment.end]
    }
}

/// Top-level prediction file: a flat list of predicted windows per query.
#[derive(Debug, Deserialize)]
pub struct PredictionFile {
    pub results: Vec<PredictionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionRecord {
    pub clip_uid: String,
    #[serde(default)]
    pub annotation_uid: Option<String>,
    pub query_idx: usize,
    /// Candidate windows, best first. Only the first one is evaluated.
    #[serde(default)]
    pub predicted_times: Vec<Segment>,
}

/// Ground-truth annotations, nested videos → clips → annotations → queries.
#[derive(Debug, Deserialize)]
pub struct AnnotationFile {
    pub videos: Vec<VideoAnnotations>,
}

#[derive(Debug, Deserialize)]
pub struct VideoAnnotations {
    pub video_uid: String,
    pub clips: Vec<ClipAnnotations>,
}

#[derive(Debug, Deserialize)]
pub struct ClipAnnotations {
    pub clip_uid: String,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
pub struct Annotation {
    pub annotation_uid: String,
    pub language_queries: Vec<LanguageQuery>,
}

/// One natural-language query with its gold window on the video timeline.
/// Any of the fields may be absent in the raw data.
#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub video_start_sec: Option<f64>,
    #[serde(default)]
    pub video_end_sec: Option<f64>,
}

/// A candidate kept by the selector. `answer` starts empty and is filled by
/// the answer stage, or by hand when building a reference file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedQuery {
    pub query: String,
    pub query_idx: usize,
    pub video_uid: String,
    pub clip_uid: String,
    pub annotation_uid: String,
    pub pred: Segment,
    pub iou: f64,
    #[serde(default)]
    pub answer: String,
}

/// A model-generated answer tied back to its clip file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipAnswer {
    pub query: String,
    pub video_uid: String,
    pub clip_path: PathBuf,
    pub pred: Segment,
    pub answer: String,
}

/// Ground-truth answer text for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceAnswer {
    pub query: String,
    pub answer: String,
}

/// Per-query metric scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryScore {
    pub query: String,
    pub answer: String,
    pub gt_answer: String,
    pub clip_path: PathBuf,
    pub bleu: f64,
    pub rouge_l: f64,
    pub meteor: f64,
}

/// Arithmetic means over the matched set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricAverages {
    pub bleu: f64,
    pub rouge_l: f64,
    pub meteor: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreReport {
    pub results: Vec<QueryScore>,
    pub averages: MetricAverages,
}
