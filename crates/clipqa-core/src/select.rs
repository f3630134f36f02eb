use std::collections::HashMap;
use std::path::Path;

use tokio::fs;

use crate::error::Result;
use crate::types::{AnnotationFile, PredictionFile, Segment, SelectedQuery};

/// Default number of candidates kept for the downstream stages.
pub const DEFAULT_TOP_K: usize = 50;

/// Intersection-over-Union of two temporal segments.
///
/// Returns 0 when the union is non-positive (degenerate or reversed segments).
pub fn temporal_iou(a: Segment, b: Segment) -> f64 {
    let intersection = (a.end.min(b.end) - a.start.max(b.start)).max(0.0);
    let union = a.end.max(b.end) - a.start.min(b.start);
    if union > 0.0 { intersection / union } else { 0.0 }
}

/// Join predictions to ground-truth queries and keep the top `k` by IoU.
///
/// Predictions are keyed by (clip_uid, annotation_uid, query_idx). Queries
/// with no matching prediction, no text, or no gold boundaries are skipped.
pub fn select_topk(
    predictions: &PredictionFile,
    annotations: &AnnotationFile,
    k: usize,
) -> Vec<SelectedQuery> {
    let mut pred_map: HashMap<(&str, Option<&str>, usize), Segment> = HashMap::new();
    for record in &predictions.results {
        if let Some(&best) = record.predicted_times.first() {
            let key = (record.clip_uid.as_str(), record.annotation_uid.as_deref(), record.query_idx);
            pred_map.insert(key, best);
        }
    }

    let mut candidates = Vec::new();
    for video in &annotations.videos {
        for clip in &video.clips {
            for annotation in &clip.annotations {
                for (query_idx, language_query) in annotation.language_queries.iter().enumerate() {
                    let (Some(query), Some(start), Some(end)) = (
                        &language_query.query,
                        language_query.video_start_sec,
                        language_query.video_end_sec,
                    ) else {
                        continue;
                    };

                    let key = (
                        clip.clip_uid.as_str(),
                        Some(annotation.annotation_uid.as_str()),
                        query_idx,
                    );
                    let Some(&pred) = pred_map.get(&key) else {
                        continue;
                    };

                    let gt = Segment::new(start, end);
                    candidates.push(SelectedQuery {
                        query: query.clone(),
                        query_idx,
                        video_uid: video.video_uid.clone(),
                        clip_uid: clip.clip_uid.clone(),
                        annotation_uid: annotation.annotation_uid.clone(),
                        pred,
                        iou: temporal_iou(pred, gt),
                        answer: String::new(),
                    });
                }
            }
        }
    }

    // Stable sort keeps the annotation walk order for equal scores.
    candidates.sort_by(|a, b| b.iou.total_cmp(&a.iou));
    candidates.truncate(k);
    candidates
}

pub async fn load_predictions(path: &Path) -> Result<PredictionFile> {
    let json_content = fs::read_to_string(path).await?;
    let predictions: PredictionFile = serde_json::from_str(&json_content)?;
    Ok(predictions)
}

pub async fn load_annotations(path: &Path) -> Result<AnnotationFile> {
    let json_content = fs::read_to_string(path).await?;
    let annotations: AnnotationFile = serde_json::from_str(&json_content)?;
    Ok(annotations)
}

/// Save selected queries, creating the parent directory if needed.
pub async fn save_selected(selected: &[SelectedQuery], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let pretty_json = serde_json::to_string_pretty(selected)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

pub async fn load_selected(path: &Path) -> Result<Vec<SelectedQuery>> {
    let json_content = fs::read_to_string(path).await?;
    let selected: Vec<SelectedQuery> = serde_json::from_str(&json_content)?;
    Ok(selected)
}
