use std::collections::HashMap;
use std::path::Path;

use tokio::fs;

use crate::error::Result;
use crate::metrics::{bleu, meteor, rouge_l, tokenize};
use crate::types::{ClipAnswer, MetricAverages, QueryScore, ReferenceAnswer, ScoreReport};

/// Canonical form used to join generated answers to references.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_string()
}

/// Score one generated answer against its reference: (BLEU, ROUGE-L, METEOR).
pub fn score_pair(answer: &str, reference: &str) -> (f64, f64, f64) {
    let candidate = tokenize(answer);
    let reference = tokenize(reference);
    (
        bleu(&candidate, &reference),
        rouge_l(&candidate, &reference),
        meteor(&candidate, &reference),
    )
}

/// Join answers to references by normalized query text and score each pair.
///
/// Returns the report and the reference queries that had no generated answer;
/// those are skipped, not failed.
pub fn score_answers(
    answers: &[ClipAnswer],
    references: &[ReferenceAnswer],
) -> (ScoreReport, Vec<String>) {
    let by_query: HashMap<String, &ClipAnswer> = answers
        .iter()
        .map(|answer| (normalize_query(&answer.query), answer))
        .collect();

    let mut results = Vec::new();
    let mut unmatched = Vec::new();

    for reference in references {
        let query = normalize_query(&reference.query);
        let Some(answer) = by_query.get(&query) else {
            unmatched.push(query);
            continue;
        };

        let generated = answer.answer.trim().to_string();
        let gt_answer = reference.answer.trim().to_string();
        let (bleu, rouge_l, meteor) = score_pair(&generated, &gt_answer);
        results.push(QueryScore {
            query,
            answer: generated,
            gt_answer,
            clip_path: answer.clip_path.clone(),
            bleu,
            rouge_l,
            meteor,
        });
    }

    let averages = average_scores(&results);
    (ScoreReport { results, averages }, unmatched)
}

/// Arithmetic mean of every metric over the matched set; zeros when empty.
pub fn average_scores(results: &[QueryScore]) -> MetricAverages {
    if results.is_empty() {
        return MetricAverages::default();
    }
    let n = results.len() as f64;
    MetricAverages {
        bleu: results.iter().map(|r| r.bleu).sum::<f64>() / n,
        rouge_l: results.iter().map(|r| r.rouge_l).sum::<f64>() / n,
        meteor: results.iter().map(|r| r.meteor).sum::<f64>() / n,
    }
}

pub async fn load_references(path: &Path) -> Result<Vec<ReferenceAnswer>> {
    let json_content = fs::read_to_string(path).await?;
    let references: Vec<ReferenceAnswer> = serde_json::from_str(&json_content)?;
    Ok(references)
}

/// Save a score report, creating the parent directory if needed.
pub async fn save_report(report: &ScoreReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let pretty_json = serde_json::to_string_pretty(report)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Segment;
    use std::path::PathBuf;

    fn answer(query: &str, text: &str) -> ClipAnswer {
        ClipAnswer {
            query: query.to_string(),
            video_uid: "video-1".to_string(),
            clip_path: PathBuf::from("clips/video-1_clip_00.mp4"),
            pred: Segment::new(0.0, 10.0),
            answer: text.to_string(),
        }
    }

    fn reference(query: &str, text: &str) -> ReferenceAnswer {
        ReferenceAnswer {
            query: query.to_string(),
            answer: text.to_string(),
        }
    }

    #[test]
    fn perfect_answers_score_high_everywhere() {
        let answers = [answer("where is the cup", "on the kitchen table near the sink")];
        let references = [reference("where is the cup", "on the kitchen table near the sink")];
        let (report, unmatched) = score_answers(&answers, &references);

        assert!(unmatched.is_empty());
        assert_eq!(report.results.len(), 1);
        let score = &report.results[0];
        assert!((score.bleu - 1.0).abs() < 1e-12);
        assert!((score.rouge_l - 1.0).abs() < 1e-12);
        assert!(score.meteor > 0.99);
    }

    #[test]
    fn queries_join_on_trimmed_text() {
        let answers = [answer("  where is the cup ", "on the table")];
        let references = [reference("where is the cup", "on the table")];
        let (report, unmatched) = score_answers(&answers, &references);
        assert!(unmatched.is_empty());
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn unmatched_references_are_reported_and_skipped() {
        let answers = [answer("where is the cup", "on the table")];
        let references = [
            reference("where is the cup", "on the table"),
            reference("who closed the door", "the man in the red shirt"),
        ];
        let (report, unmatched) = score_answers(&answers, &references);
        assert_eq!(report.results.len(), 1);
        assert_eq!(unmatched, vec!["who closed the door".to_string()]);
    }

    #[test]
    fn averages_equal_the_arithmetic_mean() {
        let answers = [
            answer("query one", "the cup is on the table"),
            answer("query two", "something else entirely different"),
        ];
        let references = [
            reference("query one", "the cup is on the table"),
            reference("query two", "a plate rests near a stove"),
        ];
        let (report, _) = score_answers(&answers, &references);

        assert_eq!(report.results.len(), 2);
        let mean_bleu = (report.results[0].bleu + report.results[1].bleu) / 2.0;
        let mean_rouge = (report.results[0].rouge_l + report.results[1].rouge_l) / 2.0;
        let mean_meteor = (report.results[0].meteor + report.results[1].meteor) / 2.0;
        assert!((report.averages.bleu - mean_bleu).abs() < 1e-12);
        assert!((report.averages.rouge_l - mean_rouge).abs() < 1e-12);
        assert!((report.averages.meteor - mean_meteor).abs() < 1e-12);
    }

    #[test]
    fn empty_matched_set_averages_to_zero() {
        let (report, unmatched) = score_answers(&[], &[reference("q", "a")]);
        assert!(report.results.is_empty());
        assert_eq!(unmatched.len(), 1);
        assert_eq!(report.averages, MetricAverages::default());
    }
}
