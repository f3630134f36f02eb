use clipqa_core::{load_answers, load_references, save_report, score_answers};
use tempfile::TempDir;

const ANSWERS: &str = r#"[
  {
    "query": "where did I leave the cup",
    "video_uid": "video-1",
    "clip_path": "clips/video-1_clip_00.mp4",
    "pred": [12.0, 18.0],
    "answer": "On the kitchen table."
  },
  {
    "query": "who opened the door",
    "video_uid": "video-1",
    "clip_path": "clips/video-1_clip_01.mp4",
    "pred": [35.0, 45.0],
    "answer": ""
  }
]"#;

const REFERENCES: &str = r#"[
  { "query": "where did I leave the cup", "answer": "On the kitchen table." },
  { "query": "who opened the door", "answer": "The man in the red shirt." },
  { "query": "what tool did I use", "answer": "A screwdriver." }
]"#;

#[tokio::test]
async fn scores_matched_pairs_and_reports_unmatched() {
    let dir = TempDir::new().unwrap();
    let answers_path = dir.path().join("answers.json");
    let gt_path = dir.path().join("references.json");
    std::fs::write(&answers_path, ANSWERS).unwrap();
    std::fs::write(&gt_path, REFERENCES).unwrap();

    let answers = load_answers(&answers_path).await.unwrap();
    let references = load_references(&gt_path).await.unwrap();
    let (report, unmatched) = score_answers(&answers, &references);

    assert_eq!(report.results.len(), 2);
    assert_eq!(unmatched, vec!["what tool did I use".to_string()]);

    // The verbatim answer scores perfectly, the empty one scores zero.
    let perfect = &report.results[0];
    assert!((perfect.bleu - 1.0).abs() < 1e-12);
    assert!((perfect.rouge_l - 1.0).abs() < 1e-12);
    let empty = &report.results[1];
    assert_eq!(empty.bleu, 0.0);
    assert_eq!(empty.rouge_l, 0.0);
    assert_eq!(empty.meteor, 0.0);

    // Averages are plain arithmetic means over the matched set.
    let mean_bleu = (perfect.bleu + empty.bleu) / 2.0;
    assert!((report.averages.bleu - mean_bleu).abs() < 1e-12);

    let report_path = dir.path().join("out").join("scores.json");
    save_report(&report, &report_path).await.unwrap();
    let raw = std::fs::read_to_string(&report_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["results"].as_array().unwrap().len(), 2);
    assert!(value["averages"]["rouge_l"].is_number());
    assert!(value["averages"]["meteor"].is_number());
}
