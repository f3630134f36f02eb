use clipqa_core::{load_annotations, load_predictions, load_selected, save_selected, select_topk};
use tempfile::TempDir;

const PREDICTIONS: &str = r#"{
  "results": [
    {
      "clip_uid": "clip-a",
      "annotation_uid": "ann-a",
      "query_idx": 0,
      "predicted_times": [[12.0, 18.0], [40.0, 44.0]]
    },
    {
      "clip_uid": "clip-b",
      "annotation_uid": "ann-b",
      "query_idx": 0,
      "predicted_times": [[35.0, 45.0]]
    },
    {
      "clip_uid": "clip-b",
      "annotation_uid": "ann-b",
      "query_idx": 1,
      "predicted_times": []
    }
  ]
}"#;

const ANNOTATIONS: &str = r#"{
  "videos": [
    {
      "video_uid": "video-1",
      "clips": [
        {
          "clip_uid": "clip-a",
          "annotations": [
            {
              "annotation_uid": "ann-a",
              "language_queries": [
                {
                  "query": "where did I leave the cup",
                  "video_start_sec": 12.0,
                  "video_end_sec": 18.0
                }
              ]
            }
          ]
        },
        {
          "clip_uid": "clip-b",
          "annotations": [
            {
              "annotation_uid": "ann-b",
              "language_queries": [
                {
                  "query": "who opened the door",
                  "video_start_sec": 30.0,
                  "video_end_sec": 40.0
                },
                {
                  "query": "what tool did I use",
                  "video_start_sec": 50.0,
                  "video_end_sec": 60.0
                }
              ]
            }
          ]
        }
      ]
    }
  ]
}"#;

#[tokio::test]
async fn selects_and_round_trips_top_candidates() {
    let dir = TempDir::new().unwrap();
    let pred_path = dir.path().join("predictions.json");
    let val_path = dir.path().join("annotations.json");
    std::fs::write(&pred_path, PREDICTIONS).unwrap();
    std::fs::write(&val_path, ANNOTATIONS).unwrap();

    let predictions = load_predictions(&pred_path).await.unwrap();
    let annotations = load_annotations(&val_path).await.unwrap();
    let selected = select_topk(&predictions, &annotations, 50);

    // clip-b query 1 has an empty prediction list and is dropped.
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0].clip_uid, "clip-a");
    assert_eq!(selected[0].iou, 1.0);
    assert!(selected[0].iou >= selected[1].iou);
    assert_eq!(selected[1].annotation_uid, "ann-b");

    let out_path = dir.path().join("out").join("selected.json");
    save_selected(&selected, &out_path).await.unwrap();
    let reloaded = load_selected(&out_path).await.unwrap();

    assert_eq!(reloaded.len(), selected.len());
    assert_eq!(reloaded[0].query, "where did I leave the cup");
    assert_eq!(reloaded[0].pred, selected[0].pred);
    assert!(reloaded.iter().all(|s| s.answer.is_empty()));
}

#[tokio::test]
async fn truncates_to_k() {
    let dir = TempDir::new().unwrap();
    let pred_path = dir.path().join("predictions.json");
    let val_path = dir.path().join("annotations.json");
    std::fs::write(&pred_path, PREDICTIONS).unwrap();
    std::fs::write(&val_path, ANNOTATIONS).unwrap();

    let predictions = load_predictions(&pred_path).await.unwrap();
    let annotations = load_annotations(&val_path).await.unwrap();
    let selected = select_topk(&predictions, &annotations, 1);

    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].clip_uid, "clip-a");
}
