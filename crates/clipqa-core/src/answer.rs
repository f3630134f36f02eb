use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::fs;

use crate::error::{ClipQaError, Result};
use crate::frames::{FRAME_COUNT, sample_frames};
use crate::provider::Provider;
use crate::types::ClipAnswer;

/// Marker separating the prompt template from the generated answer.
const ANSWER_MARKER: &str = "ASSISTANT:";

/// Completion budget per answer.
const MAX_ANSWER_TOKENS: u32 = 90;

/// Multimodal model client, built once per run and reused across clips.
pub struct AnswerModel {
    provider: Provider,
    api_key: String,
    client: reqwest::Client,
}

impl AnswerModel {
    pub fn new(provider: Provider) -> Result<Self> {
        let api_key = provider.validate_api_key()?;
        Ok(Self {
            provider,
            api_key,
            client: reqwest::Client::new(),
        })
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Answer a natural-language query by showing the model evenly spaced
    /// frames of the clip together with the templated prompt.
    pub async fn answer_query(&self, clip_path: &Path, query: &str) -> Result<String> {
        let frames = sample_frames(clip_path, FRAME_COUNT).await?;
        let config = self.provider.config();

        let mut content: Vec<serde_json::Value> = frames
            .iter()
            .map(|jpeg| {
                serde_json::json!({
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg)),
                    },
                })
            })
            .collect();
        content.push(serde_json::json!({
            "type": "text",
            "text": format!("USER: <video>{query} ASSISTANT:"),
        }));

        let response = self
            .client
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": config.model,
                "messages": [
                    {
                        "role": "user",
                        "content": content,
                    },
                ],
                "max_tokens": MAX_ANSWER_TOKENS,
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let full_answer = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ClipQaError::AnswerFailed {
                reason: format!("Invalid API response: {:?}", response),
            })?;

        Ok(clean_answer(extract_answer(full_answer)))
    }
}

/// Text after the final marker. Models that echo the prompt template keep the
/// template on the left of it; others return the bare answer.
fn extract_answer(reply: &str) -> &str {
    match reply.rfind(ANSWER_MARKER) {
        Some(pos) => &reply[pos + ANSWER_MARKER.len()..],
        None => reply,
    }
}

/// Strip recurring generation artifacts: stray `Ъ`, embedded newlines,
/// stacked terminal periods, and a dangling `c` after a period or space.
pub fn clean_answer(answer: &str) -> String {
    let mut answer = answer.replace('Ъ', "").replace('\n', " ");

    while answer.ends_with("..") {
        answer.pop();
    }

    if answer.ends_with('c') {
        if let Some('.') | Some(' ') = answer.chars().rev().nth(1) {
            answer.pop();
        }
    }

    answer.trim().to_string()
}

/// Save answers, creating the parent directory if needed.
pub async fn save_answers(answers: &[ClipAnswer], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let pretty_json = serde_json::to_string_pretty(answers)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

pub async fn load_answers(path: &Path) -> Result<Vec<ClipAnswer>> {
    let json_content = fs::read_to_string(path).await?;
    let answers: Vec<ClipAnswer> = serde_json::from_str(&json_content)?;
    Ok(answers)
}
