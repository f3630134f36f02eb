use std::path::Path;

use tempfile::TempDir;
use tokio::{fs, process::Command};

use crate::error::{ClipQaError, Result};

/// Frames sampled per clip before prompting the model.
pub const FRAME_COUNT: usize = 8;

/// Duration of a media file in seconds, via ffprobe.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("csv=p=0")
        .arg(path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(ClipQaError::ProbeFailed {
            media_path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse::<f64>()
        .map_err(|e| ClipQaError::ProbeFailed {
            media_path: path.to_path_buf(),
            reason: format!("unparseable duration {:?}: {}", stdout.trim(), e),
        })
}

/// Sample `count` evenly spaced JPEG frames from a clip.
///
/// Frame `i` is grabbed at `duration * i / count`, an even stride with the
/// first frame at the start of the clip. Frames are decoded into a scratch
/// directory that is dropped on return.
pub async fn sample_frames(clip_path: &Path, count: usize) -> Result<Vec<Vec<u8>>> {
    let duration = probe_duration(clip_path).await?;
    let scratch = TempDir::new()?;
    let mut frames = Vec::with_capacity(count);

    for i in 0..count {
        let timestamp = duration * i as f64 / count as f64;
        let frame_path = scratch.path().join(format!("frame_{i:02}.jpg"));

        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg(timestamp.to_string())
            .arg("-i")
            .arg(clip_path)
            .arg("-frames:v")
            .arg("1")
            .arg("-q:v")
            .arg("2")
            .arg(&frame_path)
            .output()
            .await?;

        // ffmpeg exits 0 but writes nothing when seeking past the last frame.
        if !output.status.success() || !frame_path.exists() {
            return Err(ClipQaError::FrameSamplingFailed {
                clip_path: clip_path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        frames.push(fs::read(&frame_path).await?);
    }

    Ok(frames)
}
