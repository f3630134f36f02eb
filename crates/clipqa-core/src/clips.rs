use std::path::Path;

use tokio::process::Command;

use crate::error::{ClipQaError, Result};
use crate::types::Segment;

/// File name of the clip cut for the candidate at position `idx` in the
/// selected list. The index keeps clips from the same video apart.
pub fn clip_filename(video_uid: &str, idx: usize) -> String {
    format!("{video_uid}_clip_{idx:02}.mp4")
}

/// Cut `segment` out of a source video using a lossless stream copy.
pub async fn extract_clip(video_path: &Path, clip_path: &Path, segment: Segment) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-ss")
        .arg(segment.start.to_string())
        .arg("-i")
        .arg(video_path)
        .arg("-t")
        .arg(segment.duration().to_string())
        .arg("-c")
        .arg("copy")
        .arg(clip_path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(ClipQaError::ClipExtractionFailed {
            video_path: video_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_filenames_are_zero_padded() {
        assert_eq!(clip_filename("abc", 3), "abc_clip_03.mp4");
        assert_eq!(clip_filename("abc", 42), "abc_clip_42.mp4");
        assert_eq!(clip_filename("abc", 100), "abc_clip_100.mp4");
    }
}
