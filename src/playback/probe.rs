//! FFmpeg tool discovery and duration probing

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Cached FFprobe availability check
static FFPROBE_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Cached FFmpeg availability check
static FFMPEG_AVAILABLE: OnceLock<bool> = OnceLock::new();

fn tool_responds(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Check if ffprobe is available (cached)
pub fn is_ffprobe_available() -> bool {
    *FFPROBE_AVAILABLE.get_or_init(|| tool_responds("ffprobe"))
}

/// Check if ffmpeg is available (cached)
pub fn is_ffmpeg_available() -> bool {
    *FFMPEG_AVAILABLE.get_or_init(|| tool_responds("ffmpeg"))
}

/// Duration of a video in milliseconds, `Ok(None)` if the container omits it
pub fn probe_duration_ms(path: &Path) -> Result<Option<u64>> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::PlaybackOpen {
            path: path.to_path_buf(),
            message: format!("Failed to execute ffprobe: {}", e),
        })?;

    if !output.status.success() {
        return Err(Error::PlaybackOpen {
            path: path.to_path_buf(),
            message: format!(
                "FFprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ),
        });
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    trace!(?path, "FFprobe output: {}", json_str);

    let json: serde_json::Value =
        serde_json::from_str(&json_str).map_err(|e| Error::PlaybackOpen {
            path: path.to_path_buf(),
            message: format!("Failed to parse FFprobe JSON: {}", e),
        })?;

    let duration = parse_duration_ms(&json);
    debug!(?path, ?duration, "Probed video duration");
    Ok(duration)
}

/// Duration from ffprobe JSON: container first, then the first stream that has one
pub fn parse_duration_ms(json: &serde_json::Value) -> Option<u64> {
    let seconds = |value: &serde_json::Value| -> Option<f64> {
        value
            .get("duration")
            .and_then(|d| d.as_str())
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
    };

    json.get("format")
        .and_then(seconds)
        .or_else(|| {
            json.get("streams")
                .and_then(|s| s.as_array())
                .and_then(|streams| streams.iter().find_map(seconds))
        })
        .map(|secs| (secs * 1000.0).round() as u64)
}
