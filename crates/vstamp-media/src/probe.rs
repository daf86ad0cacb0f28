//! FFprobe video metadata.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use vstamp_models::VideoMetadata;

use crate::error::{MediaError, MediaResult};

/// Tag carrying the zoned recording time written by Apple devices.
const APPLE_CREATION_DATE_TAG: &str = "com.apple.quicktime.creationdate";
/// Generic container creation time tag.
const CREATION_TIME_TAG: &str = "creation_time";

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    #[serde(default)]
    tags: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
    #[serde(default)]
    tags: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<Value>,
}

/// Probe a video file for the metadata text layout needs.
pub async fn probe_video(ffprobe: &Path, path: impl AsRef<Path>) -> MediaResult<VideoMetadata> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    debug!(file = %path.display(), "Running ffprobe");

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            format!("FFprobe exited with {}", output.status),
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    let meta = parse_probe_output(&output.stdout)?;
    debug!(
        file = %path.display(),
        width = meta.width,
        height = meta.height,
        duration = meta.duration_seconds,
        creation_time = ?meta.creation_time_raw,
        "Probed video"
    );
    Ok(meta)
}

/// Extract [`VideoMetadata`] from FFprobe's JSON output.
///
/// Dimensions are swapped for 90° and 270° rotations so they describe the
/// frame as displayed.
pub fn parse_probe_output(json: &[u8]) -> MediaResult<VideoMetadata> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let creation_time_raw = [APPLE_CREATION_DATE_TAG, CREATION_TIME_TAG]
        .iter()
        .find_map(|tag| probe.format.tags.get(*tag).and_then(Value::as_str))
        .map(str::to_string);

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaError::invalid_video("No video stream found"))?;

    // Stream duration wins over the container's
    let duration_seconds = video_stream
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            probe
                .format
                .duration
                .as_deref()
                .and_then(|d| d.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    let mut width = video_stream.width.unwrap_or(0);
    let mut height = video_stream.height.unwrap_or(0);

    if let Some(rotation) = stream_rotation(video_stream) {
        if matches!(rotation.abs(), 90 | 270) {
            debug!(rotation, width, height, "Rotated video, swapping width and height");
            std::mem::swap(&mut width, &mut height);
        }
    }

    Ok(VideoMetadata {
        width,
        height,
        duration_seconds,
        creation_time_raw,
    })
}

/// Rotation from the display matrix side data, else the legacy tags.
fn stream_rotation(stream: &FfprobeStream) -> Option<i64> {
    stream
        .side_data_list
        .iter()
        .find_map(|side| side.rotation.as_ref().and_then(parse_rotation))
        .or_else(|| match stream.tags.get("rotate") {
            Some(value) => parse_rotation(value),
            None => stream.tags.get("rotation").and_then(parse_rotation),
        })
}

/// Rotation given as a number or a numeric string.
fn parse_rotation(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
