//! Probed video metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Facts about a source video that text layout depends on.
///
/// Width and height are the displayed dimensions: a 90° or 270° rotation
/// has already been applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Displayed width in pixels
    pub width: u32,
    /// Displayed height in pixels
    pub height: u32,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Creation time exactly as recorded in the container tags
    pub creation_time_raw: Option<String>,
}

impl VideoMetadata {
    /// Metadata for a frame size with no duration or creation time.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the raw creation time.
    pub fn with_creation_time(mut self, raw: impl Into<String>) -> Self {
        self.creation_time_raw = Some(raw.into());
        self
    }

    /// Duration in whole milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.duration_seconds * 1000.0).round() as i64
    }
}
