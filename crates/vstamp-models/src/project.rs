//! Project document: inputs, output mode and tool locations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::subtitle::SubtitleSettings;
use crate::timestamp::TimestampSettings;

/// How stamped clips are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Each input becomes its own `<name>-stamped.<ext>` next to the input
    #[default]
    Separate,
    /// All stamped inputs are joined into one file named after the project
    #[serde(alias = "concatenate")]
    Concat,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Separate => write!(f, "separate"),
            OutputMode::Concat => write!(f, "concat"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "separate" => Ok(OutputMode::Separate),
            "concat" | "concatenate" => Ok(OutputMode::Concat),
            _ => Err(ModelParseError::OutputMode(s.to_string())),
        }
    }
}

/// Container/codec family of the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// H.264 MP4, taken directly from the stamping pass
    #[default]
    Mp4,
    /// VP9 WebM, downscaled preview quality
    Webm,
    /// Animated GIF
    Gif,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Webm => "webm",
            OutputFormat::Gif => "gif",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "mp4" => Ok(OutputFormat::Mp4),
            "webm" => Ok(OutputFormat::Webm),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(ModelParseError::OutputFormat(s.to_string())),
        }
    }
}

/// Error parsing a model value from a string.
#[derive(Debug, Error, PartialEq)]
pub enum ModelParseError {
    #[error("Unknown output mode: {0}")]
    OutputMode(String),

    #[error("Unsupported output format: {0}")]
    OutputFormat(String),
}

/// Output settings for the whole project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputSettings {
    /// Delivery mode
    pub mode: OutputMode,

    /// Final format
    pub format: OutputFormat,
}

/// Explicit locations of the FFmpeg tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolSettings {
    /// Path to the `ffmpeg` binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<String>,

    /// Path to the `ffprobe` binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffprobe_path: Option<String>,
}

/// One video to stamp and the text drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InputSettings {
    /// Path to the source video
    pub path: String,

    /// Push apart text that would otherwise be drawn on top of other text
    pub automatically_fix_overlapping_text: bool,

    /// Running clock overlay
    pub timestamp: TimestampSettings,

    /// Captions, drawn in order after the timestamp
    pub subtitles: Vec<SubtitleSettings>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            path: String::new(),
            automatically_fix_overlapping_text: true,
            timestamp: TimestampSettings::default(),
            subtitles: Vec::new(),
        }
    }
}

impl InputSettings {
    /// Create input settings for a video path with default overlays.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Validate input settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("Input path cannot be empty".to_string());
        }
        self.timestamp
            .validate()
            .map_err(|e| format!("{}: timestamp: {}", self.path, e))?;
        for (index, sub) in self.subtitles.iter().enumerate() {
            sub.validate()
                .map_err(|e| format!("{}: subtitle #{}: {}", self.path, index + 1, e))?;
        }
        Ok(())
    }
}

/// Top-level project document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSettings {
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tool locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolSettings>,

    /// Output settings
    pub output: OutputSettings,

    /// Videos to process, in order
    pub inputs: Vec<InputSettings>,
}

impl ProjectSettings {
    /// Parse a project document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate the whole project.
    pub fn validate(&self) -> Result<(), String> {
        if self.inputs.is_empty() {
            return Err("No inputs defined in project JSON.".to_string());
        }
        self.inputs.iter().try_for_each(InputSettings::validate)
    }
}
