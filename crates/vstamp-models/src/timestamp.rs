//! Timestamp overlay settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::text::{FontSettings, PositionSettings};

/// Default date/time pattern.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Running date/time clock burned into the video.
///
/// `format` uses the familiar custom date/time pattern letters
/// (`yyyy`, `MM`, `dd`, `HH`, `hh`, `mm`, `ss`, `tt`, ...). Line breaks in the
/// pattern produce one line of text each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TimestampSettings {
    /// Whether the timestamp is drawn at all
    pub enabled: bool,

    /// Start the clock at the file's recorded creation time
    pub use_metadata_creation_time: bool,

    /// Seconds added to the clock's base instant (or to the Unix epoch
    /// when no creation time is used)
    pub time_offset: Option<i64>,

    /// Date/time pattern
    pub format: String,

    /// Font settings
    pub font: FontSettings,

    /// Placement settings
    pub position: PositionSettings,

    /// Second at which the timestamp appears
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    /// Second at which the timestamp disappears
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl Default for TimestampSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            use_metadata_creation_time: true,
            time_offset: None,
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            font: FontSettings::default(),
            position: PositionSettings::default(),
            start: None,
            end: None,
        }
    }
}

impl TimestampSettings {
    /// Timestamp that is not drawn.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Validate timestamp settings.
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if self.format.trim().is_empty() {
            return Err("Timestamp format cannot be empty".to_string());
        }
        self.font.validate()?;
        self.position.validate()
    }
}
