//! Font and placement settings shared by timestamps and subtitles.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: u32 = 32;
/// Default text color.
pub const DEFAULT_FONT_COLOR: &str = "white";
/// Default outline color.
pub const DEFAULT_BORDER_COLOR: &str = "black";
/// Default outline width in pixels.
pub const DEFAULT_BORDER_WIDTH: u32 = 2;
/// Default anchor for new text.
pub const DEFAULT_ANCHOR: &str = "bottomRight";
/// Default edge padding, as a percentage of the frame dimension.
pub const DEFAULT_PAD_PERCENT: f64 = 5.0;

/// Font configuration for a block of text.
///
/// Colors accept anything FFmpeg's color syntax does (names like `white`
/// or hex values like `0xFF0000`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FontSettings {
    /// Path to the font file handed to `drawtext`
    pub font_file: String,

    /// Font size in points
    pub size: u32,

    /// Text color
    pub color: String,

    /// Outline color; the outline is drawn only when a width is also set
    pub border_color: Option<String>,

    /// Outline width in pixels
    pub border_width: Option<u32>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            font_file: String::new(),
            size: DEFAULT_FONT_SIZE,
            color: DEFAULT_FONT_COLOR.to_string(),
            border_color: Some(DEFAULT_BORDER_COLOR.to_string()),
            border_width: Some(DEFAULT_BORDER_WIDTH),
        }
    }
}

impl FontSettings {
    /// Create font settings for the given font file.
    pub fn new(font_file: impl Into<String>) -> Self {
        Self {
            font_file: font_file.into(),
            ..Default::default()
        }
    }

    /// Set the font size.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Remove the outline.
    pub fn without_border(mut self) -> Self {
        self.border_color = None;
        self.border_width = None;
        self
    }

    /// Outline color and width, only when both are configured.
    pub fn border(&self) -> Option<(&str, u32)> {
        match (self.border_color.as_deref(), self.border_width) {
            (Some(color), Some(width)) if !color.is_empty() => Some((color, width)),
            _ => None,
        }
    }

    /// Validate font settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("Font size must be greater than 0".to_string());
        }
        if self.color.trim().is_empty() {
            return Err("Font color cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Where a block of text is placed on the frame.
///
/// `anchor` is one of `origin`, `topLeft`, `topMiddle`, `topRight`,
/// `middleLeft`, `middle`, `middleRight`, `bottomLeft`, `bottomMiddle` or
/// `bottomRight`, compared without regard to case or spaces. Unknown names
/// place the text at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionSettings {
    /// Named anchor point
    pub anchor: String,

    /// Horizontal nudge in pixels, applied after anchoring
    pub x_offset: i32,

    /// Vertical nudge in pixels, applied after anchoring
    pub y_offset: i32,

    /// Horizontal margin as a percentage of the frame width
    pub x_pad: f64,

    /// Vertical margin as a percentage of the frame height
    pub y_pad: f64,
}

impl Default for PositionSettings {
    fn default() -> Self {
        Self {
            anchor: DEFAULT_ANCHOR.to_string(),
            x_offset: 0,
            y_offset: 0,
            x_pad: DEFAULT_PAD_PERCENT,
            y_pad: DEFAULT_PAD_PERCENT,
        }
    }
}

impl PositionSettings {
    /// Create position settings for an anchor with default padding.
    pub fn anchored(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            ..Default::default()
        }
    }

    /// Set the pixel offsets.
    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.x_offset = x;
        self.y_offset = y;
        self
    }

    /// Set the percentage padding.
    pub fn with_pad(mut self, x_pad: f64, y_pad: f64) -> Self {
        self.x_pad = x_pad;
        self.y_pad = y_pad;
        self
    }

    /// Validate position settings.
    pub fn validate(&self) -> Result<(), String> {
        for (name, pad) in [("xPad", self.x_pad), ("yPad", self.y_pad)] {
            if !pad.is_finite() || !(0.0..=100.0).contains(&pad) {
                return Err(format!("{} must be between 0 and 100, got {}", name, pad));
            }
        }
        Ok(())
    }
}
