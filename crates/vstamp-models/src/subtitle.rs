//! Subtitle overlay settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::text::{FontSettings, PositionSettings};

/// A caption shown for a span of the clip.
///
/// The span is `start..start + duration`. `end` is accepted for documents
/// that predate `duration` and is only consulted when no duration is given.
/// A caption with neither is shown for the whole clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SubtitleSettings {
    /// Caption text; line breaks produce one line of text each
    pub text: String,

    /// Second at which the caption appears
    pub start: f64,

    /// How long the caption stays up, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Second at which the caption disappears (legacy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,

    /// Font settings
    pub font: FontSettings,

    /// Placement settings
    pub position: PositionSettings,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            text: String::new(),
            start: 0.0,
            duration: None,
            end: None,
            font: FontSettings::default(),
            position: PositionSettings::default(),
        }
    }
}

impl SubtitleSettings {
    /// Create a caption shown from `start` for `duration` seconds.
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration: Some(duration),
            ..Default::default()
        }
    }

    /// Set the font settings.
    pub fn with_font(mut self, font: FontSettings) -> Self {
        self.font = font;
        self
    }

    /// Set the placement settings.
    pub fn with_position(mut self, position: PositionSettings) -> Self {
        self.position = position;
        self
    }

    /// Second at which the caption disappears.
    ///
    /// Derived from `start + duration`; falls back to the legacy `end`.
    pub fn end_time(&self) -> Option<f64> {
        match self.duration {
            Some(duration) => Some(self.start + duration),
            None => self.end,
        }
    }

    /// Validate subtitle settings.
    pub fn validate(&self) -> Result<(), String> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(format!("Subtitle start must be >= 0, got {}", self.start));
        }
        match (self.duration, self.end) {
            (Some(duration), _) if !duration.is_finite() || duration <= 0.0 => {
                return Err(format!("Subtitle duration must be > 0, got {}", duration));
            }
            (None, Some(end)) if !end.is_finite() || end <= self.start => {
                return Err(format!(
                    "Subtitle end must be after its start ({}), got {}",
                    self.start, end
                ));
            }
            _ => {}
        }
        self.font.validate()?;
        self.position.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_time_from_duration() {
        let sub = SubtitleSettings::new("Hello", 5.0, 3.0);
        assert_eq!(sub.end_time(), Some(8.0));
    }

    #[test]
    fn test_duration_wins_over_end() {
        let sub = SubtitleSettings {
            end: Some(20.0),
            ..SubtitleSettings::new("Hello", 5.0, 3.0)
        };
        assert_eq!(sub.end_time(), Some(8.0));
    }

    #[test]
    fn test_legacy_end() {
        let sub: SubtitleSettings =
            serde_json::from_str(r#"{"text": "Hi", "start": 2, "end": 4.5}"#).unwrap();
        assert_eq!(sub.end_time(), Some(4.5));
    }

    #[test]
    fn test_no_window() {
        let sub: SubtitleSettings = serde_json::from_str(r#"{"text": "Hi"}"#).unwrap();
        assert_eq!(sub.start, 0.0);
        assert_eq!(sub.end_time(), None);
    }

    #[test]
    fn test_validation() {
        assert!(SubtitleSettings::new("Hi", 0.0, 1.0).validate().is_ok());
        assert!(SubtitleSettings::new("Hi", -1.0, 1.0).validate().is_err());
        assert!(SubtitleSettings::new("Hi", 1.0, -1.0).validate().is_err());
    }

    #[test]
    fn test_empty_span_is_rejected() {
        let err = SubtitleSettings::new("Hi", 2.0, 0.0).validate().unwrap_err();
        assert_eq!(err, "Subtitle duration must be > 0, got 0");

        let sub: SubtitleSettings =
            serde_json::from_str(r#"{"text": "Hi", "start": 4, "end": 4}"#).unwrap();
        assert!(sub.validate().is_err());

        // no span at all means always visible
        let sub: SubtitleSettings = serde_json::from_str(r#"{"text": "Hi"}"#).unwrap();
        assert!(sub.validate().is_ok());
    }
}
