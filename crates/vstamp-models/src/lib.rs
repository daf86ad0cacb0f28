//! Shared data models for VideoStamper.
//!
//! This crate provides Serde-serializable types for:
//! - The JSON project document (inputs, timestamp and subtitle rules, output)
//! - Font and anchor placement settings
//! - Probed video metadata

pub mod project;
pub mod subtitle;
pub mod text;
pub mod timestamp;
pub mod video;

// Re-export common types
pub use project::{
    InputSettings, ModelParseError, OutputFormat, OutputMode, OutputSettings, ProjectSettings,
    ToolSettings,
};
pub use subtitle::SubtitleSettings;
pub use text::{FontSettings, PositionSettings};
pub use timestamp::TimestampSettings;
pub use video::VideoMetadata;
