//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while probing, stamping or encoding.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found (checked project tools, VSTAMP_FFMPEG, bundled bin/ and PATH)")]
    FfmpegNotFound,

    #[error("FFprobe not found (checked project tools, VSTAMP_FFPROBE, bundled bin/ and PATH)")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create an invalid video error.
    pub fn invalid_video(message: impl Into<String>) -> Self {
        Self::InvalidVideo(message.into())
    }

    /// Captured stderr of a failed tool run, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::FfmpegFailed { stderr, .. } | Self::FfprobeFailed { stderr, .. } => {
                stderr.as_deref()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MediaError::ffmpeg_failed("exit status 1", Some("boom".to_string()), Some(1));
        assert_eq!(err.to_string(), "FFmpeg command failed: exit status 1");
        assert_eq!(err.stderr(), Some("boom"));

        let err = MediaError::FileNotFound(PathBuf::from("/videos/missing.mov"));
        assert!(err.to_string().contains("/videos/missing.mov"));
        assert!(err.stderr().is_none());
    }
}
