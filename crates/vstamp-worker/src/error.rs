//! Processor error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Media error: {0}")]
    Media(#[from] vstamp_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// Whether the run was stopped on request rather than failing.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkerError::Media(vstamp_media::MediaError::Cancelled))
    }

    /// Whether the FFmpeg tools could not be found.
    pub fn is_missing_tool(&self) -> bool {
        matches!(
            self,
            WorkerError::Media(
                vstamp_media::MediaError::FfmpegNotFound | vstamp_media::MediaError::FfprobeNotFound
            )
        )
    }
}
