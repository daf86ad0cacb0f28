//! Burning the text overlay into one input.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use vstamp_models::{InputSettings, VideoMetadata};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::overlay::{layout_input, TextLayout};
use crate::probe::probe_video;

/// Filter used when an input has no text to draw.
const PASSTHROUGH_FILTER: &str = "null";

/// An input that has been stamped into the work directory.
#[derive(Debug, Clone)]
pub struct StampedClip {
    /// Original video
    pub input: PathBuf,
    /// Stamped MP4 in the work directory
    pub stamped: PathBuf,
    pub metadata: VideoMetadata,
    /// Overlap adjustments made while laying out text
    pub adjustments: usize,
}

/// Work-directory path of the stamped intermediate for input `index`.
///
/// Intermediates are always MP4; the index keeps inputs that share a file
/// name apart.
pub fn stamped_temp_path(work_dir: &Path, index: usize, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    work_dir.join(format!("{:03}-{}.stamped.mp4", index, stem))
}

/// FFmpeg command that draws `filter` onto `input`, keeping its metadata.
pub fn stamp_command(input: &Path, filter: &str, output: &Path) -> FfmpegCommand {
    let filter = if filter.is_empty() {
        PASSTHROUGH_FILTER
    } else {
        filter
    };
    FfmpegCommand::new(input, output)
        .video_filter(filter)
        .keep_metadata()
}

/// Stamps inputs using a located FFmpeg/FFprobe pair.
#[derive(Debug, Clone)]
pub struct Stamper {
    runner: FfmpegRunner,
    ffprobe: PathBuf,
}

impl Stamper {
    pub fn new(runner: FfmpegRunner, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            ffprobe: ffprobe.into(),
        }
    }

    /// Probe an input and lay out its text without running FFmpeg.
    pub async fn plan(&self, input: &InputSettings) -> MediaResult<(VideoMetadata, TextLayout)> {
        let path = Path::new(&input.path);
        if input.path.trim().is_empty() || !path.is_file() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let metadata = probe_video(&self.ffprobe, path).await?;
        let layout = layout_input(input, &metadata);
        Ok((metadata, layout))
    }

    /// Stamp input number `index` into `work_dir`.
    pub async fn stamp(
        &self,
        index: usize,
        input: &InputSettings,
        work_dir: &Path,
    ) -> MediaResult<StampedClip> {
        let (metadata, layout) = self.plan(input).await?;
        let source = PathBuf::from(&input.path);
        let stamped = stamped_temp_path(work_dir, index, &source);
        let filter = layout.filter_chain();
        debug!(input = %input.path, filter = %filter, "Generated FFmpeg filter");

        let cmd = stamp_command(&source, &filter, &stamped);
        let total_ms = metadata.duration_ms();
        let name = input.path.clone();
        self.runner
            .run_with_progress(&cmd, move |progress| {
                debug!(
                    input = %name,
                    percent = progress.percentage(total_ms),
                    speed = progress.speed,
                    "Stamping progress"
                );
            })
            .await?;

        info!(input = %input.path, output = %stamped.display(), "Finished stamping");

        Ok(StampedClip {
            input: source,
            stamped,
            metadata,
            adjustments: layout.adjustments,
        })
    }
}
