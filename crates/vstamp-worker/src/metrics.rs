//! Processing metrics.
//!
//! No exporter is installed here; without a recorder these are no-ops.

use metrics::{counter, histogram};
use vstamp_models::{OutputFormat, OutputMode};

/// Metric names as constants for consistency.
pub mod names {
    pub const CLIPS_STAMPED_TOTAL: &str = "vstamp_clips_stamped_total";
    pub const OVERLAP_ADJUSTMENTS_TOTAL: &str = "vstamp_overlap_adjustments_total";
    pub const FFMPEG_FAILURES_TOTAL: &str = "vstamp_ffmpeg_failures_total";
    pub const STAMP_DURATION_SECONDS: &str = "vstamp_stamp_duration_seconds";
    pub const PROJECTS_PROCESSED_TOTAL: &str = "vstamp_projects_processed_total";
}

/// Record a stamped clip and how long it took.
pub fn record_clip_stamped(duration_secs: f64) {
    counter!(names::CLIPS_STAMPED_TOTAL).increment(1);
    histogram!(names::STAMP_DURATION_SECONDS).record(duration_secs);
}

/// Record overlap adjustments made while laying out a clip.
pub fn record_overlap_adjustments(count: usize) {
    if count > 0 {
        counter!(names::OVERLAP_ADJUSTMENTS_TOTAL).increment(count as u64);
    }
}

/// Record a failed FFmpeg or FFprobe run.
pub fn record_ffmpeg_failure(stage: &str) {
    let labels = [("stage", stage.to_string())];
    counter!(names::FFMPEG_FAILURES_TOTAL, &labels).increment(1);
}

/// Record a finished project.
pub fn record_project_processed(mode: OutputMode, format: OutputFormat, success: bool) {
    let labels = [
        ("mode", mode.to_string()),
        ("format", format.to_string()),
        ("success", success.to_string()),
    ];
    counter!(names::PROJECTS_PROCESSED_TOTAL, &labels).increment(1);
}
