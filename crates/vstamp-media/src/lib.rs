//! Text overlay layout and FFmpeg CLI wrapper for VideoStamper.
//!
//! This crate provides:
//! - The text overlay engine: anchor placement, date pattern translation,
//!   per-line text elements and overlap resolution
//! - FFmpeg/FFprobe location and type-safe command building
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation and timeouts via tokio
//! - Metadata probing, stamping, concatenation and output encoding

pub mod command;
pub mod error;
pub mod fs_utils;
pub mod output;
pub mod overlay;
pub mod probe;
pub mod progress;
pub mod stamp;
pub mod tools;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use output::{concat_clips, concat_output_path, finalize_output, separate_output_path};
pub use overlay::{build_filter_chain, layout_input, TextLayout};
pub use probe::{parse_probe_output, probe_video};
pub use progress::FfmpegProgress;
pub use stamp::{StampedClip, Stamper};
pub use tools::{check_ffmpeg, check_ffprobe, ToolPaths};
