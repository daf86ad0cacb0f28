//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_progress_line, FfmpegProgress};

/// Number of non-progress stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Keys FFmpeg emits in `-progress` blocks.
const PROGRESS_KEYS: &[&str] = &[
    "frame",
    "fps",
    "bitrate",
    "total_size",
    "out_time_us",
    "out_time_ms",
    "out_time",
    "dup_frames",
    "drop_frames",
    "speed",
    "progress",
];

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add multiple input arguments.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Read the input with a specific demuxer.
    pub fn input_format(self, format: impl Into<String>) -> Self {
        self.input_arg("-f").input_arg(format)
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set video bitrate.
    pub fn video_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:v").output_arg(bitrate)
    }

    /// Copy all streams without re-encoding.
    pub fn copy_streams(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set output frame rate.
    pub fn frame_rate(self, fps: u32) -> Self {
        self.output_arg("-r").output_arg(fps.to_string())
    }

    /// Carry container metadata (creation time etc.) over from the input.
    pub fn keep_metadata(self) -> Self {
        self.output_arg("-map_metadata")
            .output_arg("0")
            .output_arg("-movflags")
            .output_arg("use_metadata_tags")
    }

    /// Set GIF loop count (0 = forever).
    pub fn loop_count(self, count: u32) -> Self {
        self.output_arg("-loop").output_arg(count.to_string())
    }

    /// Set whether an existing output is overwritten.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        // Input args
        args.extend(self.input_args.clone());

        // Input file
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        // Output args
        args.extend(self.output_args.clone());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking and cancellation.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Path to the ffmpeg binary
    program: PathBuf,
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a runner for the given `ffmpeg` binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, progress_callback: F) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::ffmpeg_failed("FFmpeg stderr not captured", None, None))?;
        let mut reader = BufReader::new(stderr).lines();

        // Progress lines feed the callback; everything else is kept for errors
        let progress_handle = tokio::spawn(async move {
            let mut current_progress = FfmpegProgress::default();
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

            while let Ok(Some(line)) = reader.next_line().await {
                if is_progress_line(&line) {
                    if let Some(progress) = parse_progress_line(&line, &mut current_progress) {
                        progress_callback(progress);
                    }
                    continue;
                }
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }

            tail.into_iter().collect::<Vec<_>>()
        });

        let status = match self.wait_for_completion(&mut child).await {
            Ok(status) => status,
            Err(e) => {
                progress_handle.abort();
                return Err(e);
            }
        };

        let tail = progress_handle.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            let stderr = (!tail.is_empty()).then(|| tail.join("\n"));
            Err(MediaError::ffmpeg_failed(
                format!("FFmpeg exited with {}", status),
                stderr,
                status.code(),
            ))
        }
    }

    /// Wait for child process with cancellation and timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<ExitStatus> {
        let timeout_secs = self.timeout_secs;
        let timeout = async move {
            match timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancel_rx = self.cancel_rx.clone();
        let cancelled = async move {
            let Some(mut rx) = cancel_rx else {
                return std::future::pending::<()>().await;
            };
            loop {
                if *rx.borrow_and_update() {
                    return;
                }
                if rx.changed().await.is_err() {
                    // Sender gone without cancelling
                    return std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            status = child.wait() => Ok(status?),
            _ = timeout => {
                let secs = timeout_secs.unwrap_or_default();
                warn!("FFmpeg timed out after {} seconds, killing process", secs);
                let _ = child.kill().await;
                Err(MediaError::Timeout(secs))
            }
            _ = cancelled => {
                info!("FFmpeg cancelled, killing process");
                let _ = child.kill().await;
                Err(MediaError::Cancelled)
            }
        }
    }
}

fn is_progress_line(line: &str) -> bool {
    match line.trim().split_once('=') {
        Some((key, _)) => PROGRESS_KEYS.contains(&key) || key.starts_with("stream_"),
        None => false,
    }
}
