//! Project processing: stamp every input, then deliver the outputs.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use vstamp_media::{
    concat_clips, concat_output_path, finalize_output, separate_output_path, FfmpegRunner,
    MediaError, StampedClip, Stamper, ToolPaths,
};
use vstamp_models::{InputSettings, OutputMode, ProjectSettings};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::logging::ClipLogger;
use crate::metrics;

/// Outcome of processing a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResult {
    pub success: bool,
    pub message: String,
    /// Final files written, in input order
    pub outputs: Vec<PathBuf>,
}

impl ProcessResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            outputs: Vec::new(),
        }
    }

    pub fn succeeded(message: impl Into<String>, outputs: Vec<PathBuf>) -> Self {
        Self {
            success: true,
            message: message.into(),
            outputs,
        }
    }
}

/// Parse and validate a project document.
///
/// The error is the user-facing message.
pub fn parse_project(json: &str) -> Result<ProjectSettings, String> {
    let project = ProjectSettings::from_json(json)
        .map_err(|e| format!("Failed to parse project JSON: {}", e))?;
    project.validate()?;
    Ok(project)
}

/// Fail before any work if an input file is missing.
pub fn ensure_inputs_exist(project: &ProjectSettings) -> WorkerResult<()> {
    match project
        .inputs
        .iter()
        .find(|input| !Path::new(&input.path).is_file())
    {
        Some(missing) => Err(MediaError::FileNotFound(PathBuf::from(&missing.path)).into()),
        None => Ok(()),
    }
}

/// Stamps the inputs of a project and writes its outputs.
pub struct ProjectProcessor {
    config: WorkerConfig,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl ProjectProcessor {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            cancel_rx: None,
        }
    }

    /// Stop running FFmpeg commands when the channel flips to `true`.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Process a project file.
    pub async fn process_file(&self, project_path: &Path) -> WorkerResult<ProcessResult> {
        if !project_path.is_file() {
            return Ok(ProcessResult::failed(format!(
                "Project file not found: {}",
                project_path.display()
            )));
        }
        let json = tokio::fs::read_to_string(project_path).await?;
        self.process(&json, Some(project_path)).await
    }

    /// Process a project document.
    ///
    /// `project_path` names the output in concat mode. Invalid documents
    /// give an unsuccessful result; tool and IO failures are errors.
    pub async fn process(
        &self,
        json: &str,
        project_path: Option<&Path>,
    ) -> WorkerResult<ProcessResult> {
        let project = match parse_project(json) {
            Ok(project) => project,
            Err(message) => {
                warn!(error = %message, "Rejected project");
                return Ok(ProcessResult::failed(message));
            }
        };
        info!(
            inputs = project.inputs.len(),
            mode = %project.output.mode,
            format = %project.output.format,
            "Processing project"
        );

        ensure_inputs_exist(&project)?;

        let tools = ToolPaths::locate(project.tools.as_ref())?;
        info!(
            ffmpeg = %tools.ffmpeg.display(),
            ffprobe = %tools.ffprobe.display(),
            "Located FFmpeg tools"
        );
        let runner = self.runner(&tools.ffmpeg);
        let stamper = Stamper::new(runner.clone(), &tools.ffprobe);

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let temp_dir = tempfile::Builder::new()
            .prefix("run-")
            .keep(self.config.keep_temp)
            .tempdir_in(&self.config.work_dir)?;
        if self.config.keep_temp {
            info!(dir = %temp_dir.path().display(), "Keeping intermediate files");
        }

        let run_id = Uuid::new_v4().to_string();
        let mut clips = Vec::with_capacity(project.inputs.len());
        for (index, input) in project.inputs.iter().enumerate() {
            let logger = ClipLogger::new(&run_id, &input.path);
            let span = logger.create_span();
            let clip = self
                .stamp_input(&stamper, index, input, temp_dir.path(), &logger)
                .instrument(span)
                .await?;
            clips.push(clip);
        }

        let outputs = match self
            .deliver(&runner, &project, &clips, temp_dir.path(), project_path)
            .await
        {
            Ok(outputs) => outputs,
            Err(e) => {
                record_failure(&e, "output");
                metrics::record_project_processed(
                    project.output.mode,
                    project.output.format,
                    false,
                );
                return Err(e.into());
            }
        };

        metrics::record_project_processed(project.output.mode, project.output.format, true);
        let message = format!(
            "Processed {} clip(s) into {}.",
            clips.len(),
            describe_outputs(&outputs)
        );
        info!(run_id = %run_id, outputs = outputs.len(), "{}", message);
        Ok(ProcessResult::succeeded(message, outputs))
    }

    fn runner(&self, ffmpeg: &Path) -> FfmpegRunner {
        let mut runner = FfmpegRunner::new(ffmpeg);
        if let Some(secs) = self.config.ffmpeg_timeout_secs() {
            runner = runner.with_timeout(secs);
        }
        if let Some(rx) = &self.cancel_rx {
            runner = runner.with_cancel(rx.clone());
        }
        runner
    }

    async fn stamp_input(
        &self,
        stamper: &Stamper,
        index: usize,
        input: &InputSettings,
        work_dir: &Path,
        logger: &ClipLogger,
    ) -> WorkerResult<StampedClip> {
        logger.log_start(&format!("input {}", index + 1));
        let started = Instant::now();

        match stamper.stamp(index, input, work_dir).await {
            Ok(clip) => {
                metrics::record_clip_stamped(started.elapsed().as_secs_f64());
                metrics::record_overlap_adjustments(clip.adjustments);
                if clip.adjustments > 0 {
                    logger.log_progress(&format!(
                        "moved overlapping text {} time(s)",
                        clip.adjustments
                    ));
                }
                logger.log_completion(&format!(
                    "{}x{}, {:.2}s",
                    clip.metadata.width, clip.metadata.height, clip.metadata.duration_seconds
                ));
                Ok(clip)
            }
            Err(e) => {
                record_failure(&e, "stamp");
                logger.log_error(&e.to_string());
                if let Some(stderr) = e.stderr() {
                    logger.log_warning(&format!("FFmpeg output:\n{}", stderr));
                }
                Err(e.into())
            }
        }
    }

    async fn deliver(
        &self,
        runner: &FfmpegRunner,
        project: &ProjectSettings,
        clips: &[StampedClip],
        work_dir: &Path,
        project_path: Option<&Path>,
    ) -> Result<Vec<PathBuf>, MediaError> {
        let format = project.output.format;

        match project.output.mode {
            OutputMode::Separate => {
                let mut outputs = Vec::with_capacity(clips.len());
                for clip in clips {
                    let destination = separate_output_path(&clip.input, format);
                    outputs.push(finalize_output(runner, format, &clip.stamped, &destination).await?);
                }
                Ok(outputs)
            }
            OutputMode::Concat => {
                let stamped: Vec<PathBuf> = clips.iter().map(|c| c.stamped.clone()).collect();
                let joined = concat_clips(runner, &stamped, work_dir).await?;
                let destination = concat_output_path(project_path, &clips[0].input, format);
                let output = finalize_output(runner, format, &joined, &destination).await?;
                Ok(vec![output])
            }
        }
    }
}

fn record_failure(error: &MediaError, stage: &str) {
    if matches!(
        error,
        MediaError::FfmpegFailed { .. } | MediaError::FfprobeFailed { .. } | MediaError::Timeout(_)
    ) {
        metrics::record_ffmpeg_failure(stage);
    }
}

fn describe_outputs(outputs: &[PathBuf]) -> String {
    outputs
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
