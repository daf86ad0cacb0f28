//! VideoStamper command line.

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::{error, info, warn};

use vstamp_models::VideoMetadata;
use vstamp_worker::cli::{filter_report, project_schema, Cli, Command};
use vstamp_worker::{init_tracing, ProjectProcessor, WorkerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env();
    init_tracing(cli.log_level(), config.json_logs);

    match run(cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: WorkerConfig) -> anyhow::Result<bool> {
    match cli.command {
        Some(Command::Schema) => {
            println!("{}", project_schema()?);
            Ok(true)
        }
        Some(Command::Filter {
            project,
            width,
            height,
            creation_time,
        }) => {
            let json = tokio::fs::read_to_string(&project)
                .await
                .with_context(|| format!("Failed to read {}", project.display()))?;
            let mut meta = VideoMetadata::with_size(width, height);
            meta.creation_time_raw = creation_time;
            match filter_report(&json, &meta) {
                Ok(report) => {
                    print!("{}", report);
                    Ok(true)
                }
                Err(message) => {
                    println!("{}", message);
                    Ok(false)
                }
            }
        }
        None => match cli.project {
            Some(project) => process(&project, config).await,
            None => {
                println!("Usage: vstamp <project.json> [info|verbose|debug]");
                println!("Run `vstamp --help` for all commands.");
                Ok(false)
            }
        },
    }
}

async fn process(project: &Path, config: WorkerConfig) -> anyhow::Result<bool> {
    info!(project = %project.display(), config = ?config, "Starting vstamp");

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping FFmpeg");
            let _ = cancel_tx.send(true);
        }
    });

    let processor = ProjectProcessor::new(config).with_cancel(cancel_rx);
    let result = match processor.process_file(project).await {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => {
            println!("Cancelled.");
            return Ok(false);
        }
        Err(e) if e.is_missing_tool() => {
            println!("{}", e);
            println!("Set ffmpegPath/ffprobePath in the project's tools section, or VSTAMP_FFMPEG/VSTAMP_FFPROBE.");
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", result.message);
    Ok(result.success)
}
