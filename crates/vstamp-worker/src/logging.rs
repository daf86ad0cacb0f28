//! Structured logging.
//!
//! Provides tracing subscriber setup for the binaries and consistent
//! per-clip lifecycle events tagged with the run id.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose level follows the verbosity flags.
const OWN_CRATES: &[&str] = &["vstamp", "vstamp_models", "vstamp_media", "vstamp_worker"];

/// Filter directives for a base level, e.g. `vstamp_media=debug,...`.
pub fn filter_directives(level: &str) -> String {
    OWN_CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing: colored output for terminals, JSON when requested.
///
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init_tracing(default_level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(default_level)));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger for one input within a run.
#[derive(Debug, Clone)]
pub struct ClipLogger {
    run_id: String,
    input: String,
}

impl ClipLogger {
    /// Create a logger for an input of a run.
    pub fn new(run_id: &str, input: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            input: input.to_string(),
        }
    }

    /// Log the start of work on the clip.
    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            input = %self.input,
            "Clip started: {}", message
        );
    }

    /// Log a progress update.
    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            input = %self.input,
            "Clip progress: {}", message
        );
    }

    /// Log a warning.
    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            input = %self.input,
            "Clip warning: {}", message
        );
    }

    /// Log an error.
    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            input = %self.input,
            "Clip error: {}", message
        );
    }

    /// Log completion.
    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            input = %self.input,
            "Clip completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Span carrying the run id and input.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "clip",
            run_id = %self.run_id,
            input = %self.input
        )
    }
}
