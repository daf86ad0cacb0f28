//! VideoStamper project processor.
//!
//! This crate provides:
//! - Project processing: stamp every input, then concatenate or deliver separately
//! - Environment configuration
//! - Per-clip structured logging and processing metrics
//! - The `vstamp` command line

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod processor;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::{init_tracing, ClipLogger};
pub use processor::{ProcessResult, ProjectProcessor};
