//! Command line interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;

use vstamp_media::layout_input;
use vstamp_models::{ProjectSettings, VideoMetadata};

use crate::processor::parse_project;

/// Burn running timestamps and captions into videos
#[derive(Parser, Debug)]
#[command(name = "vstamp", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project JSON file to process
    #[arg(value_name = "PROJECT")]
    pub project: Option<PathBuf>,

    /// Log level, kept for older scripts (same as -v, -vv, -vvv)
    #[arg(value_name = "LEVEL", value_enum)]
    pub level: Option<LegacyLevel>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print the JSON Schema of the project document
    Schema,

    /// Print the drawtext filter chain for each input without running FFmpeg
    Filter {
        /// Project JSON file
        #[arg(value_name = "PROJECT")]
        project: PathBuf,

        /// Frame width to lay out against
        #[arg(long, default_value_t = 1920)]
        width: u32,

        /// Frame height to lay out against
        #[arg(long, default_value_t = 1080)]
        height: u32,

        /// Recorded creation time, e.g. 2024-01-15T10:30:00Z
        #[arg(long, value_name = "TIME")]
        creation_time: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyLevel {
    Info,
    Verbose,
    Debug,
}

impl Cli {
    /// Default log level from `-v` count and the legacy positional level.
    pub fn log_level(&self) -> &'static str {
        let legacy = match self.level {
            None => 0,
            Some(LegacyLevel::Info) => 1,
            Some(LegacyLevel::Verbose) => 2,
            Some(LegacyLevel::Debug) => 3,
        };
        match self.verbosity.max(legacy) {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Pretty-printed JSON Schema of [`ProjectSettings`].
pub fn project_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(ProjectSettings);
    serde_json::to_string_pretty(&schema)
}

/// One block per input: a header line then the filter chain.
pub fn filter_report(json: &str, meta: &VideoMetadata) -> Result<String, String> {
    let project = parse_project(json)?;
    let mut report = String::new();

    for input in &project.inputs {
        let layout = layout_input(input, meta);
        let _ = writeln!(
            report,
            "# {} ({} overlap adjustment(s))",
            input.path, layout.adjustments
        );
        if layout.is_empty() {
            report.push_str("null\n");
        } else {
            let _ = writeln!(report, "{}", layout.filter_chain());
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_process_args() {
        let cli = parse(&["vstamp", "project.json"]);
        assert_eq!(cli.project, Some(PathBuf::from("project.json")));
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level(), "warn");

        let cli = parse(&["vstamp", "project.json", "verbose"]);
        assert_eq!(cli.level, Some(LegacyLevel::Verbose));
        assert_eq!(cli.log_level(), "debug");

        let cli = parse(&["vstamp", "-vvv", "project.json", "info"]);
        assert_eq!(cli.log_level(), "trace");

        assert!(Cli::try_parse_from(["vstamp", "project.json", "loud"]).is_err());
    }

    #[test]
    fn test_subcommands() {
        let cli = parse(&["vstamp", "schema"]);
        assert_eq!(cli.command, Some(Command::Schema));

        let cli = parse(&[
            "vstamp",
            "filter",
            "p.json",
            "--width",
            "1080",
            "--height",
            "1920",
            "--creation-time",
            "2024-01-15T10:30:00Z",
            "-v",
        ]);
        assert_eq!(
            cli.command,
            Some(Command::Filter {
                project: PathBuf::from("p.json"),
                width: 1080,
                height: 1920,
                creation_time: Some("2024-01-15T10:30:00Z".to_string()),
            })
        );
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn test_project_schema() {
        let schema = project_schema().unwrap();
        assert!(schema.contains("\"ProjectSettings\""));
        assert!(schema.contains("automaticallyFixOverlappingText"));
    }

    #[test]
    fn test_filter_report() {
        let json = r#"{"inputs": [
            {"path": "/v/a.mp4", "timestamp": {"enabled": false},
             "subtitles": [{"text": "Hello", "start": 1, "duration": 2}]},
            {"path": "/v/b.mp4", "timestamp": {"enabled": false}}
        ]}"#;
        let report = filter_report(json, &VideoMetadata::with_size(1920, 1080)).unwrap();
        let lines: Vec<_> = report.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "# /v/a.mp4 (0 overlap adjustment(s))");
        assert!(lines[1].starts_with("drawtext="));
        assert!(lines[1].contains("enable='between(t,1,3)'"));
        assert_eq!(lines[3], "null");

        assert!(filter_report("{}", &VideoMetadata::default()).is_err());
    }
}
