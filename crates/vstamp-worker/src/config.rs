//! Processor configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the temp work directory root.
pub const WORK_DIR_ENV: &str = "VSTAMP_WORK_DIR";
/// Environment variable capping each FFmpeg run, in seconds.
pub const FFMPEG_TIMEOUT_ENV: &str = "VSTAMP_FFMPEG_TIMEOUT_SECS";
/// Environment variable that keeps the per-run temp directory.
pub const KEEP_TEMP_ENV: &str = "VSTAMP_KEEP_TEMP";
/// Environment variable selecting JSON log output.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Processor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Root under which each run creates its own temp directory
    pub work_dir: PathBuf,
    /// Per-command FFmpeg timeout
    pub ffmpeg_timeout: Option<Duration>,
    /// Keep intermediate files after the run
    pub keep_temp: bool,
    /// Emit logs as JSON
    pub json_logs: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            ffmpeg_timeout: None,
            keep_temp: false,
            json_logs: false,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            work_dir: lookup(WORK_DIR_ENV)
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_work_dir),
            ffmpeg_timeout: lookup(FFMPEG_TIMEOUT_ENV)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            keep_temp: lookup(KEEP_TEMP_ENV).is_some_and(|v| is_truthy(&v)),
            json_logs: lookup(LOG_FORMAT_ENV).is_some_and(|v| v.eq_ignore_ascii_case("json")),
        }
    }

    /// FFmpeg timeout in whole seconds.
    pub fn ffmpeg_timeout_secs(&self) -> Option<u64> {
        self.ffmpeg_timeout.map(|d| d.as_secs())
    }
}

/// `<system temp>/VideoStamper`.
pub fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("VideoStamper")
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> WorkerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config, WorkerConfig::default());
        assert!(config.work_dir.ends_with("VideoStamper"));
        assert!(config.ffmpeg_timeout.is_none());
        assert!(!config.keep_temp);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_from_vars() {
        let config = config(&[
            ("VSTAMP_WORK_DIR", "/scratch/vstamp"),
            ("VSTAMP_FFMPEG_TIMEOUT_SECS", "600"),
            ("VSTAMP_KEEP_TEMP", "Yes"),
            ("LOG_FORMAT", "JSON"),
        ]);
        assert_eq!(config.work_dir, PathBuf::from("/scratch/vstamp"));
        assert_eq!(config.ffmpeg_timeout_secs(), Some(600));
        assert!(config.keep_temp);
        assert!(config.json_logs);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config(&[
            ("VSTAMP_WORK_DIR", "  "),
            ("VSTAMP_FFMPEG_TIMEOUT_SECS", "soon"),
            ("VSTAMP_KEEP_TEMP", "nope"),
            ("LOG_FORMAT", "pretty"),
        ]);
        assert_eq!(config, WorkerConfig::default());

        let config = self::config(&[("VSTAMP_FFMPEG_TIMEOUT_SECS", "0")]);
        assert!(config.ffmpeg_timeout.is_none());
    }
}
