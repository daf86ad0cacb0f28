//! Locating the FFmpeg and FFprobe binaries.
//!
//! Lookup order: explicit project path, environment variable, bundled
//! `bin/<platform>/` directory under the current directory, then `PATH`.

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use vstamp_models::ToolSettings;

use crate::error::{MediaError, MediaResult};

/// Environment variable overriding the `ffmpeg` location.
pub const FFMPEG_ENV: &str = "VSTAMP_FFMPEG";
/// Environment variable overriding the `ffprobe` location.
pub const FFPROBE_ENV: &str = "VSTAMP_FFPROBE";

/// An external tool this crate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    /// Binary name without extension.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }

    fn env_var(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => FFMPEG_ENV,
            Tool::Ffprobe => FFPROBE_ENV,
        }
    }

    fn not_found(&self) -> MediaError {
        match self {
            Tool::Ffmpeg => MediaError::FfmpegNotFound,
            Tool::Ffprobe => MediaError::FfprobeNotFound,
        }
    }

    /// File name of the binary on this platform.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.name(), env::consts::EXE_SUFFIX)
    }
}

/// Resolved locations of both tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Locate both tools, honoring explicit project settings.
    pub fn locate(settings: Option<&ToolSettings>) -> MediaResult<Self> {
        let ffmpeg = locate_tool(
            Tool::Ffmpeg,
            settings.and_then(|s| s.ffmpeg_path.as_deref()),
        )?;
        let ffprobe = locate_tool(
            Tool::Ffprobe,
            settings.and_then(|s| s.ffprobe_path.as_deref()),
        )?;
        Ok(Self { ffmpeg, ffprobe })
    }
}

/// Bundled binary directory name for this platform, e.g. `linux-x64`.
pub fn platform_dir() -> String {
    let os = match env::consts::OS {
        "windows" => "win",
        other => other,
    };
    let arch = match env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "x86",
        other => other,
    };
    format!("{}-{}", os, arch)
}

/// Bundled location of a tool under `base`.
pub fn bundled_path(base: &Path, tool: Tool) -> PathBuf {
    base.join("bin").join(platform_dir()).join(tool.file_name())
}

/// Locate a tool, trying an explicit path first.
///
/// An explicit path that does not exist is an error rather than a reason to
/// keep searching.
pub fn locate_tool(tool: Tool, explicit: Option<&str>) -> MediaResult<PathBuf> {
    if let Some(path) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        if path.is_file() {
            debug!(tool = tool.name(), path = %path.display(), "Using configured tool path");
            return Ok(path);
        }
        return Err(tool.not_found());
    }

    if let Some(path) = env::var_os(tool.env_var()).map(PathBuf::from) {
        if path.is_file() {
            debug!(tool = tool.name(), path = %path.display(), env = tool.env_var(), "Using tool from environment");
            return Ok(path);
        }
        debug!(env = tool.env_var(), path = %path.display(), "Ignoring missing tool path from environment");
    }

    if let Ok(cwd) = env::current_dir() {
        let bundled = bundled_path(&cwd, tool);
        if bundled.is_file() {
            debug!(tool = tool.name(), path = %bundled.display(), "Using bundled tool");
            return Ok(bundled);
        }
    }

    which::which(tool.name()).map_err(|_| tool.not_found())
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    locate_tool(Tool::Ffmpeg, None)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    locate_tool(Tool::Ffprobe, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_platform_dir_shape() {
        let dir = platform_dir();
        assert!(dir.contains('-'), "{}", dir);
        assert!(!dir.starts_with("windows"));
    }

    #[test]
    fn test_bundled_path_layout() {
        let path = bundled_path(Path::new("/app"), Tool::Ffprobe);
        assert!(path.starts_with("/app/bin"));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("ffprobe")));
    }

    #[test]
    fn test_explicit_path_is_used() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join(Tool::Ffmpeg.file_name());
        std::fs::write(&fake, b"").unwrap();

        let found = locate_tool(Tool::Ffmpeg, fake.to_str()).unwrap();
        assert_eq!(found, fake);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let result = locate_tool(Tool::Ffprobe, Some("/definitely/not/here/ffprobe"));
        assert!(matches!(result, Err(MediaError::FfprobeNotFound)));

        let result = locate_tool(Tool::Ffmpeg, Some("/definitely/not/here/ffmpeg"));
        assert!(matches!(result, Err(MediaError::FfmpegNotFound)));
    }
}
