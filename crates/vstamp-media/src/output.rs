//! Final outputs: concatenation, format conversion and naming.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use vstamp_models::OutputFormat;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{ensure_parent_dir, move_file};

/// Downscale to at most 720px wide, keeping the aspect ratio.
const PREVIEW_SCALE: &str = "scale='min(iw,720)':-1";
/// GIF frame rate and scaling.
const GIF_FILTER: &str = "fps=10,scale='min(iw,720)':-1:flags=lanczos";

/// Output path for one input in separate mode: `<dir>/<stem>-stamped.<ext>`.
pub fn separate_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}-stamped.{}", stem, format.extension()))
}

/// Output path in concat mode.
///
/// Named after the project file when there is one, otherwise after the
/// first input in separate-mode style so the source is never overwritten.
pub fn concat_output_path(
    project_path: Option<&Path>,
    first_input: &Path,
    format: OutputFormat,
) -> PathBuf {
    match project_path {
        Some(project) => project.with_extension(format.extension()),
        None => separate_output_path(first_input, format),
    }
}

/// Contents of an FFmpeg concat demuxer list.
pub fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| format!("file '{}'\n", quote_concat_path(clip)))
        .collect()
}

/// Quote a path for a single-quoted concat list entry.
fn quote_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "'\\''")
}

/// Command joining the clips listed in `list_file` without re-encoding.
pub fn concat_command(list_file: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(list_file, output)
        .input_format("concat")
        .input_args(["-safe", "0"])
        .copy_streams()
}

/// Command converting a stamped MP4 to `format`, or `None` for MP4 itself.
pub fn encode_command(format: OutputFormat, input: &Path, output: &Path) -> Option<FfmpegCommand> {
    match format {
        OutputFormat::Mp4 => None,
        OutputFormat::Webm => Some(
            FfmpegCommand::new(input, output)
                .video_codec("libvpx-vp9")
                .video_bitrate("2000k")
                .video_filter(PREVIEW_SCALE)
                .preset("ultrafast")
                .frame_rate(10)
                .keep_metadata(),
        ),
        OutputFormat::Gif => Some(
            FfmpegCommand::new(input, output)
                .video_filter(GIF_FILTER)
                .loop_count(0),
        ),
    }
}

/// Join stamped clips into one MP4 in `work_dir`.
///
/// A single clip is returned as is.
pub async fn concat_clips(
    runner: &FfmpegRunner,
    clips: &[PathBuf],
    work_dir: &Path,
) -> MediaResult<PathBuf> {
    match clips {
        [] => Err(MediaError::invalid_video("No stamped clips to concatenate")),
        [single] => Ok(single.clone()),
        _ => {
            let list_file = work_dir.join("concat_list.txt");
            fs::write(&list_file, concat_list(clips)).await?;

            let output = work_dir.join("concat_temp.mp4");
            runner.run(&concat_command(&list_file, &output)).await?;
            info!(clips = clips.len(), output = %output.display(), "Concatenated clips");
            Ok(output)
        }
    }
}

/// Produce the final output at `destination` from a stamped MP4.
///
/// MP4 is moved into place; other formats are re-encoded.
pub async fn finalize_output(
    runner: &FfmpegRunner,
    format: OutputFormat,
    stamped: &Path,
    destination: &Path,
) -> MediaResult<PathBuf> {
    ensure_parent_dir(destination).await?;

    match encode_command(format, stamped, destination) {
        None => move_file(stamped, destination).await?,
        Some(cmd) => runner.run(&cmd).await?,
    }

    info!(format = %format, output = %destination.display(), "Saved stamped output");
    Ok(destination.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_separate_output_path() {
        assert_eq!(
            separate_output_path(Path::new("/videos/beach.MOV"), OutputFormat::Mp4),
            PathBuf::from("/videos/beach-stamped.mp4")
        );
        assert_eq!(
            separate_output_path(Path::new("/videos/a.b.mov"), OutputFormat::Gif),
            PathBuf::from("/videos/a.b-stamped.gif")
        );
    }

    #[test]
    fn test_concat_output_path() {
        assert_eq!(
            concat_output_path(
                Some(Path::new("/projects/trip.json")),
                Path::new("/videos/a.mov"),
                OutputFormat::Webm
            ),
            PathBuf::from("/projects/trip.webm")
        );
        assert_eq!(
            concat_output_path(None, Path::new("/videos/a.mp4"), OutputFormat::Mp4),
            PathBuf::from("/videos/a-stamped.mp4")
        );
    }

    #[test]
    fn test_concat_list() {
        let list = concat_list(&[
            PathBuf::from("/tmp/w/000-a.stamped.mp4"),
            PathBuf::from("/tmp/w/001-it's.stamped.mp4"),
        ]);
        assert_eq!(
            list,
            "file '/tmp/w/000-a.stamped.mp4'\nfile '/tmp/w/001-it'\\''s.stamped.mp4'\n"
        );
    }

    #[test]
    fn test_concat_command() {
        let args = concat_command(Path::new("list.txt"), Path::new("out.mp4")).build_args();
        assert!(args.windows(2).any(|w| w == ["-f", "concat"]));
        assert!(args.windows(2).any(|w| w == ["-safe", "0"]));
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
    }

    #[test]
    fn test_encode_commands() {
        assert!(encode_command(OutputFormat::Mp4, Path::new("a.mp4"), Path::new("b.mp4")).is_none());

        let webm = encode_command(OutputFormat::Webm, Path::new("a.mp4"), Path::new("a.webm"))
            .unwrap()
            .build_args();
        assert!(webm.windows(2).any(|w| w == ["-c:v", "libvpx-vp9"]));
        assert!(webm.windows(2).any(|w| w == ["-b:v", "2000k"]));
        assert!(webm.windows(2).any(|w| w == ["-vf", "scale='min(iw,720)':-1"]));
        assert!(webm.windows(2).any(|w| w == ["-r", "10"]));

        let gif = encode_command(OutputFormat::Gif, Path::new("a.mp4"), Path::new("a.gif"))
            .unwrap()
            .build_args();
        assert!(gif
            .windows(2)
            .any(|w| w == ["-vf", "fps=10,scale='min(iw,720)':-1:flags=lanczos"]));
        assert!(gif.windows(2).any(|w| w == ["-loop", "0"]));
    }

    #[tokio::test]
    async fn test_concat_single_clip_is_passed_through() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("000-a.stamped.mp4");
        let runner = FfmpegRunner::new("/definitely/not/here/ffmpeg");

        let joined = concat_clips(&runner, &[clip.clone()], dir.path()).await.unwrap();
        assert_eq!(joined, clip);

        let result = concat_clips(&runner, &[], dir.path()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_finalize_mp4_moves_file() {
        let dir = TempDir::new().unwrap();
        let stamped = dir.path().join("000-a.stamped.mp4");
        let destination = dir.path().join("out").join("a-stamped.mp4");
        fs::write(&stamped, b"video").await.unwrap();

        let runner = FfmpegRunner::new("/definitely/not/here/ffmpeg");
        let out = finalize_output(&runner, OutputFormat::Mp4, &stamped, &destination)
            .await
            .unwrap();

        assert_eq!(out, destination);
        assert!(!stamped.exists());
        assert_eq!(fs::read(&destination).await.unwrap(), b"video");
    }
}
