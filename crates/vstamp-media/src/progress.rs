//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress reported by FFmpeg's `-progress pipe:2` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as string (HH:MM:SS.microseconds)
    pub out_time: String,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Progress percentage given the clip duration in milliseconds.
    pub fn percentage(&self, total_duration_ms: i64) -> f64 {
        if total_duration_ms <= 0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / total_duration_ms as f64) * 100.0).min(100.0)
    }
}

/// Fold one `key=value` progress line into `current`.
///
/// Returns a snapshot when a `progress=` line closes a block.
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let (key, value) = line.trim().split_once('=')?;

    match key {
        // FFmpeg reports microseconds under both names
        "out_time_us" | "out_time_ms" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "out_time" => current.out_time = value.to_string(),
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            current.is_complete = value == "end";
            return Some(current.clone());
        }
        _ => {}
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };

        assert!((progress.percentage(10000) - 50.0).abs() < 0.01);
        assert!((progress.percentage(5000) - 100.0).abs() < 0.01);
        assert!((progress.percentage(2500) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0), 0.0);
    }

    #[test]
    fn test_progress_block() {
        let mut progress = FfmpegProgress::default();

        assert!(parse_progress_line("frame=120", &mut progress).is_none());
        assert!(parse_progress_line("fps=29.97", &mut progress).is_none());
        assert!(parse_progress_line("out_time_us=4000000", &mut progress).is_none());
        assert!(parse_progress_line("out_time=00:00:04.000000", &mut progress).is_none());
        assert!(parse_progress_line("speed=1.5x", &mut progress).is_none());

        let snapshot = parse_progress_line("progress=continue", &mut progress).unwrap();
        assert_eq!(snapshot.frame, 120);
        assert_eq!(snapshot.out_time_ms, 4000);
        assert_eq!(snapshot.out_time, "00:00:04.000000");
        assert!((snapshot.speed - 1.5).abs() < 0.01);
        assert!(!snapshot.is_complete);

        let done = parse_progress_line("progress=end", &mut progress).unwrap();
        assert!(done.is_complete);
    }

    #[test]
    fn test_progress_ignores_noise() {
        let mut progress = FfmpegProgress::default();
        assert!(parse_progress_line("[libx264 @ 0x1] frame I:1", &mut progress).is_none());
        assert!(parse_progress_line("speed=N/A", &mut progress).is_none());
        assert!(parse_progress_line("out_time_us=N/A", &mut progress).is_none());
        assert_eq!(progress, FfmpegProgress::default());
    }
}
