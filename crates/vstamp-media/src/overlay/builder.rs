//! Builds text elements from timestamp and subtitle rules.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone};
use tracing::debug;

use vstamp_models::{
    FontSettings, InputSettings, PositionSettings, SubtitleSettings, TimestampSettings,
    VideoMetadata,
};

use super::anchor::{estimate_text_width, Anchor, AnchorLayout};
use super::date_format::{escape_text, split_lines, translate};
use super::element::{AnchorGrouping, Border, TextElement, TimeWindow};

/// Zoned layouts seen in container tags, tried after RFC 3339.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y:%m:%d %H:%M:%S%.f%z",
];

/// Layouts without an offset; these already hold the recorded wall time.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y:%m:%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Parse a recorded creation time into a wall-clock epoch.
///
/// The result is the UTC instant shifted by its own offset, so that
/// formatting it with `gmtime` prints the local wall time at which the clip
/// was recorded. Returns `None` when the string is not a recognizable date.
pub fn parse_creation_time(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(zoned) = parse_zoned(raw) {
        let epoch = wall_clock_epoch(&zoned);
        debug!(raw = %raw, offset = %zoned.offset(), epoch, "Parsed zoned creation time");
        return Some(epoch);
    }

    // Already a wall time: folding any local offset back in cancels out, and
    // times inside a DST gap stay usable.
    let epoch = parse_naive(raw)?.and_utc().timestamp();
    debug!(raw = %raw, epoch, "Parsed naive creation time");
    Some(epoch)
}

fn parse_zoned(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        ZONED_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    })
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn wall_clock_epoch<Tz: TimeZone>(dt: &DateTime<Tz>) -> i64 {
    let offset = dt.offset().fix().local_minus_utc();
    dt.timestamp() + i64::from(offset)
}

/// Base epoch handed to `%{pts:gmtime:...}`.
///
/// The recorded creation time is used when allowed and parseable; the fixed
/// offset is then added on top of it (or on top of zero).
pub fn resolve_base_epoch(ts: &TimestampSettings, meta: &VideoMetadata) -> i64 {
    let recorded = if ts.use_metadata_creation_time {
        meta.creation_time_raw
            .as_deref()
            .and_then(parse_creation_time)
    } else {
        None
    };

    if ts.use_metadata_creation_time && recorded.is_none() {
        debug!(
            raw = ?meta.creation_time_raw,
            "No usable creation time in metadata"
        );
    }

    let epoch = match (recorded, ts.time_offset) {
        (Some(base), Some(offset)) => base.saturating_add(offset),
        (Some(base), None) => base,
        (None, Some(offset)) => offset,
        (None, None) => {
            debug!("No usable timestamp found, clock starts at the Unix epoch");
            0
        }
    };

    debug!(epoch, "Resolved timestamp base epoch");
    epoch
}

/// Builds [`TextElement`]s for one clip.
#[derive(Debug, Clone, Copy)]
pub struct TextElementBuilder<'a> {
    meta: &'a VideoMetadata,
}

impl<'a> TextElementBuilder<'a> {
    pub fn new(meta: &'a VideoMetadata) -> Self {
        Self { meta }
    }

    /// Build every element of an input: timestamp lines first, then
    /// subtitles in order.
    pub fn build(&self, input: &InputSettings) -> AnchorGrouping {
        let mut grouping = AnchorGrouping::new();
        for element in self.timestamp(&input.timestamp) {
            grouping.push(element);
        }
        for sub in &input.subtitles {
            for element in self.subtitle(sub) {
                grouping.push(element);
            }
        }
        grouping
    }

    /// One element per line of the timestamp pattern.
    ///
    /// Disabled timestamps produce nothing.
    pub fn timestamp(&self, ts: &TimestampSettings) -> Vec<TextElement> {
        if !ts.enabled {
            return Vec::new();
        }

        let epoch = resolve_base_epoch(ts, self.meta);
        let pattern = escape_text(&translate(&ts.format));
        let window = TimeWindow::from_bounds(ts.start, ts.end);

        split_lines(&pattern)
            .into_iter()
            .map(|line| {
                let content = format!("%{{pts\\:gmtime\\:{}\\:{}}}", epoch, line);
                self.element(
                    content,
                    line.chars().count(),
                    &ts.font,
                    &ts.position,
                    window,
                )
            })
            .collect()
    }

    /// One element per line of the subtitle text, all sharing its window.
    pub fn subtitle(&self, sub: &SubtitleSettings) -> Vec<TextElement> {
        let text = escape_text(&sub.text);
        let window = TimeWindow::from_bounds(Some(sub.start), sub.end_time());

        split_lines(&text)
            .into_iter()
            .map(|line| {
                self.element(
                    line.to_string(),
                    line.chars().count(),
                    &sub.font,
                    &sub.position,
                    window,
                )
            })
            .collect()
    }

    fn element(
        &self,
        content: String,
        char_count: usize,
        font: &FontSettings,
        position: &PositionSettings,
        window: Option<TimeWindow>,
    ) -> TextElement {
        let anchor = Anchor::parse(&position.anchor);
        let placement = anchor.resolve(&AnchorLayout {
            frame_width: self.meta.width,
            frame_height: self.meta.height,
            font_size: font.size,
            text_width: estimate_text_width(font.size, char_count),
            x_offset: position.x_offset,
            y_offset: position.y_offset,
            x_pad: position.x_pad,
            y_pad: position.y_pad,
        });

        TextElement {
            content,
            font_path: font.font_file.clone(),
            font_size: font.size,
            font_color: font.color.clone(),
            border: font.border().map(|(color, width)| Border {
                color: color.to_string(),
                width,
            }),
            x_expr: placement.x_expr,
            y_expr: placement.y_expr,
            x_coord: placement.x_coord,
            y_coord: placement.y_coord,
            window,
            anchor,
        }
    }
}
