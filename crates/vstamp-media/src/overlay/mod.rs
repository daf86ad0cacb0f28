//! Text overlay layout.
//!
//! Turns an input's timestamp and subtitle rules into positioned,
//! time-scoped `drawtext` filters:
//!
//! 1. [`TextElementBuilder`] creates one element per line of text
//! 2. elements are grouped by anchor in processing order
//! 3. [`resolve_overlaps`] pushes colliding lines apart (when enabled)
//! 4. every element is serialized and the filters are joined with `,`
//!
//! Layout is synchronous and infallible: unparseable creation times start
//! the clock at the Unix epoch, unknown anchors place text at the origin and
//! unknown date tokens are kept as literal text.

pub mod anchor;
pub mod builder;
pub mod date_format;
pub mod element;
pub mod overlap;

use tracing::debug;
use vstamp_models::{InputSettings, VideoMetadata};

pub use anchor::{estimate_text_width, Anchor, AnchorLayout, Placement};
pub use builder::{parse_creation_time, resolve_base_epoch, TextElementBuilder};
pub use date_format::{escape_text, split_lines, translate};
pub use element::{AnchorGroup, AnchorGrouping, Border, TextElement, TimeWindow};
pub use overlap::{max_passes, resolve_overlaps};

/// Laid-out text for one input.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub grouping: AnchorGrouping,
    /// Number of vertical adjustments made by overlap resolution
    pub adjustments: usize,
}

impl TextLayout {
    /// The `-vf` filter chain.
    pub fn filter_chain(&self) -> String {
        self.grouping.filter_chain()
    }

    pub fn is_empty(&self) -> bool {
        self.grouping.is_empty()
    }
}

/// Lay out all text for an input.
pub fn layout_input(input: &InputSettings, meta: &VideoMetadata) -> TextLayout {
    let mut grouping = TextElementBuilder::new(meta).build(input);

    let adjustments = if input.automatically_fix_overlapping_text {
        resolve_overlaps(&mut grouping)
    } else {
        0
    };

    debug!(
        input = %input.path,
        elements = grouping.len(),
        groups = grouping.groups().len(),
        adjustments,
        "Laid out text overlay"
    );

    TextLayout {
        grouping,
        adjustments,
    }
}

/// Build the `drawtext` filter chain for an input.
pub fn build_filter_chain(input: &InputSettings, meta: &VideoMetadata) -> String {
    layout_input(input, meta).filter_chain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vstamp_models::SubtitleSettings;

    fn input() -> InputSettings {
        let mut input = InputSettings::new("/videos/a.mp4");
        input.timestamp.use_metadata_creation_time = false;
        input.subtitles.push(SubtitleSettings::new("Hello", 0.0, 5.0));
        input
    }

    #[test]
    fn test_layout_fixes_overlap_when_enabled() {
        let meta = VideoMetadata::with_size(1920, 1080);
        let layout = layout_input(&input(), &meta);
        assert_eq!(layout.adjustments, 1);
        assert_eq!(layout.grouping.len(), 2);
    }

    #[test]
    fn test_layout_leaves_overlap_when_disabled() {
        let meta = VideoMetadata::with_size(1920, 1080);
        let mut input = input();
        input.automatically_fix_overlapping_text = false;

        let layout = layout_input(&input, &meta);
        assert_eq!(layout.adjustments, 0);
        let ys: Vec<_> = layout.grouping.elements().map(|e| e.y_coord).collect();
        assert_eq!(ys[0], ys[1]);
    }

    #[test]
    fn test_filter_chain_has_one_filter_per_line() {
        let meta = VideoMetadata::with_size(1280, 720);
        let chain = build_filter_chain(&input(), &meta);
        let filters: Vec<_> = chain.split(",drawtext=").collect();
        assert_eq!(filters.len(), 2);
        assert!(filters[0].starts_with("drawtext=fontfile=''"));
        assert!(filters[1].ends_with(":text='Hello':enable='between(t,0,5)'"));
    }

    #[test]
    fn test_empty_layout() {
        let meta = VideoMetadata::with_size(1280, 720);
        let mut input = InputSettings::new("/videos/a.mp4");
        input.timestamp.enabled = false;
        let layout = layout_input(&input, &meta);
        assert!(layout.is_empty());
        assert_eq!(layout.filter_chain(), "");
    }
}
