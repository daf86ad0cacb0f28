//! Anchor placement.
//!
//! Every anchor produces two positions for the same text: a symbolic
//! `drawtext` expression that FFmpeg evaluates at draw time against the real
//! glyph width (`text_w`), and a numeric estimate used only to decide whether
//! two texts collide.

use std::fmt;
use tracing::{trace, warn};

/// Fraction of the font size assumed per character when estimating width.
pub const CHAR_WIDTH_FACTOR: f64 = 0.5;

/// Named reference point on the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    /// Top-left corner without padding; offsets are absolute pixels
    #[default]
    Origin,
    TopLeft,
    TopMiddle,
    TopRight,
    MiddleLeft,
    Middle,
    MiddleRight,
    BottomLeft,
    BottomMiddle,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    /// All anchors other than the origin.
    pub const NAMED: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopMiddle,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::Middle,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomMiddle,
        Anchor::BottomRight,
    ];

    /// Look up an anchor by name, ignoring case and spaces.
    pub fn lookup(name: &str) -> Option<Self> {
        let normalized = normalize_anchor_name(name);
        if normalized == Anchor::Origin.key() {
            return Some(Anchor::Origin);
        }
        Self::NAMED
            .iter()
            .copied()
            .find(|anchor| anchor.key() == normalized)
    }

    /// Parse an anchor name, ignoring case and spaces.
    ///
    /// Unrecognized names fall back to [`Anchor::Origin`] with a warning.
    pub fn parse(name: &str) -> Self {
        Self::lookup(name).unwrap_or_else(|| {
            warn!(anchor = %name, "Unrecognized anchor, placing text at the origin");
            Anchor::Origin
        })
    }

    /// Canonical lowercase key used to group texts sharing this anchor.
    pub fn key(&self) -> &'static str {
        match self {
            Anchor::Origin => "origin",
            Anchor::TopLeft => "topleft",
            Anchor::TopMiddle => "topmiddle",
            Anchor::TopRight => "topright",
            Anchor::MiddleLeft => "middleleft",
            Anchor::Middle => "middle",
            Anchor::MiddleRight => "middleright",
            Anchor::BottomLeft => "bottomleft",
            Anchor::BottomMiddle => "bottommiddle",
            Anchor::BottomRight => "bottomright",
        }
    }

    /// Whether text at this anchor stacks upward from the bottom edge.
    pub fn is_bottom(&self) -> bool {
        self.key().contains("bottom")
    }

    fn grid(&self) -> Option<(Column, Row)> {
        let cell = match self {
            Anchor::Origin => return None,
            Anchor::TopLeft => (Column::Left, Row::Top),
            Anchor::TopMiddle => (Column::Middle, Row::Top),
            Anchor::TopRight => (Column::Right, Row::Top),
            Anchor::MiddleLeft => (Column::Left, Row::Middle),
            Anchor::Middle => (Column::Middle, Row::Middle),
            Anchor::MiddleRight => (Column::Right, Row::Middle),
            Anchor::BottomLeft => (Column::Left, Row::Bottom),
            Anchor::BottomMiddle => (Column::Middle, Row::Bottom),
            Anchor::BottomRight => (Column::Right, Row::Bottom),
        };
        Some(cell)
    }

    /// Resolve this anchor into a symbolic and a numeric position.
    pub fn resolve(&self, layout: &AnchorLayout) -> Placement {
        let placement = match self.grid() {
            None => Placement {
                x_expr: layout.x_offset.to_string(),
                y_expr: layout.y_offset.to_string(),
                x_coord: f64::from(layout.x_offset),
                y_coord: f64::from(layout.y_offset),
            },
            Some((column, row)) => {
                let (x_expr, x_coord) = resolve_column(column, layout);
                let (y_expr, y_coord) = resolve_row(row, layout);
                Placement {
                    x_expr,
                    y_expr,
                    x_coord: whole_pixels(x_coord),
                    y_coord: whole_pixels(y_coord),
                }
            }
        };

        trace!(
            anchor = self.key(),
            x_expr = %placement.x_expr,
            y_expr = %placement.y_expr,
            x = placement.x_coord,
            y = placement.y_coord,
            "Resolved anchor"
        );

        placement
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Lowercase an anchor name and strip its spaces.
pub fn normalize_anchor_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Truncate an estimated coordinate toward zero.
///
/// Values within a micro-pixel of an integer snap to it first, so
/// `1080 * 0.95` lands on 1026 rather than 1025.
pub fn whole_pixels(value: f64) -> f64 {
    ((value * 1e6).round() / 1e6).trunc()
}

/// Estimated rendered width of `char_count` characters at `font_size`.
///
/// This is a fixed heuristic, not a glyph measurement; overlap detection
/// is calibrated against it.
pub fn estimate_text_width(font_size: u32, char_count: usize) -> f64 {
    f64::from(font_size) * CHAR_WIDTH_FACTOR * char_count as f64
}

/// Inputs to anchor resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorLayout {
    /// Frame width in pixels
    pub frame_width: u32,
    /// Frame height in pixels
    pub frame_height: u32,
    /// Font size in points
    pub font_size: u32,
    /// Estimated text width, see [`estimate_text_width`]
    pub text_width: f64,
    /// Horizontal nudge in pixels
    pub x_offset: i32,
    /// Vertical nudge in pixels
    pub y_offset: i32,
    /// Horizontal margin, percent of the frame width
    pub x_pad: f64,
    /// Vertical margin, percent of the frame height
    pub y_pad: f64,
}

/// A resolved position in both representations.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// `drawtext` x expression
    pub x_expr: String,
    /// `drawtext` y expression
    pub y_expr: String,
    /// Estimated x in whole pixels
    pub x_coord: f64,
    /// Estimated y in whole pixels
    pub y_coord: f64,
}

fn resolve_column(column: Column, layout: &AnchorLayout) -> (String, f64) {
    let w = f64::from(layout.frame_width);
    let pad = layout.x_pad;
    let off = layout.x_offset;
    let tw = layout.text_width;

    match column {
        Column::Left => (
            format!("(w*{pad}/100)+{off}"),
            w * (pad / 100.0) + f64::from(off),
        ),
        Column::Middle => (
            format!("(w/2-text_w/2)+{off}"),
            w / 2.0 - tw / 2.0 + f64::from(off),
        ),
        Column::Right => (
            format!("(w-(w*{pad}/100)-text_w)+{off}"),
            w * (1.0 - pad / 100.0) - tw + f64::from(off),
        ),
    }
}

fn resolve_row(row: Row, layout: &AnchorLayout) -> (String, f64) {
    let h = layout.frame_height;
    let hf = f64::from(h);
    let pad = layout.y_pad;
    let off = layout.y_offset;
    let fs = layout.font_size;

    match row {
        Row::Top => (
            format!("({h}*{pad}/100)+{off}"),
            hf * (pad / 100.0) + f64::from(off),
        ),
        Row::Middle => (
            format!("({h}/2-{fs}/2)+{off}"),
            hf / 2.0 - f64::from(fs) / 2.0 + f64::from(off),
        ),
        Row::Bottom => (
            format!("({h}-({h}*{pad}/100)-{fs})+{off}"),
            hf * (1.0 - pad / 100.0) - f64::from(fs) + f64::from(off),
        ),
    }
}
