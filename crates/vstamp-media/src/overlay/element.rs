//! Positioned text draw operations and their anchor grouping.

use std::fmt::Write as _;

use super::anchor::{estimate_text_width, Anchor};

/// Text outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub color: String,
    pub width: u32,
}

/// Span of clip time during which text is visible, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    /// Window from `start` to `end`, or `None` unless `end > start >= 0`.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        if start.is_finite() && end.is_finite() && start >= 0.0 && end > start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Window built from optional bounds; both must be present.
    pub fn from_bounds(start: Option<f64>, end: Option<f64>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => None,
        }
    }

    /// `drawtext` enable predicate for this window.
    pub fn enable_expr(&self) -> String {
        format!("between(t,{},{})", self.start, self.end)
    }
}

/// One line of text drawn with one `drawtext` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    /// Escaped text or `%{...}` expansion
    pub content: String,
    pub font_path: String,
    pub font_size: u32,
    pub font_color: String,
    pub border: Option<Border>,
    /// Symbolic position evaluated by FFmpeg
    pub x_expr: String,
    pub y_expr: String,
    /// Estimated position in whole pixels, used for overlap checks only
    pub x_coord: f64,
    pub y_coord: f64,
    pub window: Option<TimeWindow>,
    pub anchor: Anchor,
}

impl TextElement {
    /// Canonical key of the anchor this element is grouped under.
    pub fn anchor_key(&self) -> &'static str {
        self.anchor.key()
    }

    /// Estimated rendered width of the full content.
    pub fn estimated_width(&self) -> f64 {
        estimate_text_width(self.font_size, self.content.chars().count())
    }

    /// Move the element vertically by whole pixels, keeping both positions
    /// in sync. A zero shift leaves the element untouched.
    pub fn shift_vertical(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        let sign = if delta > 0 { '+' } else { '-' };
        self.y_expr = format!("({}){}{}", self.y_expr, sign, delta.unsigned_abs());
        self.y_coord += delta as f64;
    }

    /// Serialize as a `drawtext=...` filter.
    pub fn to_drawtext(&self) -> String {
        let mut out = String::with_capacity(128 + self.content.len());
        out.push_str("drawtext=");
        let _ = write!(out, "fontfile='{}':", self.font_path);
        let _ = write!(out, "fontsize={}:", self.font_size);
        let _ = write!(out, "fontcolor={}:", self.font_color);
        if let Some(border) = &self.border {
            let _ = write!(out, "bordercolor={}:", border.color);
            let _ = write!(out, "borderw={}:", border.width);
        }
        let _ = write!(out, "x={}:", self.x_expr);
        let _ = write!(out, "y={}:", self.y_expr);
        let _ = write!(out, "text='{}'", self.content);
        if let Some(window) = &self.window {
            let _ = write!(out, ":enable='{}'", window.enable_expr());
        }
        out
    }
}

/// Elements sharing one anchor, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorGroup {
    pub anchor: Anchor,
    pub elements: Vec<TextElement>,
}

impl AnchorGroup {
    pub fn key(&self) -> &'static str {
        self.anchor.key()
    }
}

/// Ordered anchor key to element list mapping.
///
/// Groups keep the order in which their key first appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorGrouping {
    groups: Vec<AnchorGroup>,
}

impl AnchorGrouping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element to the group for its anchor.
    pub fn push(&mut self, element: TextElement) {
        match self
            .groups
            .iter_mut()
            .find(|group| group.anchor == element.anchor)
        {
            Some(group) => group.elements.push(element),
            None => self.groups.push(AnchorGroup {
                anchor: element.anchor,
                elements: vec![element],
            }),
        }
    }

    /// Append every element of another grouping, preserving its order.
    pub fn extend(&mut self, other: AnchorGrouping) {
        for element in other.into_elements() {
            self.push(element);
        }
    }

    /// Group for an anchor key, if any text uses it.
    pub fn get(&self, key: &str) -> Option<&AnchorGroup> {
        self.groups.iter().find(|group| group.key() == key)
    }

    pub fn groups(&self) -> &[AnchorGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [AnchorGroup] {
        &mut self.groups
    }

    /// All elements, group by group.
    pub fn elements(&self) -> impl Iterator<Item = &TextElement> {
        self.groups.iter().flat_map(|group| group.elements.iter())
    }

    pub fn into_elements(self) -> impl Iterator<Item = TextElement> {
        self.groups.into_iter().flat_map(|group| group.elements)
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.elements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.elements.is_empty())
    }

    /// One `drawtext` filter per element.
    pub fn to_filters(&self) -> Vec<String> {
        self.elements().map(TextElement::to_drawtext).collect()
    }

    /// All filters joined into a single `-vf` chain.
    pub fn filter_chain(&self) -> String {
        self.to_filters().join(",")
    }
}
