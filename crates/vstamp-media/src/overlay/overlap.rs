//! Pushes apart text drawn at the same anchor at the same time.
//!
//! Within each anchor group every pair `(earlier, later)` is checked. A pair
//! collides when it is vertically closer than the later line's font size
//! plus [`LINE_GAP`], its estimated horizontal spans intersect, and the later
//! line becomes visible while the earlier one is showing. Bottom anchors
//! grow upward (the earlier line moves up); all others grow downward (the
//! later line moves down). Passes repeat until nothing moves.

use tracing::{debug, trace, warn};

use super::element::{AnchorGroup, AnchorGrouping, TextElement};

/// Minimum vertical gap between stacked lines, in pixels.
pub const LINE_GAP: f64 = 10.0;

/// Upper bound on passes per group.
pub const SAFE_CAP: usize = 5040;

/// Pass limit for a group of `count` elements: `count!`, capped.
pub fn max_passes(count: usize) -> usize {
    let mut passes: usize = 1;
    for n in 2..=count {
        passes = passes.saturating_mul(n);
        if passes >= SAFE_CAP {
            return SAFE_CAP;
        }
    }
    passes
}

/// Resolve overlaps in every group. Returns the number of adjustments made.
pub fn resolve_overlaps(grouping: &mut AnchorGrouping) -> usize {
    grouping.groups_mut().iter_mut().map(resolve_group).sum()
}

fn resolve_group(group: &mut AnchorGroup) -> usize {
    let count = group.elements.len();
    if count <= 1 {
        return 0;
    }

    let key = group.key();
    let upward = group.anchor.is_bottom();
    let cap = max_passes(count);
    debug!(anchor = key, count, cap, "Checking texts for overlap");

    let mut adjustments = 0;
    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;

        for i in 1..count {
            for j in 0..i {
                let Some(delta) = collision_delta(&group.elements[j], &group.elements[i]) else {
                    continue;
                };

                if upward {
                    group.elements[j].shift_vertical(-delta);
                } else {
                    group.elements[i].shift_vertical(delta);
                }
                debug!(
                    anchor = key,
                    pass = passes,
                    earlier = j,
                    later = i,
                    delta,
                    upward,
                    "Adjusted overlapping text"
                );
                adjustments += 1;
                changed = true;
            }
        }

        if !changed {
            break;
        }
        if passes >= cap {
            warn!(anchor = key, passes, "Overlap resolution hit its pass limit");
            break;
        }
    }

    adjustments
}

/// Whole pixels needed to separate `later` from `earlier`, if they collide.
///
/// Shifts under one pixel are not collisions.
fn collision_delta(earlier: &TextElement, later: &TextElement) -> Option<i64> {
    let threshold = f64::from(later.font_size) + LINE_GAP;
    let y_diff = (later.y_coord - earlier.y_coord).abs();

    let vertical = y_diff < threshold;
    let temporal = overlaps_in_time(earlier, later);
    let horizontal = overlaps_horizontally(earlier, later);
    trace!(
        y_diff,
        threshold,
        vertical,
        temporal,
        horizontal,
        "Overlap check"
    );

    if !(vertical && temporal && horizontal) {
        return None;
    }
    let delta = (threshold - y_diff).round() as i64;
    (delta >= 1).then_some(delta)
}

/// Unwindowed text is always visible; otherwise the later text must appear
/// while the earlier one is showing.
fn overlaps_in_time(earlier: &TextElement, later: &TextElement) -> bool {
    match (earlier.window, later.window) {
        (Some(e), Some(l)) => l.start >= e.start && l.start <= e.end,
        _ => true,
    }
}

fn overlaps_horizontally(a: &TextElement, b: &TextElement) -> bool {
    let a_end = a.x_coord + a.estimated_width();
    let b_end = b.x_coord + b.estimated_width();
    a.x_coord < b_end && b.x_coord < a_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::anchor::Anchor;
    use crate::overlay::builder::TextElementBuilder;
    use crate::overlay::element::TimeWindow;
    use vstamp_models::{FontSettings, PositionSettings, SubtitleSettings, VideoMetadata};

    fn element(anchor: Anchor, x: f64, y: f64, window: Option<TimeWindow>) -> TextElement {
        TextElement {
            content: "Hello world".to_string(),
            font_path: String::new(),
            font_size: 32,
            font_color: "white".to_string(),
            border: None,
            x_expr: x.to_string(),
            y_expr: y.to_string(),
            x_coord: x,
            y_coord: y,
            window,
            anchor,
        }
    }

    fn grouping(elements: Vec<TextElement>) -> AnchorGrouping {
        let mut grouping = AnchorGrouping::new();
        for e in elements {
            grouping.push(e);
        }
        grouping
    }

    fn ys(grouping: &AnchorGrouping) -> Vec<f64> {
        grouping.elements().map(|e| e.y_coord).collect()
    }

    fn assert_separated(grouping: &AnchorGrouping) {
        for group in grouping.groups() {
            for (i, later) in group.elements.iter().enumerate() {
                for earlier in &group.elements[..i] {
                    let gap = (later.y_coord - earlier.y_coord).abs();
                    assert!(
                        gap >= f64::from(later.font_size) + LINE_GAP,
                        "lines only {} apart",
                        gap
                    );
                }
            }
        }
    }

    #[test]
    fn test_max_passes() {
        assert_eq!(max_passes(0), 1);
        assert_eq!(max_passes(1), 1);
        assert_eq!(max_passes(2), 2);
        assert_eq!(max_passes(3), 6);
        assert_eq!(max_passes(6), 720);
        assert_eq!(max_passes(7), SAFE_CAP);
        assert_eq!(max_passes(500), SAFE_CAP);
    }

    #[test]
    fn test_single_element_group_is_untouched() {
        let mut g = grouping(vec![element(Anchor::TopLeft, 10.0, 10.0, None)]);
        let before = g.clone();
        assert_eq!(resolve_overlaps(&mut g), 0);
        assert_eq!(g, before);
    }

    #[test]
    fn test_top_anchor_moves_later_text_down() {
        let mut g = grouping(vec![
            element(Anchor::TopLeft, 96.0, 54.0, None),
            element(Anchor::TopLeft, 96.0, 54.0, None),
        ]);
        assert_eq!(resolve_overlaps(&mut g), 1);
        assert_eq!(ys(&g), vec![54.0, 96.0]);

        let later = &g.groups()[0].elements[1];
        assert_eq!(later.y_expr, "(54)+42");
        assert_separated(&g);
    }

    #[test]
    fn test_bottom_right_two_lines_move_earlier_up_by_42() {
        let meta = VideoMetadata::with_size(1920, 1080);
        let sub = SubtitleSettings::new("First line\nSecond line", 0.0, 4.0)
            .with_position(PositionSettings::anchored("bottomRight"));
        let mut g = grouping(TextElementBuilder::new(&meta).subtitle(&sub));

        let y = g.groups()[0].elements[0].y_coord;
        assert_eq!(g.groups()[0].elements[1].y_coord, y);

        assert_eq!(resolve_overlaps(&mut g), 1);
        let elements = &g.groups()[0].elements;
        assert!((elements[0].y_coord - (y - 42.0)).abs() < 1e-9);
        assert!((elements[1].y_coord - y).abs() < 1e-9);
        assert_eq!(elements[0].y_expr, "((1080-(1080*5/100)-32)+0)-42");
        assert_eq!(elements[1].y_expr, "(1080-(1080*5/100)-32)+0");
    }

    #[test]
    fn test_many_lines_end_up_separated() {
        let mut g = grouping(
            (0..5)
                .map(|_| element(Anchor::BottomLeft, 96.0, 994.0, None))
                .collect(),
        );
        assert!(resolve_overlaps(&mut g) > 0);
        assert_separated(&g);
        assert_eq!(resolve_overlaps(&mut g), 0);
    }

    #[test]
    fn test_second_resolve_is_a_no_op() {
        let mut g = grouping(vec![
            element(Anchor::Middle, 900.0, 524.0, None),
            element(Anchor::Middle, 905.0, 530.0, None),
            element(Anchor::Middle, 910.0, 520.0, None),
        ]);
        assert!(resolve_overlaps(&mut g) > 0);
        let resolved = g.clone();
        assert_eq!(resolve_overlaps(&mut g), 0);
        assert_eq!(g, resolved);
    }

    #[test]
    fn test_fractional_pad_resolves_in_whole_pixels() {
        let meta = VideoMetadata::with_size(1920, 1080);
        let builder = TextElementBuilder::new(&meta);
        let mut g = AnchorGrouping::new();
        for size in [33, 17, 48, 21] {
            let sub = SubtitleSettings::new("Fractional pad line", 0.0, 4.0)
                .with_font(FontSettings::default().with_size(size))
                .with_position(PositionSettings::anchored("topLeft").with_pad(0.3, 0.3));
            g.extend(grouping(builder.subtitle(&sub)));
        }

        assert!(resolve_overlaps(&mut g) > 0);
        assert_separated(&g);
        for e in g.elements() {
            assert_eq!(e.y_coord, e.y_coord.trunc(), "y = {}", e.y_coord);
            let shifts = e.y_expr.replace("(1080*0.3/100)+0", "").replace(['(', ')'], "");
            assert!(
                shifts
                    .split(['+', '-'])
                    .filter(|s| !s.is_empty())
                    .all(|s| s.parse::<u64>().is_ok()),
                "{}",
                e.y_expr
            );
        }

        let resolved = g.clone();
        assert_eq!(resolve_overlaps(&mut g), 0);
        assert_eq!(g, resolved);
    }

    #[test]
    fn test_fractional_pads_are_idempotent_everywhere() {
        let meta = VideoMetadata::with_size(1920, 1080);
        let builder = TextElementBuilder::new(&meta);
        for anchor in ["topLeft", "topRight", "middle", "bottomLeft", "bottomRight"] {
            for tenth in (0..1000).step_by(7) {
                let pad = f64::from(tenth) / 10.0;
                let mut g = AnchorGrouping::new();
                for size in [33, 17, 48, 21] {
                    let sub = SubtitleSettings::new("Line", 0.0, 4.0)
                        .with_font(FontSettings::default().with_size(size))
                        .with_position(PositionSettings::anchored(anchor).with_pad(pad, pad));
                    g.extend(grouping(builder.subtitle(&sub)));
                }
                resolve_overlaps(&mut g);
                assert_eq!(resolve_overlaps(&mut g), 0, "{} pad {}", anchor, pad);
            }
        }
    }

    #[test]
    fn test_subtitle_window_overlap() {
        // 5s + 3s ends at 8s, so a subtitle starting at 7s is still on screen.
        let meta = VideoMetadata::with_size(1920, 1080);
        let builder = TextElementBuilder::new(&meta);
        let first = SubtitleSettings::new("Hello", 5.0, 3.0);

        let mut g = grouping(builder.subtitle(&first));
        g.extend(grouping(builder.subtitle(&SubtitleSettings::new("Hello", 7.0, 3.0))));
        assert_eq!(resolve_overlaps(&mut g), 1);

        let mut g = grouping(builder.subtitle(&first));
        g.extend(grouping(builder.subtitle(&SubtitleSettings::new("Hello", 9.0, 3.0))));
        assert_eq!(resolve_overlaps(&mut g), 0);
    }

    #[test]
    fn test_later_text_starting_first_is_not_a_collision() {
        let mut g = grouping(vec![
            element(Anchor::TopLeft, 0.0, 0.0, TimeWindow::new(5.0, 8.0)),
            element(Anchor::TopLeft, 0.0, 0.0, TimeWindow::new(2.0, 6.0)),
        ]);
        assert_eq!(resolve_overlaps(&mut g), 0);
    }

    #[test]
    fn test_one_unwindowed_text_always_overlaps() {
        let mut g = grouping(vec![
            element(Anchor::TopLeft, 0.0, 0.0, None),
            element(Anchor::TopLeft, 0.0, 0.0, TimeWindow::new(100.0, 101.0)),
        ]);
        assert_eq!(resolve_overlaps(&mut g), 1);
    }

    #[test]
    fn test_disjoint_horizontal_spans_do_not_collide() {
        // "Hello world" at 32pt is estimated 176px wide
        let mut g = grouping(vec![
            element(Anchor::Origin, 0.0, 0.0, None),
            element(Anchor::Origin, 176.0, 0.0, None),
        ]);
        assert_eq!(resolve_overlaps(&mut g), 0);

        let mut g = grouping(vec![
            element(Anchor::Origin, 0.0, 0.0, None),
            element(Anchor::Origin, 175.0, 0.0, None),
        ]);
        assert_eq!(resolve_overlaps(&mut g), 1);
    }

    #[test]
    fn test_groups_are_independent() {
        let mut g = grouping(vec![
            element(Anchor::TopLeft, 96.0, 54.0, None),
            element(Anchor::TopRight, 96.0, 54.0, None),
        ]);
        assert_eq!(resolve_overlaps(&mut g), 0);
        assert_eq!(ys(&g), vec![54.0, 54.0]);
    }

    #[test]
    fn test_already_separated_lines_stay_put() {
        let mut g = grouping(vec![
            element(Anchor::TopLeft, 96.0, 54.0, None),
            element(Anchor::TopLeft, 96.0, 96.0, None),
        ]);
        assert_eq!(resolve_overlaps(&mut g), 0);
    }
}
