//! Frame interaction and presentation state.
//!
//! Both functions are pure: the canvas recomputes them from store state
//! whenever it needs them instead of mirroring flags onto shapes.

use crate::shapes::{Shape, ShapeId, ShapeKind};
use kurbo::{Point, Rect};
use std::collections::HashSet;

/// Pick the frame a select-tool press should grab, if any.
///
/// The last frame (in z-order) containing `point` wins, but only if it is
/// also the topmost shape there (or nothing is). When the viewport sits
/// entirely inside the frame no edge is visible, so the press is left to
/// the frame's contents.
pub fn frame_to_capture<'a>(
    point: Point,
    frames: impl IntoIterator<Item = &'a Shape>,
    top_shape: Option<&Shape>,
    viewport: Rect,
) -> Option<ShapeId> {
    let (id, bounds) = frames
        .into_iter()
        .filter(|shape| shape.kind() == ShapeKind::Frame && shape.contains(point))
        .map(|shape| (shape.id(), shape.bounds()))
        .last()?;

    if let Some(top) = top_shape {
        if top.id() != id {
            return None;
        }
    }

    let viewport_inside = viewport.x0 > bounds.x0
        && viewport.x1 < bounds.x1
        && viewport.y0 > bounds.y0
        && viewport.y1 < bounds.y1;
    if viewport_inside {
        return None;
    }
    Some(id)
}

/// Presentation flags of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAttrs {
    pub id: ShapeId,
    pub hovered: bool,
    pub selected: bool,
}

/// Hover/selection flags for every frame in `shapes`.
pub fn frame_presentation<'a>(
    shapes: impl IntoIterator<Item = &'a Shape>,
    hovered: Option<ShapeId>,
    selected: &HashSet<ShapeId>,
) -> Vec<FrameAttrs> {
    shapes
        .into_iter()
        .filter(|shape| shape.kind() == ShapeKind::Frame)
        .map(|shape| {
            let id = shape.id();
            FrameAttrs {
                id,
                hovered: hovered == Some(id),
                selected: selected.contains(&id),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Frame, Rectangle};

    fn frame(x: f64, y: f64, size: f64) -> Shape {
        Shape::Frame(Frame::new(Point::new(x, y), size, size))
    }

    fn wide_viewport() -> Rect {
        Rect::new(-1_000.0, -1_000.0, 1_000.0, 1_000.0)
    }

    #[test]
    fn test_captures_frame_under_point() {
        let f = frame(0.0, 0.0, 100.0);
        let got = frame_to_capture(Point::new(50.0, 50.0), [&f], Some(&f), wide_viewport());
        assert_eq!(got, Some(f.id()));
    }

    #[test]
    fn test_prefers_last_frame() {
        let below = frame(0.0, 0.0, 100.0);
        let above = frame(25.0, 25.0, 50.0);
        let got = frame_to_capture(Point::new(50.0, 50.0), [&below, &above], None, wide_viewport());
        assert_eq!(got, Some(above.id()));
    }

    #[test]
    fn test_other_shape_on_top_blocks_capture() {
        let f = frame(0.0, 0.0, 100.0);
        let rect = Shape::Rectangle(Rectangle::new(Point::new(40.0, 40.0), 20.0, 20.0));
        let got = frame_to_capture(Point::new(50.0, 50.0), [&f], Some(&rect), wide_viewport());
        assert_eq!(got, None);
    }

    #[test]
    fn test_viewport_inside_frame_blocks_capture() {
        let f = frame(0.0, 0.0, 1_000.0);
        let viewport = Rect::new(100.0, 100.0, 900.0, 700.0);
        assert_eq!(frame_to_capture(Point::new(500.0, 500.0), [&f], Some(&f), viewport), None);

        let edge_visible = Rect::new(-10.0, 100.0, 900.0, 700.0);
        assert_eq!(
            frame_to_capture(Point::new(500.0, 500.0), [&f], Some(&f), edge_visible),
            Some(f.id())
        );
    }

    #[test]
    fn test_miss() {
        let f = frame(0.0, 0.0, 100.0);
        assert_eq!(frame_to_capture(Point::new(150.0, 50.0), [&f], None, wide_viewport()), None);
    }

    #[test]
    fn test_presentation_flags() {
        let a = frame(0.0, 0.0, 10.0);
        let b = frame(20.0, 0.0, 10.0);
        let rect = Shape::Rectangle(Rectangle::new(Point::ZERO, 5.0, 5.0));
        let selected: HashSet<_> = [b.id(), rect.id()].into_iter().collect();

        let attrs = frame_presentation([&a, &rect, &b], Some(a.id()), &selected);
        assert_eq!(
            attrs,
            vec![
                FrameAttrs { id: a.id(), hovered: true, selected: false },
                FrameAttrs { id: b.id(), hovered: false, selected: true },
            ]
        );
        assert!(frame_presentation([&a], None, &HashSet::new())
            .iter()
            .all(|f| !f.hovered && !f.selected));
    }
}
