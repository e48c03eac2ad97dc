//! Rectangle shape.

use super::{new_shape_id, SerializableColor, ShapeId, ShapeStyle};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A filled, borderless rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    /// Parent frame, `None` for page-level shapes.
    #[serde(default)]
    pub parent: Option<ShapeId>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: new_shape_id(),
            position,
            width,
            height,
            parent: None,
            style: ShapeStyle {
                stroke_color: SerializableColor::light_gray().with_alpha(0),
                stroke_width: 0.0,
                fill_color: Some(SerializableColor::light_gray()),
                opacity: 1.0,
            },
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Geometry of a drag from `origin` to `current`.
    ///
    /// The origin stays a corner; dragging left or up moves the top-left
    /// corner instead of producing a negative size.
    pub fn from_drag(origin: Point, current: Point) -> (Point, f64, f64) {
        let delta = current - origin;
        let x = if delta.x < 0.0 { origin.x + delta.x } else { origin.x };
        let y = if delta.y < 0.0 { origin.y + delta.y } else { origin.y };
        (Point::new(x, y), delta.x.abs(), delta.y.abs())
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_drag_down_right() {
        let (pos, w, h) = Rectangle::from_drag(Point::new(10.0, 10.0), Point::new(40.0, 30.0));
        assert_eq!(pos, Point::new(10.0, 10.0));
        assert_eq!((w, h), (30.0, 20.0));
    }

    #[test]
    fn test_from_drag_up_left_keeps_origin_as_corner() {
        let (pos, w, h) = Rectangle::from_drag(Point::new(10.0, 10.0), Point::new(-5.0, 0.0));
        assert_eq!(pos, Point::new(-5.0, 0.0));
        assert_eq!((w, h), (15.0, 10.0));
    }

    #[test]
    fn test_bounds() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        assert_eq!(rect.bounds(), Rect::new(10.0, 20.0, 110.0, 70.0));
        assert!(rect.style.fill_color.is_some());
    }
}
