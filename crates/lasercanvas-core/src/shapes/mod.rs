//! Shape definitions held by the shape store.

mod frame;
mod rectangle;
mod stroke;

pub use frame::Frame;
pub use rectangle::Rectangle;
pub use stroke::Stroke;

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Light gray used for rectangle fills.
    pub fn light_gray() -> Self {
        Self::new(0xD9, 0xD9, 0xD9, 255)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        let alpha = (self.stroke_color.a as f64 * self.opacity.clamp(0.0, 1.0)) as u8;
        self.stroke_color.with_alpha(alpha).into()
    }

    /// Style of a pointer-mode (laser) stroke: white, large.
    pub fn pointer(stroke_width: f64, opacity: f64) -> Self {
        Self {
            stroke_color: SerializableColor::white(),
            stroke_width,
            fill_color: None,
            opacity,
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 4.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

/// Discriminant of [`Shape`], handy for predicates and hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Stroke,
    Rectangle,
    Frame,
}

/// Enum wrapper for all shape types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Stroke(Stroke),
    Rectangle(Rectangle),
    Frame(Frame),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Stroke(s) => s.id,
            Shape::Rectangle(s) => s.id,
            Shape::Frame(s) => s.id,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Stroke(_) => ShapeKind::Stroke,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Frame(_) => ShapeKind::Frame,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Stroke(s) => s.bounds(),
            Shape::Rectangle(s) => s.bounds(),
            Shape::Frame(s) => s.bounds(),
        }
    }

    /// Bounds containment only; precise hit-testing belongs to the host editor.
    pub fn contains(&self, point: Point) -> bool {
        let bounds = self.bounds();
        point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
    }

    /// Parent shape (frames are always top-level).
    pub fn parent(&self) -> Option<ShapeId> {
        match self {
            Shape::Stroke(s) => s.parent,
            Shape::Rectangle(s) => s.parent,
            Shape::Frame(_) => None,
        }
    }

    pub fn set_parent(&mut self, parent: Option<ShapeId>) {
        match self {
            Shape::Stroke(s) => s.parent = parent,
            Shape::Rectangle(s) => s.parent = parent,
            Shape::Frame(_) => {}
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Stroke(s) => &s.style,
            Shape::Rectangle(s) => &s.style,
            Shape::Frame(s) => &s.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Stroke(s) => &mut s.style,
            Shape::Rectangle(s) => &mut s.style,
            Shape::Frame(s) => &mut s.style,
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Shape::Stroke(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_stroke_mut(&mut self) -> Option<&mut Stroke> {
        match self {
            Shape::Stroke(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Shape::Frame(f) => Some(f),
            _ => None,
        }
    }

    /// Stroke that is both transient and complete.
    pub fn is_finished_pointer_stroke(&self) -> bool {
        self.as_stroke().is_some_and(|s| s.transient && s.complete)
    }
}

/// Bounding box of a set of points, `Rect::ZERO` when empty.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// Generate a fresh shape identifier.
pub(crate) fn new_shape_id() -> ShapeId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;

    #[test]
    fn test_color_roundtrip_through_peniko() {
        let color = SerializableColor::new(10, 20, 30, 40);
        let peniko: Color = color.into();
        assert_eq!(SerializableColor::from(peniko), color);
    }

    #[test]
    fn test_stroke_with_opacity() {
        let style = ShapeStyle::pointer(4.0, 0.5);
        let color = SerializableColor::from(style.stroke_with_opacity());
        assert_eq!(color.a, 127);
    }

    #[test]
    fn test_shape_serde_is_tagged() {
        let shape = Shape::Stroke(Stroke::begin(Point::new(1.0, 2.0), true, Timestamp(5)));
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"type\":\"stroke\""));
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn test_frames_ignore_parent() {
        let mut shape = Shape::Frame(Frame::new(Point::ZERO, 10.0, 10.0));
        shape.set_parent(Some(new_shape_id()));
        assert_eq!(shape.parent(), None);
    }

    #[test]
    fn test_points_bounds() {
        let bounds = points_bounds(&[
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ]);
        assert_eq!(bounds, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(points_bounds(&[]), Rect::ZERO);
    }
}
