//! Frame shape: a named, top-level region of the page.

use super::{new_shape_id, ShapeId, ShapeStyle};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Label shown above the frame.
    #[serde(default)]
    pub name: String,
    pub style: ShapeStyle,
}

impl Frame {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: new_shape_id(),
            position,
            width,
            height,
            name: String::new(),
            style: ShapeStyle::default(),
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
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
