//! Freehand stroke shape.

use super::{new_shape_id, points_bounds, ShapeId, ShapeStyle};
use crate::clock::Timestamp;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand drawing in page space.
///
/// Once created a stroke always has at least two points: the origin is
/// duplicated so the first segment exists before the pointer moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ShapeId,
    /// Points in the stroke path, append-only while drawing.
    pub points: Vec<Point>,
    /// Set once when the pointer is released.
    pub complete: bool,
    /// Drawn in pointer mode; removed automatically after fading.
    pub transient: bool,
    /// When the pointer went down.
    pub created_at: Timestamp,
    /// When the pointer went up.
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    /// Parent frame, `None` for page-level shapes.
    #[serde(default)]
    pub parent: Option<ShapeId>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Stroke {
    /// Start a stroke at `origin`.
    pub fn begin(origin: Point, transient: bool, now: Timestamp) -> Self {
        Self {
            id: new_shape_id(),
            points: vec![origin, origin],
            complete: false,
            transient,
            created_at: now,
            completed_at: None,
            parent: None,
            style: ShapeStyle::default(),
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Append a point to the path.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Mark the stroke complete. Returns false if it already was.
    pub fn finish(&mut self, now: Timestamp) -> bool {
        if self.complete {
            return false;
        }
        self.complete = true;
        self.completed_at = Some(now);
        true
    }

    /// Time the stroke's age is measured from: completion if known, else creation.
    pub fn age_anchor(&self) -> Timestamp {
        self.completed_at.unwrap_or(self.created_at)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }
}
