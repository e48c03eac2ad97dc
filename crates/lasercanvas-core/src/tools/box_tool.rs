//! Drag-to-create sessions for rectangles and frames.

use crate::shapes::{Frame, Rectangle, Shape, ShapeId};
use crate::store::{ShapeStore, StoreError};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// What a box session creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxKind {
    Rectangle,
    Frame,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxOutcome {
    /// The box was large enough and stays.
    Kept(ShapeId),
    /// The box was too small and has been deleted.
    Discarded,
}

#[derive(Debug, Clone)]
struct ActiveBox {
    id: ShapeId,
    kind: BoxKind,
    origin: Point,
}

/// Controller for one rectangle or frame being dragged out.
#[derive(Debug, Clone)]
pub struct BoxSession {
    active: Option<ActiveBox>,
    min_size: f64,
    /// While held, dragging moves the box instead of resizing it.
    space_held: bool,
}

impl BoxSession {
    pub fn new(min_size: f64) -> Self {
        Self {
            active: None,
            min_size,
            space_held: false,
        }
    }

    /// Id of the box being dragged.
    pub fn active(&self) -> Option<ShapeId> {
        self.active.as_ref().map(|b| b.id)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn set_space_held(&mut self, held: bool) {
        self.space_held = held;
    }

    pub fn space_held(&self) -> bool {
        self.space_held
    }

    /// Create a zero-sized box at `origin`.
    pub fn begin<S: ShapeStore + ?Sized>(&mut self, store: &mut S, kind: BoxKind, origin: Point) -> Option<ShapeId> {
        if self.active.is_some() {
            return None;
        }
        let shape = match kind {
            BoxKind::Rectangle => Shape::Rectangle(Rectangle::new(origin, 0.0, 0.0)),
            BoxKind::Frame => Shape::Frame(Frame::new(origin, 0.0, 0.0)),
        };
        match store.create(shape) {
            Ok(id) => {
                self.active = Some(ActiveBox { id, kind, origin });
                Some(id)
            }
            Err(e) => {
                log::warn!("Failed to create {:?}: {}", kind, e);
                None
            }
        }
    }

    /// Follow the pointer to `current`.
    pub fn drag<S: ShapeStore + ?Sized>(&mut self, store: &mut S, current: Point) {
        let Some(active) = &self.active else {
            return;
        };
        let (id, origin) = (active.id, active.origin);
        let moving = self.space_held;

        let result = store.update(id, &mut |shape| {
            if moving {
                if let Some((_, width, height)) = box_geometry(shape) {
                    set_box_geometry(shape, current, width, height);
                }
            } else {
                let (position, width, height) = Rectangle::from_drag(origin, current);
                set_box_geometry(shape, position, width, height);
            }
        });
        if let Err(e) = result {
            log::debug!("Dropping box session for {}: {}", id, e);
            self.active = None;
        }
    }

    /// Release the pointer. Boxes under the minimum size are deleted.
    pub fn finish<S: ShapeStore + ?Sized>(&mut self, store: &mut S) -> Option<BoxOutcome> {
        let active = self.active.take()?;
        let (_, width, height) = store.get(active.id).and_then(box_geometry)?;

        if width < self.min_size || height < self.min_size {
            log::debug!("Discarding {:?} {} ({}x{})", active.kind, active.id, width, height);
            if let Err(e) = store.delete(active.id) {
                log::debug!("Discarded box {} already gone: {}", active.id, e);
            }
            Some(BoxOutcome::Discarded)
        } else {
            Some(BoxOutcome::Kept(active.id))
        }
    }

    /// Delete the box being dragged. Idempotent.
    pub fn cancel<S: ShapeStore + ?Sized>(&mut self, store: &mut S) {
        self.space_held = false;
        let Some(active) = self.active.take() else {
            return;
        };
        match store.delete(active.id) {
            Ok(_) | Err(StoreError::NotFound(_)) => {}
            Err(e) => log::warn!("Failed to delete cancelled box {}: {}", active.id, e),
        }
    }
}

fn box_geometry(shape: &Shape) -> Option<(Point, f64, f64)> {
    match shape {
        Shape::Rectangle(r) => Some((r.position, r.width, r.height)),
        Shape::Frame(f) => Some((f.position, f.width, f.height)),
        Shape::Stroke(_) => None,
    }
}

fn set_box_geometry(shape: &mut Shape, position: Point, width: f64, height: f64) {
    match shape {
        Shape::Rectangle(r) => {
            r.position = position;
            r.width = width;
            r.height = height;
        }
        Shape::Frame(f) => {
            f.position = position;
            f.width = width;
            f.height = height;
        }
        Shape::Stroke(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryShapeStore;

    fn geometry(store: &MemoryShapeStore, id: ShapeId) -> (Point, f64, f64) {
        store.get(id).and_then(box_geometry).unwrap()
    }

    #[test]
    fn test_drag_resizes_from_origin() {
        let mut store = MemoryShapeStore::new();
        let mut session = BoxSession::new(5.0);
        let id = session.begin(&mut store, BoxKind::Rectangle, Point::new(10.0, 10.0)).unwrap();

        session.drag(&mut store, Point::new(0.0, 40.0));
        assert_eq!(geometry(&store, id), (Point::new(0.0, 10.0), 10.0, 30.0));

        assert_eq!(session.finish(&mut store), Some(BoxOutcome::Kept(id)));
        assert!(store.contains(id));
        assert!(!session.is_active());
    }

    #[test]
    fn test_space_moves_instead_of_resizing() {
        let mut store = MemoryShapeStore::new();
        let mut session = BoxSession::new(5.0);
        let id = session.begin(&mut store, BoxKind::Frame, Point::ZERO).unwrap();
        session.drag(&mut store, Point::new(20.0, 20.0));

        session.set_space_held(true);
        session.drag(&mut store, Point::new(50.0, 60.0));
        assert_eq!(geometry(&store, id), (Point::new(50.0, 60.0), 20.0, 20.0));

        session.set_space_held(false);
        session.drag(&mut store, Point::new(30.0, 30.0));
        assert_eq!(geometry(&store, id), (Point::ZERO, 30.0, 30.0));
    }

    #[test]
    fn test_small_box_discarded() {
        let mut store = MemoryShapeStore::new();
        let mut session = BoxSession::new(5.0);
        let id = session.begin(&mut store, BoxKind::Rectangle, Point::ZERO).unwrap();
        session.drag(&mut store, Point::new(100.0, 4.0));
        assert_eq!(session.finish(&mut store), Some(BoxOutcome::Discarded));
        assert!(!store.contains(id));
    }

    #[test]
    fn test_finish_without_session() {
        let mut store = MemoryShapeStore::new();
        let mut session = BoxSession::new(5.0);
        assert_eq!(session.finish(&mut store), None);
    }

    #[test]
    fn test_cancel_deletes_and_is_idempotent() {
        let mut store = MemoryShapeStore::new();
        let mut session = BoxSession::new(5.0);
        session.set_space_held(true);
        let id = session.begin(&mut store, BoxKind::Rectangle, Point::ZERO).unwrap();
        session.cancel(&mut store);
        session.cancel(&mut store);
        assert!(!store.contains(id));
        assert!(!session.space_held());
    }
}
