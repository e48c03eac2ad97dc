//! Freehand drawing sessions.
//!
//! A [`DrawSession`] owns the one stroke being drawn between pointer-down
//! and pointer-up. Nothing else writes to a stroke while it is incomplete;
//! on `complete` ownership passes to the store (or to the pointer
//! lifecycle for transient strokes), on `cancel` the stroke is deleted.
//!
//! Every entry point tolerates out-of-order delivery: calls that make no
//! sense in the current state are ignored rather than reported.

use crate::clock::Timestamp;
use crate::shapes::{Shape, ShapeId, ShapeStyle, Stroke};
use crate::store::{ShapeStore, StoreError};
use kurbo::Point;

/// Controller for at most one in-progress stroke.
#[derive(Debug, Clone, Default)]
pub struct DrawSession {
    active: Option<ShapeId>,
    /// Style applied to transient strokes.
    pointer_style: Option<ShapeStyle>,
}

impl DrawSession {
    /// Create an idle session controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `style` for transient strokes instead of the default pointer style.
    pub fn with_pointer_style(style: ShapeStyle) -> Self {
        Self {
            active: None,
            pointer_style: Some(style),
        }
    }

    /// Id of the stroke being drawn.
    pub fn active(&self) -> Option<ShapeId> {
        self.active
    }

    /// Check if a stroke is being drawn.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start a stroke at `origin` (page space).
    ///
    /// Returns `None` without touching the store if a stroke is already
    /// in progress, or if the store rejects the new shape.
    pub fn begin<S: ShapeStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: Point,
        transient: bool,
        now: Timestamp,
    ) -> Option<ShapeId> {
        if self.active.is_some() {
            log::debug!("Ignoring stroke begin: session already active");
            return None;
        }

        let mut stroke = Stroke::begin(origin, transient, now);
        if transient {
            stroke.style = self
                .pointer_style
                .clone()
                .unwrap_or_else(|| ShapeStyle::pointer(4.0, 0.9));
        }

        match store.create(Shape::Stroke(stroke)) {
            Ok(id) => {
                log::debug!("Began {} stroke {}", if transient { "pointer" } else { "ink" }, id);
                self.active = Some(id);
                Some(id)
            }
            Err(e) => {
                log::warn!("Failed to create stroke: {}", e);
                None
            }
        }
    }

    /// Append `point` to the active stroke.
    pub fn extend<S: ShapeStore + ?Sized>(&mut self, store: &mut S, point: Point) {
        let Some(id) = self.active else {
            return;
        };
        let result = store.update(id, &mut |shape| {
            if let Some(stroke) = shape.as_stroke_mut() {
                stroke.push_point(point);
            }
        });
        if let Err(e) = result {
            // Removed behind our back; there is nothing left to draw into.
            log::debug!("Dropping session for stroke {}: {}", id, e);
            self.active = None;
        }
    }

    /// Finish the active stroke and hand it over. Returns its id.
    pub fn complete<S: ShapeStore + ?Sized>(&mut self, store: &mut S, now: Timestamp) -> Option<ShapeId> {
        let id = self.active.take()?;
        match store.update(id, &mut |shape| {
            if let Some(stroke) = shape.as_stroke_mut() {
                stroke.finish(now);
            }
        }) {
            Ok(()) => {
                log::debug!("Completed stroke {}", id);
                Some(id)
            }
            Err(e) => {
                log::debug!("Stroke {} vanished before completion: {}", id, e);
                None
            }
        }
    }

    /// Discard the active stroke entirely. Idempotent.
    pub fn cancel<S: ShapeStore + ?Sized>(&mut self, store: &mut S) {
        let Some(id) = self.active.take() else {
            return;
        };
        match store.delete(id) {
            Ok(_) => log::debug!("Cancelled stroke {}", id),
            Err(StoreError::NotFound(_)) => log::debug!("Cancelled stroke {} was already gone", id),
            Err(e) => log::warn!("Failed to delete cancelled stroke {}: {}", id, e),
        }
    }

    /// The host took input away (focus loss, tool switch).
    pub fn interrupt<S: ShapeStore + ?Sized>(&mut self, store: &mut S) {
        self.cancel(store);
    }
}
