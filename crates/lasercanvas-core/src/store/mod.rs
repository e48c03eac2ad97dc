//! Shape store abstraction.
//!
//! The store is the host editor's record of every shape on the page. The
//! drawing session and the pointer lifecycle only talk to it through the
//! [`ShapeStore`] trait, so a real editor can stand in for
//! [`MemoryShapeStore`].

mod hooks;
mod memory;

pub use hooks::{DetachFromFrames, FrameLabeler, FRAME_LABELS};
pub use memory::MemoryShapeStore;

use crate::shapes::{Shape, ShapeId, ShapeKind};
use std::collections::HashMap;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Shape not found: {0}")]
    NotFound(ShapeId),
    #[error("Shape id already used: {0}")]
    IdReused(ShapeId),
    #[error("Shape {id} is a {actual:?}, expected {expected:?}")]
    WrongKind {
        id: ShapeId,
        expected: ShapeKind,
        actual: ShapeKind,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A mutation that has been applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Created(ShapeId),
    Updated(ShapeId),
    Deleted(ShapeId),
}

impl StoreChange {
    pub fn id(&self) -> ShapeId {
        match *self {
            StoreChange::Created(id) | StoreChange::Updated(id) | StoreChange::Deleted(id) => id,
        }
    }
}

/// Change listener registered with [`ShapeStore::subscribe`].
pub type Listener = Box<dyn FnMut(&StoreChange)>;

/// Handle returned by [`ShapeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Handle returned by [`MemoryShapeStore::register_hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub(crate) u64);

/// Read-only view of the store handed to hooks while a mutation is pending.
pub struct HookContext<'a> {
    shapes: &'a HashMap<ShapeId, Shape>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(shapes: &'a HashMap<ShapeId, Shape>) -> Self {
        Self { shapes }
    }

    pub fn get(&self, id: ShapeId) -> Option<&'a Shape> {
        self.shapes.get(&id)
    }

    pub fn kind_of(&self, id: ShapeId) -> Option<ShapeKind> {
        self.get(id).map(Shape::kind)
    }
}

/// Middleware run by the store before a shape is written.
///
/// Hooks run in registration order; each sees the output of the previous one.
pub trait ShapeHook {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Adjust a shape about to be created.
    fn before_create(&mut self, _shape: &mut Shape, _ctx: &HookContext<'_>) {}

    /// Adjust a shape about to replace `prev`.
    fn before_update(&mut self, _prev: &Shape, _next: &mut Shape, _ctx: &HookContext<'_>) {}
}

/// Shape persistence primitives consumed from the host editor.
pub trait ShapeStore {
    /// Insert a new shape. Fails if its id is live or was ever deleted.
    fn create(&mut self, shape: Shape) -> StoreResult<ShapeId>;

    /// Look up a shape.
    fn get(&self, id: ShapeId) -> Option<&Shape>;

    /// Apply a partial change to an existing shape.
    fn update(&mut self, id: ShapeId, patch: &mut dyn FnMut(&mut Shape)) -> StoreResult<()>;

    /// Remove a shape, returning it.
    fn delete(&mut self, id: ShapeId) -> StoreResult<Shape>;

    /// Ids of all shapes matching `predicate`, back to front.
    fn query(&self, predicate: &dyn Fn(&Shape) -> bool) -> Vec<ShapeId>;

    /// Register a change listener.
    fn subscribe(&mut self, listener: Listener) -> SubscriptionId;

    /// Remove a change listener. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Check if a shape exists.
    fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }
}
