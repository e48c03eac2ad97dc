//! In-memory shape store.

use super::{
    HookContext, HookId, Listener, ShapeHook, ShapeStore, StoreChange, StoreError, StoreResult,
    SubscriptionId,
};
use crate::shapes::{Shape, ShapeId};
use kurbo::Point;
use std::collections::{HashMap, HashSet};

/// In-memory store for tests, the headless shell and ephemeral use.
#[derive(Default)]
pub struct MemoryShapeStore {
    /// All shapes, keyed by ID.
    shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    z_order: Vec<ShapeId>,
    /// Ids that were deleted and may never come back. Never pruned, so
    /// `create` can reject a reused id for the store's whole lifetime.
    tombstones: HashSet<ShapeId>,
    hooks: Vec<(HookId, Box<dyn ShapeHook>)>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_handle: u64,
}

impl MemoryShapeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `shapes` (e.g. restored from disk).
    ///
    /// Hooks are not run and listeners are not notified.
    pub fn from_shapes(shapes: impl IntoIterator<Item = Shape>) -> Self {
        let mut store = Self::new();
        for shape in shapes {
            let id = shape.id();
            if store.shapes.insert(id, shape).is_none() {
                store.z_order.push(id);
            }
        }
        store
    }

    /// Register a creation/update hook. Hooks run in registration order.
    pub fn register_hook(&mut self, hook: Box<dyn ShapeHook>) -> HookId {
        let id = HookId(self.next_handle());
        log::debug!("Registered shape hook '{}'", hook.name());
        self.hooks.push((id, hook));
        id
    }

    /// Remove a hook. Returns false if it was not registered.
    pub fn unregister_hook(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hook_id, _)| *hook_id != id);
        self.hooks.len() != before
    }

    /// Shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Clone every shape, back to front.
    pub fn snapshot(&self) -> Vec<Shape> {
        self.shapes_ordered().cloned().collect()
    }

    /// Shapes whose bounds contain `point`, front to back.
    pub fn shapes_at_point(&self, point: Point) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter(|id| self.shapes.get(id).is_some_and(|s| s.contains(point)))
            .copied()
            .collect()
    }

    /// Check if an id was deleted at some point.
    pub fn was_deleted(&self, id: ShapeId) -> bool {
        self.tombstones.contains(&id)
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn notify(&mut self, change: StoreChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

impl ShapeStore for MemoryShapeStore {
    fn create(&mut self, mut shape: Shape) -> StoreResult<ShapeId> {
        let id = shape.id();
        if self.shapes.contains_key(&id) || self.tombstones.contains(&id) {
            return Err(StoreError::IdReused(id));
        }

        let ctx = HookContext::new(&self.shapes);
        for (_, hook) in self.hooks.iter_mut() {
            hook.before_create(&mut shape, &ctx);
        }

        self.z_order.push(id);
        self.shapes.insert(id, shape);
        self.notify(StoreChange::Created(id));
        Ok(id)
    }

    fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    fn update(&mut self, id: ShapeId, patch: &mut dyn FnMut(&mut Shape)) -> StoreResult<()> {
        let prev = self.shapes.get(&id).ok_or(StoreError::NotFound(id))?;
        let mut next = prev.clone();
        patch(&mut next);

        // Identity and kind are fixed for a shape's lifetime.
        if next.id() != id {
            return Err(StoreError::IdReused(next.id()));
        }
        if next.kind() != prev.kind() {
            return Err(StoreError::WrongKind {
                id,
                expected: prev.kind(),
                actual: next.kind(),
            });
        }

        let ctx = HookContext::new(&self.shapes);
        for (_, hook) in self.hooks.iter_mut() {
            hook.before_update(prev, &mut next, &ctx);
        }

        self.shapes.insert(id, next);
        self.notify(StoreChange::Updated(id));
        Ok(())
    }

    fn delete(&mut self, id: ShapeId) -> StoreResult<Shape> {
        let shape = self.shapes.remove(&id).ok_or(StoreError::NotFound(id))?;
        self.z_order.retain(|&shape_id| shape_id != id);
        self.tombstones.insert(id);
        self.notify(StoreChange::Deleted(id));
        Ok(shape)
    }

    fn query(&self, predicate: &dyn Fn(&Shape) -> bool) -> Vec<ShapeId> {
        self.shapes_ordered()
            .filter(|shape| predicate(shape))
            .map(Shape::id)
            .collect()
    }

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_handle());
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sub_id, _)| *sub_id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::shapes::{Frame, Rectangle, ShapeKind, Stroke};
    use crate::store::HookContext;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn stroke() -> Shape {
        Shape::Stroke(Stroke::begin(Point::new(1.0, 1.0), false, Timestamp(0)))
    }

    #[test]
    fn test_create_and_get() {
        let mut store = MemoryShapeStore::new();
        let id = store.create(stroke()).unwrap();
        assert!(store.contains(id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_rejects_live_and_deleted_ids() {
        let mut store = MemoryShapeStore::new();
        let shape = stroke();
        let id = store.create(shape.clone()).unwrap();
        assert_eq!(store.create(shape.clone()), Err(StoreError::IdReused(id)));

        store.delete(id).unwrap();
        assert!(store.was_deleted(id));
        assert_eq!(store.create(shape), Err(StoreError::IdReused(id)));
    }

    #[test]
    fn test_delete_missing() {
        let mut store = MemoryShapeStore::new();
        let id = store.create(stroke()).unwrap();
        store.delete(id).unwrap();
        assert!(matches!(store.delete(id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_update_patches_shape() {
        let mut store = MemoryShapeStore::new();
        let id = store.create(stroke()).unwrap();
        store
            .update(id, &mut |shape| {
                if let Some(s) = shape.as_stroke_mut() {
                    s.push_point(Point::new(5.0, 5.0));
                }
            })
            .unwrap();
        assert_eq!(store.get(id).and_then(Shape::as_stroke).map(Stroke::len), Some(3));
    }

    #[test]
    fn test_update_cannot_change_kind() {
        let mut store = MemoryShapeStore::new();
        let id = store.create(stroke()).unwrap();
        let result = store.update(id, &mut |shape| {
            let mut rect = Rectangle::new(Point::ZERO, 1.0, 1.0);
            rect.id = shape.id();
            *shape = Shape::Rectangle(rect);
        });
        assert!(matches!(result, Err(StoreError::WrongKind { .. })));
        assert_eq!(store.get(id).map(Shape::kind), Some(ShapeKind::Stroke));
    }

    #[test]
    fn test_listeners_see_every_change() {
        let mut store = MemoryShapeStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sub = store.subscribe(Box::new(move |change| sink.borrow_mut().push(*change)));

        let id = store.create(stroke()).unwrap();
        store.update(id, &mut |_| {}).unwrap();
        store.delete(id).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![StoreChange::Created(id), StoreChange::Updated(id), StoreChange::Deleted(id)]
        );

        store.unsubscribe(sub);
        store.create(stroke()).unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    struct Recorder(&'static str, Rc<RefCell<Vec<&'static str>>>);

    impl ShapeHook for Recorder {
        fn name(&self) -> &'static str {
            self.0
        }

        fn before_create(&mut self, shape: &mut Shape, _ctx: &HookContext<'_>) {
            self.1.borrow_mut().push(self.0);
            shape.style_mut().stroke_width += 1.0;
        }
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let mut store = MemoryShapeStore::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        store.register_hook(Box::new(Recorder("first", order.clone())));
        let second = store.register_hook(Box::new(Recorder("second", order.clone())));

        let id = store.create(stroke()).unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(store.get(id).map(|s| s.style().stroke_width), Some(6.0));

        assert!(store.unregister_hook(second));
        assert!(!store.unregister_hook(second));
        store.create(stroke()).unwrap();
        assert_eq!(order.borrow().len(), 3);
    }

    #[test]
    fn test_shapes_at_point_front_to_back() {
        let mut store = MemoryShapeStore::new();
        let back = store
            .create(Shape::Frame(Frame::new(Point::ZERO, 100.0, 100.0)))
            .unwrap();
        let front = store
            .create(Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 20.0, 20.0)))
            .unwrap();

        assert_eq!(store.shapes_at_point(Point::new(15.0, 15.0)), vec![front, back]);
        assert_eq!(store.shapes_at_point(Point::new(90.0, 90.0)), vec![back]);
        assert!(store.shapes_at_point(Point::new(200.0, 0.0)).is_empty());
    }

    #[test]
    fn test_from_shapes_keeps_order() {
        let a = stroke();
        let b = stroke();
        let store = MemoryShapeStore::from_shapes(vec![a.clone(), b.clone()]);
        assert_eq!(store.query(&|_| true), vec![a.id(), b.id()]);
        assert_eq!(store.snapshot(), vec![a, b]);
    }
}
