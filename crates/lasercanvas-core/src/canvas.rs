//! Canvas state: the store plus every controller that acts on it.
//!
//! The canvas is the only place where input, the clock and the timer
//! queue meet. Controllers never talk to each other directly; after each
//! operation the canvas drains store notifications and forwards the ones
//! the lifecycle cares about.

use crate::camera::Camera;
use crate::clock::{Clock, Timestamp};
use crate::config::CanvasConfig;
use crate::frames::{frame_presentation, frame_to_capture, FrameAttrs};
use crate::glow::GlowStyle;
use crate::input::{InputEvent, Key, MouseButton};
use crate::lifecycle::{LifecycleTimer, PointerLifecycle, PointerPhase};
use crate::scheduler::TimerQueue;
use crate::shapes::{Shape, ShapeId, ShapeKind, ShapeStyle};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::store::{DetachFromFrames, FrameLabeler, MemoryShapeStore, ShapeStore, StoreChange, StoreError};
use crate::tools::{BoxOutcome, ToolKind, ToolManager};
use kurbo::{Point, Size};
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

/// A frame grabbed by a select-tool press.
#[derive(Debug, Clone, Copy)]
struct FrameDrag {
    id: ShapeId,
    last: Point,
}

/// Interactive canvas over an in-memory store.
pub struct Canvas {
    config: CanvasConfig,
    store: MemoryShapeStore,
    camera: Camera,
    tools: ToolManager,
    lifecycle: PointerLifecycle,
    timers: TimerQueue<LifecycleTimer>,
    clock: Box<dyn Clock>,
    selection: Vec<ShapeId>,
    hovered: Option<ShapeId>,
    /// Strokes drawn while set are transient.
    pointer_mode: bool,
    viewport: Size,
    frame_drag: Option<FrameDrag>,
    changes: Rc<RefCell<VecDeque<StoreChange>>>,
}

impl Canvas {
    /// Create an empty canvas.
    pub fn new(config: CanvasConfig, clock: Box<dyn Clock>) -> Self {
        Self::with_store(config, clock, MemoryShapeStore::new())
    }

    /// Create a canvas over existing shapes. Call [`mount`](Self::mount)
    /// to start the pointer lifecycle.
    pub fn with_store(config: CanvasConfig, clock: Box<dyn Clock>, mut store: MemoryShapeStore) -> Self {
        store.register_hook(Box::new(FrameLabeler::new()));
        store.register_hook(Box::new(DetachFromFrames));

        let changes = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&changes);
        store.subscribe(Box::new(move |change: &StoreChange| {
            sink.borrow_mut().push_back(*change);
        }));

        let timers = match config.lifecycle.max_pending_timers {
            Some(capacity) => TimerQueue::with_capacity_limit(capacity),
            None => TimerQueue::new(),
        };
        let pointer_style = ShapeStyle::pointer(config.pointer_style.stroke_width, config.pointer_style.opacity);

        Self {
            tools: ToolManager::new(config.tools.min_box_size, pointer_style),
            lifecycle: PointerLifecycle::new(config.lifecycle.clone()),
            config,
            store,
            camera: Camera::new(),
            timers,
            clock,
            selection: Vec::new(),
            hovered: None,
            pointer_mode: false,
            viewport: Size::new(800.0, 600.0),
            frame_drag: None,
            changes,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn store(&self) -> &MemoryShapeStore {
        &self.store
    }

    /// Direct store access, as a remote peer or the host would have.
    ///
    /// Changes made here reach the lifecycle on the next canvas operation.
    pub fn store_mut(&mut self) -> &mut MemoryShapeStore {
        &mut self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn lifecycle(&self) -> &PointerLifecycle {
        &self.lifecycle
    }

    pub fn timers(&self) -> &TimerQueue<LifecycleTimer> {
        &self.timers
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool()
    }

    /// Id of the stroke being drawn.
    pub fn active_stroke(&self) -> Option<ShapeId> {
        self.tools.draw.active()
    }

    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    pub fn hovered(&self) -> Option<ShapeId> {
        self.hovered
    }

    pub fn pointer_mode(&self) -> bool {
        self.pointer_mode
    }

    pub fn set_pointer_mode(&mut self, enabled: bool) {
        if self.pointer_mode != enabled {
            log::debug!("Pointer mode {}", if enabled { "on" } else { "off" });
        }
        self.pointer_mode = enabled;
    }

    /// Set the viewport size in screen pixels.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_attached()
    }

    /// Start the pointer lifecycle, catching up on strokes already present.
    ///
    /// Returns how many strokes were picked up.
    pub fn mount(&mut self) -> usize {
        let now = self.clock.now();
        let picked_up = self.lifecycle.attach(&mut self.store, &mut self.timers, now);
        self.drain_changes();
        picked_up
    }

    /// Stop the lifecycle and abandon anything in progress.
    ///
    /// Pointer strokes stay in the store and are picked up again by the
    /// next [`mount`](Self::mount).
    pub fn unmount(&mut self) {
        self.tools.interrupt(&mut self.store);
        self.frame_drag = None;
        self.lifecycle.detach(&mut self.timers);
        self.drain_changes();
    }

    /// Start a stroke at `origin` (page space).
    pub fn begin_stroke(&mut self, origin: Point, transient: bool) -> Option<ShapeId> {
        let now = self.clock.now();
        let id = self.tools.draw.begin(&mut self.store, origin, transient, now);
        self.drain_changes();
        id
    }

    /// Append a point (page space) to the stroke being drawn.
    pub fn extend_stroke(&mut self, point: Point) {
        self.tools.draw.extend(&mut self.store, point);
        self.drain_changes();
    }

    /// Finish the stroke being drawn. Transient strokes start glowing.
    pub fn complete_stroke(&mut self) -> Option<ShapeId> {
        let now = self.clock.now();
        let id = self.tools.draw.complete(&mut self.store, now);
        if let Some(id) = id {
            let transient = self
                .store
                .get(id)
                .and_then(Shape::as_stroke)
                .is_some_and(|stroke| stroke.transient);
            if transient {
                self.lifecycle.observe(id, &mut self.store, &mut self.timers, now);
            }
        }
        self.drain_changes();
        id
    }

    /// Throw away the stroke being drawn.
    pub fn cancel_stroke(&mut self) {
        self.tools.draw.cancel(&mut self.store);
        self.drain_changes();
    }

    /// Switch tools, cancelling anything unfinished.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.tools.current_tool() {
            self.frame_drag = None;
        }
        self.tools.set_tool(tool, &mut self.store);
        self.drain_changes();
    }

    /// Fire every timer that is due.
    ///
    /// Timers fire in deadline order and each sees its own deadline as the
    /// current time, so a late tick produces the same result as timely ones.
    /// Returns the number of timers fired.
    pub fn tick(&mut self) -> usize {
        self.drain_changes();
        let now = self.clock.now();
        let mut fired = 0;
        while let Some(deadline) = self.timers.next_deadline().filter(|&d| d <= now) {
            let Some((handle, timer)) = self.timers.pop_due(deadline) else {
                break;
            };
            self.lifecycle
                .on_timer(handle, timer, &mut self.store, &mut self.timers, deadline);
            fired += 1;
            self.drain_changes();
        }
        fired
    }

    /// Dispatch one input event. Positions are in screen space.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { position, button } => {
                if button != MouseButton::Left {
                    log::debug!("Ignoring {:?} button press", button);
                    return;
                }
                self.pointer_down(self.camera.screen_to_page(position));
            }
            InputEvent::PointerMove { position } => self.pointer_move(self.camera.screen_to_page(position)),
            InputEvent::PointerUp { position, button } => {
                if button != MouseButton::Left {
                    return;
                }
                self.pointer_up(self.camera.screen_to_page(position));
            }
            InputEvent::KeyDown { key } => self.key_down(key),
            InputEvent::KeyUp { key } => {
                if key == Key::Space {
                    self.tools.boxes.set_space_held(false);
                }
            }
            InputEvent::Interrupt => {
                self.tools.interrupt(&mut self.store);
                self.frame_drag = None;
            }
            InputEvent::Tick => {
                self.tick();
            }
            InputEvent::SetTool { tool } => self.set_tool(tool),
            InputEvent::SetPointerMode { enabled } => self.set_pointer_mode(enabled),
            InputEvent::Hover { position } => {
                let page = self.camera.screen_to_page(position);
                self.hovered = self.store.shapes_at_point(page).first().copied();
            }
        }
        self.drain_changes();
    }

    /// Delete every selected shape. Returns how many were removed.
    pub fn delete_selection(&mut self) -> usize {
        let mut removed = 0;
        for id in std::mem::take(&mut self.selection) {
            match self.store.delete(id) {
                Ok(_) => removed += 1,
                Err(StoreError::NotFound(_)) => {}
                Err(e) => log::warn!("Failed to delete {}: {}", id, e),
            }
        }
        self.drain_changes();
        removed
    }

    /// Presentation of a pointer stroke right now.
    pub fn stroke_style(&self, id: ShapeId) -> Option<GlowStyle> {
        let style = &self.config.pointer_style;
        self.lifecycle
            .style_at(id, self.clock.now(), style.stroke_width, style.opacity)
    }

    /// Lifecycle phase of a pointer stroke.
    pub fn phase(&self, id: ShapeId) -> Option<PointerPhase> {
        self.lifecycle.phase(id)
    }

    /// Hover and selection flags of every frame.
    pub fn frame_presentation(&self) -> Vec<FrameAttrs> {
        let selected: HashSet<ShapeId> = self.selection.iter().copied().collect();
        frame_presentation(self.store.shapes_ordered(), self.hovered, &selected)
    }

    /// Clone every shape, back to front.
    pub fn snapshot(&self) -> Vec<Shape> {
        self.store.snapshot()
    }

    fn pointer_down(&mut self, page: Point) {
        match self.tools.current_tool() {
            ToolKind::Draw => {
                let transient = self.pointer_mode;
                self.begin_stroke(page, transient);
            }
            ToolKind::Rectangle | ToolKind::Frame => {
                if let Some(kind) = self.tools.current_tool().box_kind() {
                    self.tools.boxes.begin(&mut self.store, kind, page);
                }
            }
            ToolKind::Select => self.select_at(page),
        }
    }

    fn pointer_move(&mut self, page: Point) {
        match self.tools.current_tool() {
            ToolKind::Draw => self.extend_stroke(page),
            ToolKind::Rectangle | ToolKind::Frame => self.tools.boxes.drag(&mut self.store, page),
            ToolKind::Select => self.drag_frame(page),
        }
    }

    fn pointer_up(&mut self, page: Point) {
        match self.tools.current_tool() {
            ToolKind::Draw => {
                self.complete_stroke();
            }
            ToolKind::Rectangle | ToolKind::Frame => {
                self.tools.boxes.drag(&mut self.store, page);
                if let Some(BoxOutcome::Kept(id)) = self.tools.boxes.finish(&mut self.store) {
                    self.selection = vec![id];
                    self.set_tool(ToolKind::Select);
                }
            }
            ToolKind::Select => self.frame_drag = None,
        }
    }

    fn key_down(&mut self, key: Key) {
        if key == Key::Space {
            self.tools.boxes.set_space_held(true);
            return;
        }
        match ShortcutRegistry::lookup(key) {
            Some(ShortcutAction::SetTool(tool)) => self.set_tool(tool),
            Some(ShortcutAction::DeleteSelection) => {
                self.delete_selection();
            }
            Some(ShortcutAction::Cancel) => {
                self.tools.interrupt(&mut self.store);
                self.frame_drag = None;
                self.set_tool(ToolKind::Select);
            }
            None => log::trace!("No shortcut for {}", key),
        }
    }

    fn select_at(&mut self, page: Point) {
        let hits = self.store.shapes_at_point(page);
        let top = hits.first().and_then(|&id| self.store.get(id));
        let viewport = self.camera.viewport_page_bounds(self.viewport);
        let frames = self
            .store
            .shapes_ordered()
            .filter(|shape| shape.kind() == ShapeKind::Frame);

        if let Some(frame) = frame_to_capture(page, frames, top, viewport) {
            self.selection = vec![frame];
            self.frame_drag = Some(FrameDrag { id: frame, last: page });
            return;
        }
        self.selection = hits.first().copied().into_iter().collect();
    }

    fn drag_frame(&mut self, page: Point) {
        let Some(drag) = self.frame_drag.as_mut() else {
            return;
        };
        let delta = page - drag.last;
        drag.last = page;
        let id = drag.id;
        let result = self.store.update(id, &mut |shape| {
            if let Shape::Frame(frame) = shape {
                frame.position += delta;
            }
        });
        if let Err(e) = result {
            log::debug!("Releasing frame {}: {}", id, e);
            self.frame_drag = None;
        }
    }

    fn drain_changes(&mut self) {
        loop {
            let next = self.changes.borrow_mut().pop_front();
            let Some(change) = next else {
                break;
            };
            match change {
                StoreChange::Deleted(id) => {
                    self.lifecycle.forget(id, &mut self.timers);
                    self.selection.retain(|&selected| selected != id);
                    if self.hovered == Some(id) {
                        self.hovered = None;
                    }
                    if self.frame_drag.is_some_and(|drag| drag.id == id) {
                        self.frame_drag = None;
                    }
                }
                StoreChange::Created(id) | StoreChange::Updated(id) => {
                    if self.config.tools.observe_external_strokes && self.tools.draw.active() != Some(id) {
                        let now = self.clock.now();
                        self.lifecycle.observe(id, &mut self.store, &mut self.timers, now);
                    }
                }
            }
        }
    }
}
