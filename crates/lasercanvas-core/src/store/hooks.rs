//! Bundled shape hooks.

use super::{HookContext, ShapeHook};
use crate::shapes::{SerializableColor, Shape, ShapeKind};

/// Labels handed out to new frames, in order.
pub const FRAME_LABELS: [&str; 20] = [
    "Boundless Space",
    "Blank Canvas",
    "Empty Expanse",
    "Open Field",
    "Clean Slate",
    "Fresh Start",
    "Infinite Plane",
    "Untitled Space",
    "New Horizon",
    "Blank Page",
    "Empty Stage",
    "Open Canvas",
    "Clear View",
    "Blank Sheet",
    "Fresh Canvas",
    "Open Space",
    "Empty Room",
    "New Page",
    "Clean Canvas",
    "Blank Slate",
];

/// Names every new frame from [`FRAME_LABELS`] and paints it white.
#[derive(Debug, Default)]
pub struct FrameLabeler {
    created: usize,
}

impl FrameLabeler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label the next frame will receive.
    pub fn next_label(&self) -> &'static str {
        FRAME_LABELS[self.created % FRAME_LABELS.len()]
    }
}

impl ShapeHook for FrameLabeler {
    fn name(&self) -> &'static str {
        "frame-labeler"
    }

    fn before_create(&mut self, shape: &mut Shape, _ctx: &HookContext<'_>) {
        if let Shape::Frame(frame) = shape {
            frame.name = self.next_label().to_string();
            frame.style.stroke_color = SerializableColor::white();
            self.created += 1;
        }
    }
}

/// Keeps strokes at page level so frames never clip them.
#[derive(Debug, Default)]
pub struct DetachFromFrames;

impl DetachFromFrames {
    fn detach(shape: &mut Shape, ctx: &HookContext<'_>) {
        if shape.kind() != ShapeKind::Stroke {
            return;
        }
        if let Some(parent) = shape.parent() {
            if ctx.kind_of(parent) == Some(ShapeKind::Frame) {
                log::debug!("Detaching stroke {} from frame {}", shape.id(), parent);
                shape.set_parent(None);
            }
        }
    }
}

impl ShapeHook for DetachFromFrames {
    fn name(&self) -> &'static str {
        "detach-from-frames"
    }

    fn before_create(&mut self, shape: &mut Shape, ctx: &HookContext<'_>) {
        Self::detach(shape, ctx);
    }

    fn before_update(&mut self, _prev: &Shape, next: &mut Shape, ctx: &HookContext<'_>) {
        Self::detach(next, ctx);
    }
}
