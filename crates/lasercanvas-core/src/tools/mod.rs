//! Tool system for the canvas.

mod box_tool;

pub use box_tool::{BoxKind, BoxOutcome, BoxSession};

use crate::session::DrawSession;
use crate::shapes::ShapeStyle;
use crate::store::ShapeStore;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Frame,
    Rectangle,
    Draw,
}

impl ToolKind {
    /// Shape a box session creates for this tool.
    pub fn box_kind(self) -> Option<BoxKind> {
        match self {
            ToolKind::Rectangle => Some(BoxKind::Rectangle),
            ToolKind::Frame => Some(BoxKind::Frame),
            ToolKind::Select | ToolKind::Draw => None,
        }
    }
}

/// Manages the current tool and its in-progress sessions.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    current_tool: ToolKind,
    /// Freehand stroke session (draw tool).
    pub draw: DrawSession,
    /// Rectangle/frame session.
    pub boxes: BoxSession,
}

impl ToolManager {
    /// Create a tool manager with the select tool active.
    pub fn new(min_box_size: f64, pointer_style: ShapeStyle) -> Self {
        Self {
            current_tool: ToolKind::default(),
            draw: DrawSession::with_pointer_style(pointer_style),
            boxes: BoxSession::new(min_box_size),
        }
    }

    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    /// Switch tools. Anything unfinished under the old tool is cancelled.
    pub fn set_tool<S: ShapeStore + ?Sized>(&mut self, tool: ToolKind, store: &mut S) {
        if tool != self.current_tool {
            self.interrupt(store);
            log::debug!("Tool {:?} -> {:?}", self.current_tool, tool);
        }
        self.current_tool = tool;
    }

    /// Cancel every in-progress session.
    pub fn interrupt<S: ShapeStore + ?Sized>(&mut self, store: &mut S) {
        self.draw.interrupt(store);
        self.boxes.cancel(store);
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        self.draw.is_active() || self.boxes.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::store::MemoryShapeStore;
    use kurbo::Point;

    fn manager() -> ToolManager {
        ToolManager::new(5.0, ShapeStyle::pointer(4.0, 0.9))
    }

    #[test]
    fn test_tool_selection() {
        let mut store = MemoryShapeStore::new();
        let mut tm = manager();
        assert_eq!(tm.current_tool(), ToolKind::Select);

        tm.set_tool(ToolKind::Rectangle, &mut store);
        assert_eq!(tm.current_tool(), ToolKind::Rectangle);
        assert_eq!(tm.current_tool().box_kind(), Some(BoxKind::Rectangle));
        assert_eq!(ToolKind::Draw.box_kind(), None);
    }

    #[test]
    fn test_switch_cancels_stroke() {
        let mut store = MemoryShapeStore::new();
        let mut tm = manager();
        tm.set_tool(ToolKind::Draw, &mut store);
        let id = tm.draw.begin(&mut store, Point::ZERO, false, Timestamp(0)).unwrap();
        assert!(tm.is_active());

        tm.set_tool(ToolKind::Select, &mut store);
        assert!(!tm.is_active());
        assert!(!store.contains(id));
    }

    #[test]
    fn test_reselecting_same_tool_keeps_session() {
        let mut store = MemoryShapeStore::new();
        let mut tm = manager();
        tm.set_tool(ToolKind::Frame, &mut store);
        let id = tm.boxes.begin(&mut store, BoxKind::Frame, Point::ZERO).unwrap();
        tm.set_tool(ToolKind::Frame, &mut store);
        assert_eq!(tm.boxes.active(), Some(id));
    }

    #[test]
    fn test_tool_kind_serde() {
        assert_eq!(serde_json::to_string(&ToolKind::Rectangle).unwrap(), "\"rectangle\"");
        let tool: ToolKind = serde_json::from_str("\"draw\"").unwrap();
        assert_eq!(tool, ToolKind::Draw);
    }
}
