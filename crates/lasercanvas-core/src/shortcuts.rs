//! Keyboard shortcut registry.

use crate::input::Key;
use crate::tools::ToolKind;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SetTool(ToolKind),
    DeleteSelection,
    /// Abandon whatever is in progress and return to select.
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: Key,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: Key, action: ShortcutAction, description: &'static str) -> Self {
        Self {
            key,
            action,
            description,
        }
    }

    /// Format the key for display (e.g., "R", "Delete").
    pub fn format(&self) -> String {
        match self.key {
            Key::Char(c) => c.to_uppercase().to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Space => "Space".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::Backspace => "Backspace".to_string(),
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new(Key::Char('v'), ShortcutAction::SetTool(ToolKind::Select), "Select tool"),
            Shortcut::new(Key::Char('r'), ShortcutAction::SetTool(ToolKind::Rectangle), "Rectangle tool"),
            Shortcut::new(Key::Char('f'), ShortcutAction::SetTool(ToolKind::Frame), "Frame tool"),
            Shortcut::new(Key::Char('d'), ShortcutAction::SetTool(ToolKind::Draw), "Draw tool"),
            Shortcut::new(Key::Delete, ShortcutAction::DeleteSelection, "Delete selected shapes"),
            Shortcut::new(Key::Backspace, ShortcutAction::DeleteSelection, "Delete selected shapes"),
            Shortcut::new(Key::Escape, ShortcutAction::Cancel, "Cancel current action"),
        ]
    }

    /// Action bound to `key`. Letters match regardless of case.
    pub fn lookup(key: Key) -> Option<ShortcutAction> {
        let key = match key {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.key == key)
            .map(|shortcut| shortcut.action)
    }

    /// Render the shortcut table, one shortcut per line.
    pub fn table() -> String {
        Self::all()
            .iter()
            .map(|shortcut| format!("  {:12} {}\n", shortcut.format(), shortcut.description))
            .collect()
    }
}
