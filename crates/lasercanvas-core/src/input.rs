//! Input events delivered to the canvas.
//!
//! Positions are in screen coordinates; the canvas maps them through its
//! camera before anything touches the store.

use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Keys the canvas reacts to.
///
/// Serialized as a plain string: `"escape"`, `"space"`, `"delete"`,
/// `"backspace"`, or a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Escape,
    Space,
    Delete,
    Backspace,
    Char(char),
}

impl Key {
    /// Parse a key name, ignoring case for named keys.
    pub fn parse(name: &str) -> Option<Key> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(if c == ' ' { Key::Space } else { Key::Char(c) });
        }
        match name.to_ascii_lowercase().as_str() {
            "escape" | "esc" => Some(Key::Escape),
            "space" => Some(Key::Space),
            "delete" | "del" => Some(Key::Delete),
            "backspace" => Some(Key::Backspace),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Escape => f.write_str("escape"),
            Key::Space => f.write_str("space"),
            Key::Delete => f.write_str("delete"),
            Key::Backspace => f.write_str("backspace"),
            Key::Char(c) => write!(f, "{}", c),
        }
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Key::parse(&name).ok_or_else(|| format!("unknown key {:?}", name))
    }
}

/// One event for [`Canvas::handle_event`](crate::canvas::Canvas::handle_event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    KeyDown {
        key: Key,
    },
    KeyUp {
        key: Key,
    },
    /// The host took input away (blur, context menu).
    Interrupt,
    /// Fire due timers without any other input.
    Tick,
    SetTool {
        tool: ToolKind,
    },
    /// Toggle pointer mode: strokes drawn while on are transient.
    SetPointerMode {
        enabled: bool,
    },
    /// Pointer moved with no button held.
    Hover {
        position: Point,
    },
}
