//! Scripted input replay on a manual clock.

use anyhow::Context;
use lasercanvas_core::{Canvas, CanvasConfig, InputEvent, ManualClock, MemoryShapeStore, Shape, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// One input event and when it happens, relative to the script start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    pub event: InputEvent,
}

/// A replay script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    /// Absolute clock value the script starts at. Timestamps in a shapes
    /// file are on the same clock.
    #[serde(default)]
    pub start_ms: u64,
    pub events: Vec<ScriptStep>,
    /// Offset from the script start to advance the clock to once every
    /// event has been fed. Offsets earlier than the last event are ignored,
    /// since the clock never runs backwards.
    #[serde(default)]
    pub end_ms: Option<u64>,
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading script {:?}", path))?;
        serde_json::from_str(&json).with_context(|| format!("parsing script {:?}", path))
    }
}

/// Load a JSON array of shapes.
pub fn load_shapes(path: &Path) -> anyhow::Result<Vec<Shape>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading shapes {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("parsing shapes {:?}", path))
}

/// What a replay produced.
#[derive(Debug)]
pub struct ReplayOutcome {
    /// Shapes left in the store, back to front.
    pub shapes: Vec<Shape>,
    /// Pointer strokes picked up when the canvas mounted.
    pub caught_up: usize,
    /// Lifecycle timers fired.
    pub timers_fired: usize,
}

/// Mount a canvas over `initial` shapes and feed it the script.
pub fn run(config: CanvasConfig, initial: Vec<Shape>, script: &Script) -> ReplayOutcome {
    let start = Timestamp::from_millis(script.start_ms);
    let clock = ManualClock::new(start);
    let store = MemoryShapeStore::from_shapes(initial);
    let mut canvas = Canvas::with_store(config, Box::new(clock.clone()), store);

    let caught_up = canvas.mount();
    let mut timers_fired = 0;
    for step in &script.events {
        clock.set(start.saturating_add(Duration::from_millis(step.at_ms)));
        timers_fired += canvas.tick();
        log::debug!("t+{}ms {:?}", step.at_ms, step.event);
        canvas.handle_event(step.event.clone());
    }
    if let Some(end_ms) = script.end_ms {
        let end = start.saturating_add(Duration::from_millis(end_ms));
        if end < canvas.now() {
            log::warn!("Script end t+{}ms is before its last event, ignoring", end_ms);
        } else {
            clock.set(end);
            timers_fired += canvas.tick();
        }
    }

    log::debug!("Replay finished at {}", canvas.now());
    ReplayOutcome {
        shapes: canvas.snapshot(),
        caught_up,
        timers_fired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use lasercanvas_core::{MouseButton, Stroke, ToolKind};
    use std::io::Write;

    fn pointer_script(end_ms: u64) -> Script {
        let at = |at_ms, event| ScriptStep { at_ms, event };
        Script {
            start_ms: 0,
            events: vec![
                at(0, InputEvent::SetPointerMode { enabled: true }),
                at(0, InputEvent::SetTool { tool: ToolKind::Draw }),
                at(
                    0,
                    InputEvent::PointerDown {
                        position: Point::new(10.0, 10.0),
                        button: MouseButton::Left,
                    },
                ),
                at(50, InputEvent::PointerMove { position: Point::new(20.0, 15.0) }),
                at(
                    100,
                    InputEvent::PointerUp {
                        position: Point::new(30.0, 20.0),
                        button: MouseButton::Left,
                    },
                ),
            ],
            end_ms: Some(end_ms),
        }
    }

    #[test]
    fn test_pointer_stroke_survives_until_deadline() {
        let outcome = run(CanvasConfig::default(), Vec::new(), &pointer_script(5_099));
        assert_eq!(outcome.shapes.len(), 1);
        assert_eq!(outcome.timers_fired, 1);
        let stroke = outcome.shapes[0].as_stroke().unwrap();
        assert!(stroke.complete && stroke.transient);
        assert_eq!(stroke.len(), 3);
    }

    #[test]
    fn test_pointer_stroke_gone_after_deadline() {
        let outcome = run(CanvasConfig::default(), Vec::new(), &pointer_script(5_100));
        assert!(outcome.shapes.is_empty());
        assert_eq!(outcome.timers_fired, 2);
    }

    #[test]
    fn test_end_offset_counts_from_start() {
        let mut script = pointer_script(5_100);
        script.start_ms = 20_000;
        let outcome = run(CanvasConfig::default(), Vec::new(), &script);
        assert!(outcome.shapes.is_empty());

        // Before the last event: the clock stays where the events left it.
        let outcome = run(CanvasConfig::default(), Vec::new(), &pointer_script(50));
        assert_eq!(outcome.shapes.len(), 1);
        assert_eq!(outcome.timers_fired, 0);
    }

    #[test]
    fn test_catch_up_from_shapes_file() {
        let mut stale = Stroke::begin(Point::ZERO, true, Timestamp(6_000));
        stale.complete = true;
        let ink = Stroke::begin(Point::ZERO, false, Timestamp(0));
        let shapes = vec![Shape::Stroke(stale), Shape::Stroke(ink)];

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&shapes).unwrap().as_bytes()).unwrap();
        let loaded = load_shapes(file.path()).unwrap();

        let script = Script {
            start_ms: 10_000,
            events: Vec::new(),
            end_ms: Some(2_000),
        };
        let outcome = run(CanvasConfig::default(), loaded, &script);
        assert_eq!(outcome.caught_up, 1);
        assert_eq!(outcome.shapes.len(), 1);
        assert!(!outcome.shapes[0].as_stroke().unwrap().transient);
    }

    #[test]
    fn test_script_json() {
        let json = r#"{
            "events": [
                {"at_ms": 0, "event": {"type": "key_down", "key": "d"}},
                {"at_ms": 10, "event": {"type": "pointer_down", "position": {"x": 1.0, "y": 1.0}}}
            ]
        }"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let script = Script::load(file.path()).unwrap();
        assert_eq!(script.start_ms, 0);
        assert_eq!(script.end_ms, None);
        assert_eq!(script.events.len(), 2);

        let outcome = run(CanvasConfig::default(), Vec::new(), &script);
        assert_eq!(outcome.shapes.len(), 1);
        assert!(!outcome.shapes[0].as_stroke().unwrap().complete);
    }

    #[test]
    fn test_missing_script_reports_path() {
        let err = Script::load(Path::new("/nonexistent/script.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("script.json"));
    }
}
