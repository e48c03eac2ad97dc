//! LaserCanvas Core Library
//!
//! Drawing sessions and the glow/fade/delete lifecycle of transient
//! "laser pointer" strokes, over a pluggable shape store and timer queue.

pub mod camera;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod frames;
pub mod glow;
pub mod input;
pub mod lifecycle;
pub mod scheduler;
pub mod session;
pub mod shapes;
pub mod shortcuts;
pub mod store;
pub mod tools;

pub use camera::Camera;
pub use canvas::Canvas;
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::{CanvasConfig, ConfigError, LifecycleConfig};
pub use frames::{FrameAttrs, frame_presentation, frame_to_capture};
pub use glow::{GlowStyle, glow_style};
pub use input::{InputEvent, Key, MouseButton};
pub use lifecycle::{LifecycleTimer, PointerLifecycle, PointerPhase};
pub use scheduler::{Scheduler, SchedulerError, TimerHandle, TimerQueue};
pub use session::DrawSession;
pub use shapes::{Frame, Rectangle, Shape, ShapeId, ShapeKind, ShapeStyle, Stroke};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
pub use store::{MemoryShapeStore, ShapeHook, ShapeStore, StoreChange, StoreError};
pub use tools::{BoxKind, BoxOutcome, BoxSession, ToolKind, ToolManager};
