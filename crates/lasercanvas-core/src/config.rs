//! Canvas configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Delay between completing a pointer stroke and starting its fade.
pub const DEFAULT_FADE_DELAY_MS: u64 = 3_000;

/// Length of the fade before a pointer stroke is deleted.
pub const DEFAULT_FADE_DURATION_MS: u64 = 2_000;

/// Boxes smaller than this (in either axis) are discarded on release.
pub const DEFAULT_MIN_BOX_SIZE: f64 = 5.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Timing of the pointer stroke lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub fade_delay_ms: u64,
    pub fade_duration_ms: u64,
    /// Upper bound on pending lifecycle timers (`None` = unbounded).
    pub max_pending_timers: Option<usize>,
}

impl LifecycleConfig {
    pub fn fade_delay(&self) -> Duration {
        Duration::from_millis(self.fade_delay_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            fade_delay_ms: DEFAULT_FADE_DELAY_MS,
            fade_duration_ms: DEFAULT_FADE_DURATION_MS,
            max_pending_timers: None,
        }
    }
}

/// Tool behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub min_box_size: f64,
    /// Also hand completed pointer strokes that arrive through store
    /// notifications (e.g. remote sync) to the lifecycle.
    pub observe_external_strokes: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            min_box_size: DEFAULT_MIN_BOX_SIZE,
            observe_external_strokes: false,
        }
    }
}

/// Look of pointer strokes while glowing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerStyleConfig {
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for PointerStyleConfig {
    fn default() -> Self {
        Self {
            stroke_width: 4.0,
            opacity: 0.9,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub lifecycle: LifecycleConfig,
    pub tools: ToolConfig,
    pub pointer_style: PointerStyleConfig,
}

impl CanvasConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CanvasConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lifecycle.fade_duration_ms == 0 {
            return Err(ConfigError::Invalid("fade_duration_ms must be positive".into()));
        }
        if self.tools.min_box_size < 0.0 {
            return Err(ConfigError::Invalid("min_box_size must not be negative".into()));
        }
        if !(0.0..=1.0).contains(&self.pointer_style.opacity) {
            return Err(ConfigError::Invalid("pointer opacity must be within 0..=1".into()));
        }
        if self.lifecycle.max_pending_timers == Some(0) {
            return Err(ConfigError::Invalid("max_pending_timers must be positive".into()));
        }
        Ok(())
    }
}
