//! Game settings
//!
//! Read once at startup. The browser build takes an optional JSON blob from
//! the canvas `data-config` attribute; nothing is written back.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::KeyBindings;
use crate::tuning::Tuning;

/// Canvas attribute holding the JSON config
pub const CONFIG_ATTRIBUTE: &str = "data-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
    /// Reset the game on the first collision of a frame instead of only reporting it
    pub reset_on_collision: bool,
    /// Log measured FPS periodically
    pub show_fps: bool,
    pub key_bindings: KeyBindings,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            reset_on_collision: false,
            show_fps: false,
            key_bindings: KeyBindings::default(),
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.tuning = settings.tuning.validated();
        Ok(settings)
    }

    /// Read settings from the canvas (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load(canvas: &web_sys::HtmlCanvasElement) -> Self {
        let Some(json) = canvas.get_attribute(CONFIG_ATTRIBUTE) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", CONFIG_ATTRIBUTE);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", CONFIG_ATTRIBUTE, e);
                Self::default()
            }
        }
    }
}
