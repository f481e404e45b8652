//! Controller options.

use serde::{Deserialize, Serialize};

/// Everything about a ride except the callbacks.
///
/// Callbacks are attached on [`ElevatorBuilder`](super::ElevatorBuilder)
/// so the options stay plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevatorOptions {
    /// Element id to stop at. `None` means the top of the page.
    #[serde(default)]
    pub target_element: Option<String>,
    /// Ride duration in milliseconds. `None` (or 0) means distance-based.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Stop this far above the target
    #[serde(default)]
    pub vertical_padding: f64,
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    /// Custom ambient track. `None` keeps the bundled elevator music.
    #[serde(default)]
    pub ambient_audio_source: Option<String>,
    /// Custom completion chime. `None` keeps the bundled ding.
    #[serde(default)]
    pub completion_audio_source: Option<String>,
}

impl Default for ElevatorOptions {
    fn default() -> Self {
        Self {
            target_element: None,
            duration: None,
            vertical_padding: 0.0,
            audio_enabled: default_true(),
            ambient_audio_source: None,
            completion_audio_source: None,
        }
    }
}

impl ElevatorOptions {
    pub fn with_target(mut self, id: impl Into<String>) -> Self {
        self.target_element = Some(id.into());
        self
    }

    pub fn with_duration(mut self, ms: f64) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.vertical_padding = padding;
        self
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = enabled;
        self
    }
}

fn default_true() -> bool {
    true
}
