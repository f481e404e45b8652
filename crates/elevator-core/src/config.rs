use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::elevator::ElevatorOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub elevator: ElevatorConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Where the elevator goes and how long it takes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElevatorConfig {
    /// Id of the element to stop at. Unset means the top of the page.
    #[serde(default)]
    pub target_element: Option<String>,
    /// Fixed animation duration in milliseconds. Unset or 0 means distance-based.
    #[serde(default)]
    pub duration_ms: Option<f64>,
    /// Stop this far above the target
    #[serde(default)]
    pub vertical_padding: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Play elevator music and the arrival ding
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Custom ambient track (path or file:// URL)
    #[serde(default)]
    pub ambient_source: Option<String>,
    /// Custom completion chime (path or file:// URL)
    #[serde(default)]
    pub completion_source: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ambient_source: None,
            completion_source: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while nothing is animating
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while an elevation is in flight
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-d>" (Ctrl+d), "G" (Shift+g), "<CR>" (Enter), "<Esc>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the demo
    #[serde(default = "default_key_quit")]
    pub quit: String,
    /// Scroll one line down
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    /// Scroll one line up
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    /// Scroll half page down
    #[serde(default = "default_key_scroll_half_down")]
    pub scroll_half_down: String,
    /// Scroll half page up
    #[serde(default = "default_key_scroll_half_up")]
    pub scroll_half_up: String,
    /// Jump to the bottom of the page
    #[serde(default = "default_key_jump_to_bottom")]
    pub jump_to_bottom: String,
    /// Ride the elevator
    #[serde(default = "default_key_elevate")]
    pub elevate: String,
    /// Cycle the elevator target (top, then each section)
    #[serde(default = "default_key_cycle_target")]
    pub cycle_target: String,
    /// Toggle audio on/off
    #[serde(default = "default_key_toggle_audio")]
    pub toggle_audio: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            scroll_half_down: default_key_scroll_half_down(),
            scroll_half_up: default_key_scroll_half_up(),
            jump_to_bottom: default_key_jump_to_bottom(),
            elevate: default_key_elevate(),
            cycle_target: default_key_cycle_target(),
            toggle_audio: default_key_toggle_audio(),
        }
    }
}

// Default keymap values (Vim-style notation)
fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_scroll_half_down() -> String { "<C-d>".to_string() }
fn default_key_scroll_half_up() -> String { "<C-u>".to_string() }
fn default_key_jump_to_bottom() -> String { "G".to_string() }
fn default_key_elevate() -> String { "e".to_string() }
fn default_key_cycle_target() -> String { "t".to_string() }
fn default_key_toggle_audio() -> String { "a".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("elevator")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, defaulting when it does not exist
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject numbers a ride cannot use
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(duration) = self.elevator.duration_ms {
            if !duration.is_finite() || duration < 0.0 {
                return Err(crate::Error::Config(format!(
                    "duration_ms must be a finite, non-negative number of milliseconds, got {}",
                    duration
                )));
            }
        }
        if !self.elevator.vertical_padding.is_finite() {
            return Err(crate::Error::Config(format!(
                "vertical_padding must be finite, got {}",
                self.elevator.vertical_padding
            )));
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/elevator/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("elevator")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the log file path used by the terminal demo
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("elevator.log")
    }

    /// Flatten the `[elevator]` and `[audio]` sections into controller options
    pub fn elevator_options(&self) -> ElevatorOptions {
        ElevatorOptions {
            target_element: self.elevator.target_element.clone(),
            duration: self.elevator.duration_ms,
            vertical_padding: self.elevator.vertical_padding,
            audio_enabled: self.audio.enabled,
            ambient_audio_source: self.audio.ambient_source.as_deref().map(expand_source),
            completion_audio_source: self.audio.completion_source.as_deref().map(expand_source),
        }
    }
}

/// Sources may be written as `~/sounds/x.mp3`; URLs pass through untouched
fn expand_source(source: &str) -> String {
    if source.starts_with('~') {
        expand_tilde(std::path::Path::new(source))
            .to_string_lossy()
            .into_owned()
    } else {
        source.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert!(config.audio.enabled);
        assert_eq!(config.elevator.target_element, None);
        assert_eq!(config.elevator.duration_ms, None);
        assert_eq!(config.elevator.vertical_padding, 0.0);
        assert_eq!(config.ui.animation_fps, 60);
        assert_eq!(config.keymap.elevate, "e");
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [elevator]
            target_element = "section-3"
            vertical_padding = 2.0

            [audio]
            enabled = false
            "#,
        )
        .unwrap();

        let options = config.elevator_options();
        assert_eq!(options.target_element.as_deref(), Some("section-3"));
        assert_eq!(options.vertical_padding, 2.0);
        assert!(!options.audio_enabled);
        assert_eq!(options.duration, None);
        assert_eq!(config.keymap.quit, "q");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[audio]\nenabled = \"maybe\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_unusable_duration_is_config_error() {
        for value in ["inf", "-inf", "nan", "-250.0"] {
            let text = format!("[elevator]\nduration_ms = {}", value);
            let err = AppConfig::from_toml(&text).unwrap_err();
            assert!(matches!(err, crate::Error::Config(_)), "{}", value);
        }
        assert!(AppConfig::from_toml("[elevator]\nduration_ms = 0.0").is_ok());
    }

    #[test]
    fn test_infinite_padding_is_rejected() {
        let mut config = AppConfig::default();
        config.elevator.vertical_padding = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_survives_save_format() {
        let mut config = AppConfig::default();
        config.elevator.duration_ms = Some(5000.0);
        config.audio.ambient_source = Some("/tmp/lift.mp3".into());

        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.elevator.duration_ms, Some(5000.0));
        assert_eq!(parsed.audio.ambient_source.as_deref(), Some("/tmp/lift.mp3"));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("elevator-config-does-not-exist.toml");
        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.audio.enabled);
    }
}
