//! Settings management for the viewer
//!
//! Handles loading/saving of the viewer's XML settings file, stored in the
//! user config directory. Window geometry, pacing, overlay toggles, the saved
//! camera pose and the last opened model all persist across runs.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Viewer settings persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "MeshViewer")]
pub struct ViewerSettings {
    /// Window width
    #[serde(rename = "windowWidth", default = "default_window_width")]
    pub window_width: u32,

    /// Window height
    #[serde(rename = "windowHeight", default = "default_window_height")]
    pub window_height: u32,

    /// Whether VSYNC is enabled (syncs the render loop to display refresh)
    /// - true:  Fifo present mode, display controls timing
    /// - false: Immediate mode with manual FPS control
    #[serde(rename = "vsyncEnabled", default = "default_vsync")]
    pub vsync_enabled: bool,

    /// Target frame rate when vsync is off (24-240)
    #[serde(rename = "targetFps", default = "default_target_fps")]
    pub target_fps: u32,

    /// Whether to show the FPS readout in the menu bar
    #[serde(rename = "showFps", default = "default_on")]
    pub show_fps: bool,

    /// Whether to show the controls help overlay
    #[serde(rename = "showHelp", default = "default_on")]
    pub show_help: bool,

    /// Whether to show the reference grid
    #[serde(rename = "showGrid", default = "default_on")]
    pub show_grid: bool,

    // Camera pose (saved for persistence)
    /// Camera horizontal rotation (yaw) in radians
    #[serde(rename = "cameraYaw", default)]
    pub camera_yaw: f32,
    /// Camera vertical rotation (pitch) in radians
    #[serde(rename = "cameraPitch", default)]
    pub camera_pitch: f32,
    /// Camera distance from the orbit target
    #[serde(rename = "cameraDistance", default = "default_camera_distance")]
    pub camera_distance: f32,

    /// Path to the last opened model file
    #[serde(rename = "lastModelFile", default, skip_serializing_if = "Option::is_none")]
    pub last_model_file: Option<String>,
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_vsync() -> bool {
    true
}

fn default_target_fps() -> u32 {
    60
}

fn default_on() -> bool {
    true
}

fn default_camera_distance() -> f32 {
    8.0
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync_enabled: default_vsync(),
            target_fps: default_target_fps(),
            show_fps: default_on(),
            show_help: default_on(),
            show_grid: default_on(),
            camera_yaw: 0.0,
            camera_pitch: 0.0,
            camera_distance: default_camera_distance(),
            last_model_file: None,
        }
    }
}

impl ViewerSettings {
    /// Clamp FPS to valid range (24-240)
    pub fn clamp_fps(&mut self) {
        self.target_fps = self.target_fps.clamp(24, 240);
    }

    /// Get the settings file path in the user config directory
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("MeshViewer");
            p.push("settings.xml");
            p
        })
    }

    /// Load settings from the config directory, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = Self::settings_path() else {
            return Err(SettingsError::NoConfigDir);
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::Io)?;
        }
        self.save_to_file(&path)
    }

    /// Load settings from an XML file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(SettingsError::Io)?;
        let mut settings: Self = from_str(&contents).map_err(SettingsError::XmlParse)?;
        settings.clamp_fps();

        // Ensure sane minimums
        settings.window_width = settings.window_width.max(1);
        settings.window_height = settings.window_height.max(1);

        Ok(settings)
    }

    /// Save settings to an XML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        let xml = to_string(self).map_err(SettingsError::XmlWrite)?;
        let formatted = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml);
        fs::write(path, formatted).map_err(SettingsError::Io)?;
        Ok(())
    }

    /// Record the last opened model path
    pub fn set_last_model(&mut self, path: &Path) {
        self.last_model_file = Some(path.to_string_lossy().to_string());
    }

    /// Get the last opened model path if it still exists
    pub fn last_model(&self) -> Option<PathBuf> {
        self.last_model_file
            .as_ref()
            .map(PathBuf::from)
            .filter(|p| p.exists())
    }
}

/// Settings-related errors
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    XmlParse(quick_xml::DeError),
    XmlWrite(quick_xml::SeError),
    NoConfigDir,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::XmlParse(e) => write!(f, "XML parse error: {}", e),
            SettingsError::XmlWrite(e) => write!(f, "XML write error: {}", e),
            SettingsError::NoConfigDir => write!(f, "Could not find config directory"),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.window_width, 1280);
        assert_eq!(settings.window_height, 720);
        assert!(settings.vsync_enabled);
        assert_eq!(settings.target_fps, 60);
        assert!(settings.show_help);
        assert_eq!(settings.camera_distance, 8.0);
        assert!(settings.last_model_file.is_none());
    }

    #[test]
    fn test_fps_clamping() {
        let mut settings = ViewerSettings::default();
        settings.target_fps = 300;
        settings.clamp_fps();
        assert_eq!(settings.target_fps, 240);

        settings.target_fps = 10;
        settings.clamp_fps();
        assert_eq!(settings.target_fps, 24);
    }

    #[test]
    fn test_xml_round_trip() {
        let mut settings = ViewerSettings::default();
        settings.camera_yaw = 1.25;
        settings.show_grid = false;
        settings.last_model_file = Some("model.obj".to_string());

        let xml = to_string(&settings).unwrap();
        let restored: ViewerSettings = from_str(&xml).unwrap();
        assert_eq!(restored.camera_yaw, 1.25);
        assert!(!restored.show_grid);
        assert_eq!(restored.last_model_file.as_deref(), Some("model.obj"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let restored: ViewerSettings =
            from_str("<MeshViewer><windowWidth>800</windowWidth></MeshViewer>").unwrap();
        assert_eq!(restored.window_width, 800);
        assert_eq!(restored.window_height, 720);
        assert!(restored.vsync_enabled);
    }
}
