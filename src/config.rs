// Configuration handling for finger-paint
//
// Settings live in `<config dir>/finger-paint/config.toml` unless a path is
// passed on the command line. Every field is optional; anything missing
// falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::canvas::{DEFAULT_HISTORY_CAPACITY, EraseMode};
use crate::error::Error;
use crate::session::BrushSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// Flip frames horizontally so the preview behaves like a mirror.
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            mirror: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Borderless, on top, scaled to fit the screen.
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Finger Paint".into(),
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Mouse buttons stand in for hand poses.
    #[default]
    Pointer,
    /// External hand-landmark model speaking the line protocol on stdio.
    Subprocess,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub kind: DetectorKind,
    pub command: Vec<String>,
    pub min_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            kind: DetectorKind::Pointer,
            command: Vec::new(),
            min_confidence: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub history_capacity: usize,
    pub draw_thickness: u32,
    pub erase_thickness: u32,
    pub erase_mode: EraseMode,
    pub snapshot_path: PathBuf,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            draw_thickness: 8,
            erase_thickness: 40,
            erase_mode: EraseMode::Paint,
            snapshot_path: PathBuf::from("drawing.png"),
        }
    }
}

impl CanvasConfig {
    pub fn brushes(&self) -> BrushSettings {
        BrushSettings {
            draw_thickness: self.draw_thickness,
            erase_thickness: self.erase_thickness,
            erase_mode: self.erase_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub show_landmarks: bool,
    pub show_hud: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_landmarks: true,
            show_hud: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub window: WindowConfig,
    pub detector: DetectorConfig,
    pub canvas: CanvasConfig,
    pub overlay: OverlayConfig,
}

impl Config {
    /// Get the path to the configuration file
    pub fn default_path() -> PathBuf {
        let config_dir = if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("finger-paint")
        } else {
            PathBuf::from(".config/finger-paint")
        };

        config_dir.join("config.toml")
    }

    pub fn parse(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from `path`. A missing file yields defaults, which are written back
    /// so there is something to edit next time.
    pub fn load(path: &Path) -> Result<Self, Error> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::parse(&content)?;
                info!("Configuration loaded from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = Self::default();
                match config.save(path) {
                    Ok(()) => info!("Wrote default configuration to {}", path.display()),
                    Err(e) => warn!("Could not write default configuration: {e}"),
                }
                Ok(config)
            }
            Err(e) => Err(Error::Config(format!("Read {}: {e}", path.display()))),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::Config(format!("Create {}: {e}", parent.display())))?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| Error::Config(format!("Write {}: {e}", path.display())))
    }
}
