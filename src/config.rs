//! Application configuration loaded from TOML.
//!
//! ```toml
//! [window]
//! title = "softscene"
//! width = 800
//! height = 600
//!
//! [camera]
//! fov_degrees = 90.0
//! sensitivity = 0.000244140625
//! speed = 4.0
//! position = [0.0, -1000.0, 0.0]
//!
//! [[objects]]
//! mesh = "assets/meshes/tree.obj"
//! position = [500.0, 0.0, 0.0]
//! rotation = [1.5707964, 0.0, 0.0]
//! scale = 10.0
//! ```
//!
//! Every field is optional and falls back to [`Default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub objects: Vec<ObjectConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Frame cap; 0 disables it.
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "softscene".to_string(),
            width: 800,
            height: 600,
            target_fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
    /// World units per millisecond.
    pub speed: f32,
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            sensitivity: 1.0 / 4096.0,
            speed: 4.0,
            position: [0.0, -1000.0, 0.0],
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

/// A mesh placed directly under the scene root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    pub mesh: PathBuf,
    pub position: [f32; 3],
    /// Radians: pitch, roll, yaw.
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            mesh: PathBuf::new(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: 1.0,
        }
    }
}

impl AppConfig {
    /// Read a TOML file. Relative mesh paths are resolved against the
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;

        if let Some(dir) = path.parent() {
            for object in &mut config.objects {
                if object.mesh.is_relative() {
                    object.mesh = dir.join(&object.mesh);
                }
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
