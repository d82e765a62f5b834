use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::marquee::MarqueeConfig;
use crate::DeviceClass;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode config")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFitConfig {
    pub max_width_fraction: f32,
    pub min_width: f32,
    pub margin: f32,
}

impl Default for ImageFitConfig {
    fn default() -> Self {
        Self {
            max_width_fraction: 0.8,
            min_width: 180.0,
            margin: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub thumb_extent: f32,
    pub device: DeviceClass,
    pub default_locale: String,
    pub frame_rate: u32,
    pub marquee: MarqueeConfig,
    pub images: ImageFitConfig,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 1280.0,
            min_width: 640.0,
            min_height: 1280.0,
            thumb_extent: 200.0,
            device: DeviceClass::Pointer,
            default_locale: "en_GB".to_string(),
            frame_rate: 60,
            marquee: MarqueeConfig::default(),
            images: ImageFitConfig::default(),
        }
    }
}

impl ScreenConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&buf).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let payload = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        let mut file = File::create(&tmp).map_err(io_error)?;
        file.write_all(payload.as_bytes()).map_err(io_error)?;
        file.flush().map_err(io_error)?;
        fs::rename(&tmp, path).map_err(io_error)?;
        Ok(())
    }

    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = device;
        self
    }

    pub fn scene_size(&self) -> (f32, f32) {
        (self.width.max(self.min_width), self.height.max(self.min_height))
    }

    pub fn is_portrait(&self) -> bool {
        let (width, height) = self.scene_size();
        height > width
    }

    pub fn frame_seconds(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }
}
