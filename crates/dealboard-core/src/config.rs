use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{BoardError, BoardResult};

pub const DEFAULT_POSITION_STEP: i32 = 1000;
pub const DEFAULT_POSITION_CEILING: i32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gap left between neighbouring card positions.
    #[serde(default = "default_position_step")]
    pub position_step: i32,
    /// Largest position ever handed out.
    #[serde(default = "default_position_ceiling")]
    pub position_ceiling: i32,
    /// Clamp drop indices past the end of a bucket to an append.
    #[serde(default = "default_clamp_destination")]
    pub clamp_destination: bool,
    /// Renumber a bucket once its positions start colliding at the ceiling.
    #[serde(default)]
    pub auto_compact: bool,
}

fn default_position_step() -> i32 {
    DEFAULT_POSITION_STEP
}

fn default_position_ceiling() -> i32 {
    DEFAULT_POSITION_CEILING
}

fn default_clamp_destination() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            position_step: DEFAULT_POSITION_STEP,
            position_ceiling: DEFAULT_POSITION_CEILING,
            clamp_destination: true,
            auto_compact: false,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/dealboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("dealboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("dealboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load from the platform config path, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(config) = Self::load_from(&config_path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> BoardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| BoardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BoardResult<()> {
        if self.position_step <= 0 {
            return Err(BoardError::Config(format!(
                "position_step must be positive, got {}",
                self.position_step
            )));
        }
        if self.position_ceiling < self.position_step {
            return Err(BoardError::Config(format!(
                "position_ceiling ({}) must be at least position_step ({})",
                self.position_ceiling, self.position_step
            )));
        }
        Ok(())
    }
}
