use egui::Vec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::LapDashError;
use crate::dashboard::ChartOptions;
use crate::provider::openf1::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_S};
use crate::session::SessionKey;

use super::style::DEFAULT_STYLESHEET_PATH;

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowSize {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1400.,
            height: 900.,
        }
    }
}

impl From<WindowSize> for Vec2 {
    fn from(value: WindowSize) -> Self {
        Vec2::new(value.width, value.height)
    }
}

impl From<Vec2> for WindowSize {
    fn from(value: Vec2) -> Self {
        Self {
            width: value.x,
            height: value.y,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_s: u64,
    pub use_cache: bool,
    pub stylesheet_path: PathBuf,
    pub years: Vec<i32>,
    pub races: Vec<String>,
    pub last_session: SessionKey,
    pub chart_options: ChartOptions,
    pub window_size: WindowSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_s: DEFAULT_TIMEOUT_S,
            use_cache: true,
            stylesheet_path: PathBuf::from(DEFAULT_STYLESHEET_PATH),
            years: (2023..=2025).collect(),
            races: ["Monza", "Spa", "Silverstone", "Monaco"]
                .iter()
                .map(|r| r.to_string())
                .collect(),
            last_session: SessionKey::default(),
            chart_options: ChartOptions::default(),
            window_size: WindowSize::default(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, LapDashError> {
        Ok(dirs::config_dir()
            .ok_or(LapDashError::NoConfigDir)?
            .join("lapdash")
            .join(CONFIG_FILE_NAME))
    }

    pub fn from_local_file() -> Result<Option<Self>, LapDashError> {
        Self::from_file(&Self::default_path()?)
    }

    pub fn from_file(config_path: &Path) -> Result<Option<Self>, LapDashError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file =
            std::fs::File::open(config_path).map_err(|e| LapDashError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| LapDashError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), LapDashError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), LapDashError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| LapDashError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| LapDashError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| LapDashError::ConfigSerializeError { source: e })
    }
}
