use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::{Location, UnitSystem};

/// Environment variable that overrides `api_key` from the config file.
pub const API_KEY_ENV: &str = "AERO_WEATHER_API_KEY";

/// Value shipped in sample configs; treated the same as no key at all.
const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "imperial"
///
/// [default_location]
/// id = "51.5074_-0.1278"
/// name = "London"
/// fullName = "London, GB"
/// lat = 51.5074
/// lon = -0.1278
/// country = "GB"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap API key. Absent means mock-data mode.
    pub api_key: Option<String>,
    pub units: UnitSystem,
    pub base_url: String,
    pub geo_base_url: String,
    pub ip_geo_url: String,
    pub timeout_secs: u64,
    pub geolocation_timeout_secs: u64,
    pub search_debounce_ms: u64,
    /// Whether `startup` may try to detect the current location.
    pub geolocation: bool,
    /// Shown when nothing better is known.
    pub default_location: Location,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: UnitSystem::default(),
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            geo_base_url: "https://api.openweathermap.org/geo/1.0".to_string(),
            ip_geo_url: "http://ip-api.com/json".to_string(),
            timeout_secs: 10,
            geolocation_timeout_secs: 5,
            search_debounce_ms: 500,
            geolocation: true,
            default_location: Location::new("San Francisco", 37.7749, -122.4194, "US", None),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "aero-weather", "aero-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the saved-locations file.
    pub fn locations_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("locations.json"))
    }

    /// Replace the file's key with the environment's, when the latter is set.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.and_then(usable_key) {
            self.api_key = Some(key);
        }
        self
    }

    /// The key to use against the provider, or `None` for mock-data mode.
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
    }

    pub fn set_api_key(&mut self, key: String) {
        self.api_key = usable_key(key);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn usable_key(key: String) -> Option<String> {
    let key = key.trim();
    if key.is_empty() || key == PLACEHOLDER_API_KEY { None } else { Some(key.to_string()) }
}
