use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::{
    cache::DEFAULT_TTL_MINUTES,
    error::ForecastError,
    feed::VILLAGE_FORECAST_ENDPOINT,
    location::{Location, LocationDirectory},
};

/// Environment variable that takes precedence over the stored service key.
pub const SERVICE_KEY_ENV: &str = "KMA_SERVICE_KEY";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data portal service key for the village forecast API.
    #[serde(default)]
    pub service_key: Option<String>,

    /// Override of the forecast endpoint, mostly useful for testing.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,

    /// Example TOML:
    /// [locations.gangneung]
    /// nx = 92
    /// ny = 131
    /// label = "강릉"
    #[serde(default)]
    pub locations: BTreeMap<String, Location>,
}

fn default_cache_ttl_minutes() -> u32 {
    DEFAULT_TTL_MINUTES as u32
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_key: None,
            endpoint: None,
            cache_ttl_minutes: default_cache_ttl_minutes(),
            locations: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Service key from the environment, falling back to the stored one.
    pub fn resolved_service_key(&self) -> Result<String, ForecastError> {
        self.service_key_with(std::env::var(SERVICE_KEY_ENV).ok())
    }

    fn service_key_with(&self, env_key: Option<String>) -> Result<String, ForecastError> {
        env_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.service_key.clone().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                ForecastError::Configuration(format!(
                    "No forecast service key configured.\n\
                     Hint: run `forecast configure` or set {SERVICE_KEY_ENV}."
                ))
            })
    }

    pub fn set_service_key(&mut self, key: String) {
        self.service_key = Some(key);
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(VILLAGE_FORECAST_ENDPOINT)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.cache_ttl_minutes))
    }

    /// Built-in locations with configured entries layered on top.
    pub fn location_directory(&self) -> LocationDirectory {
        let mut directory = LocationDirectory::default();
        for (id, location) in &self.locations {
            directory.insert(id.as_str(), location.clone());
        }
        directory
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
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

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "village-forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_service_key_is_configuration_error() {
        let cfg = Config::default();
        let err = cfg.service_key_with(None).unwrap_err();

        assert!(matches!(err, ForecastError::Configuration(_)));
        assert!(err.to_string().contains("No forecast service key configured"));
    }

    #[test]
    fn environment_key_takes_precedence() {
        let mut cfg = Config::default();
        cfg.set_service_key("FILE_KEY".into());

        assert_eq!(cfg.service_key_with(None).unwrap(), "FILE_KEY");
        assert_eq!(cfg.service_key_with(Some("ENV_KEY".into())).unwrap(), "ENV_KEY");
        assert_eq!(cfg.service_key_with(Some("  ".into())).unwrap(), "FILE_KEY");
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.cache_ttl(), chrono::Duration::minutes(15));
        assert_eq!(cfg.endpoint(), VILLAGE_FORECAST_ENDPOINT);
    }

    #[test]
    fn parses_toml_with_locations() {
        let cfg = Config::from_toml(
            r#"
            service_key = "abc%2B"
            cache_ttl_minutes = 5

            [locations.gangneung]
            nx = 92
            ny = 131
            label = "강릉"
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.service_key.as_deref(), Some("abc%2B"));
        assert_eq!(cfg.cache_ttl(), chrono::Duration::minutes(5));

        let dir = cfg.location_directory();
        assert_eq!(dir.resolve("gangneung").unwrap().ny, 131);
        assert!(dir.resolve("seoul").is_ok());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = Config::from_toml("").expect("empty config should parse");
        assert!(cfg.service_key.is_none());
        assert_eq!(cfg.cache_ttl_minutes, 15);
    }

    #[test]
    fn toml_roundtrip_keeps_locations() {
        let mut cfg = Config::default();
        cfg.set_service_key("KEY".into());
        cfg.locations.insert(
            "home".into(),
            Location {
                nx: 1,
                ny: 2,
                label: "집".into(),
            },
        );

        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.locations.get("home"), cfg.locations.get("home"));
        assert_eq!(parsed.service_key.as_deref(), Some("KEY"));
    }
}
