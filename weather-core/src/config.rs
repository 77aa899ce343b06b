use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "weather-lookup";
const APPLICATION: &str = "weather-lookup";

/// Server used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://127.0.0.1:8000"
/// include_forecast = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Weather server root; `DEFAULT_BASE_URL` when absent.
    pub base_url: Option<String>,

    /// Ask the server for the multi-day forecast by default.
    #[serde(default)]
    pub include_forecast: bool,
}

impl Config {
    /// Return the configured server root as a validated URL.
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        parse_base_url(raw)
    }

    pub fn set_base_url(&mut self, raw: &str) -> Result<()> {
        parse_base_url(raw)?;
        self.base_url = Some(raw.to_string());
        Ok(())
    }

    /// Replace the base URL when an override (flag or env) is given.
    pub fn with_base_url_override(mut self, raw: Option<String>) -> Result<Self> {
        if let Some(raw) = raw {
            self.set_base_url(&raw)?;
        }
        Ok(self)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
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
    pub fn save(&self) -> Result<PathBuf> {
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

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid base URL '{raw}'"))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("Base URL '{raw}' must use http or https");
    }
    if url.query().is_some() || url.fragment().is_some() {
        bail!("Base URL '{raw}' must not carry a query string or fragment");
    }

    Ok(url)
}
