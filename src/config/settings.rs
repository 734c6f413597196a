//! Bot configuration loading from config.toml
//!
//! Every section and key is optional; anything left out falls back to the defaults
//! below, and a missing file means "all defaults".

use crate::core::menu::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Prefix for text commands (slash commands are always available)
    pub prefix: String,
    /// Reaction menu behaviour
    pub menu: MenuConfig,
    /// Codewars API endpoints
    pub codewars: CodewarsConfig,
    /// Epic Games Store feed settings
    pub egs: EgsConfig,
}

/// Reaction menu settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Items per page for list menus such as completed katas
    pub page_size: usize,
    /// Seconds to wait for a reaction before the menu is cleaned up
    pub timeout_secs: u64,
}

/// Codewars endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodewarsConfig {
    /// Base URL of the public REST API
    pub api_url: String,
    /// Base URL of the website, used for profile links and avatar scraping
    pub site_url: String,
}

/// Epic Games Store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EgsConfig {
    /// Free games promotion feed, without query string
    pub promotions_url: String,
    /// Locale passed to the feed
    pub locale: String,
    /// Country used when a user has not chosen one
    pub default_country: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            menu: MenuConfig::default(),
            codewars: CodewarsConfig::default(),
            egs: EgsConfig::default(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl MenuConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CodewarsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.codewars.com/api/v1".to_string(),
            site_url: "https://www.codewars.com".to_string(),
        }
    }
}

impl Default for EgsConfig {
    fn default() -> Self {
        Self {
            promotions_url:
                "https://store-site-backend-static.ak.epicgames.com/freeGamesPromotions"
                    .to_string(),
            locale: "en-US".to_string(),
            default_country: "TR".to_string(),
        }
    }
}

impl BotConfig {
    fn validate(self) -> Result<Self> {
        if self.menu.page_size == 0 {
            return Err(Error::Config {
                message: "menu.page_size must be at least 1".to_string(),
            });
        }
        if self.menu.timeout_secs == 0 {
            return Err(Error::Config {
                message: "menu.timeout_secs must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a value is out of range.
pub fn parse_config(contents: &str) -> Result<BotConfig> {
    let config: BotConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or does not parse.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    debug!("Attempting to load configuration from: {:?}", path.as_ref());
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads `path` if it exists, otherwise returns the defaults.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        info!(
            "No config file at {:?}, using default configuration",
            path.as_ref()
        );
        Ok(BotConfig::default())
    }
}

/// Loads configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<BotConfig> {
    load_or_default("config.toml")
}
