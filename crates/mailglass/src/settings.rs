//! Persistent settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mailglass_core::Category;
use mailglass_gmail::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// Settings read from `settings.json` in the config directory.
///
/// Every field is optional in the file; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Messages per inbox page.
    pub page_size: u32,
    /// Tab shown when none is given on the command line.
    pub category: Category,
    /// `OAuth2` client ID used for token refresh.
    pub client_id: Option<String>,
    /// `OAuth2` client secret, if the client has one.
    pub client_secret: Option<String>,
    /// Gmail API root, for proxies and testing.
    pub api_base: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            category: Category::Primary,
            client_id: None,
            client_secret: None,
            api_base: None,
        }
    }
}

impl Settings {
    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailglass")
            .join("settings.json")
    }

    /// Loads settings from `path`, or defaults if the file does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }
}
