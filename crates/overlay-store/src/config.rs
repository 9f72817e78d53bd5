//! Application configuration.

use std::path::{Path, PathBuf};

use overlay_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "config.json";

const PLACEHOLDER_CLIENT_ID: &str = "your_client_id_here";
const PLACEHOLDER_CLIENT_SECRET: &str = "your_client_secret_here";

/// Environment variable overriding `client_id`.
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
/// Environment variable overriding `client_secret`.
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";

/// Overlay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spotify application client ID.
    pub client_id: String,
    /// Spotify application client secret.
    pub client_secret: String,
    /// Redirect URI, must match the one registered in the developer dashboard.
    /// The callback listener binds the host, port and path it names.
    pub redirect_uri: String,
    /// Seconds between now-playing refreshes.
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: PLACEHOLDER_CLIENT_ID.to_string(),
            client_secret: PLACEHOLDER_CLIENT_SECRET.to_string(),
            redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
            poll_interval_secs: 2,
        }
    }
}

impl Config {
    /// Load `config.json` from the platform config directory.
    pub fn load() -> Result<Self> {
        let path = crate::default_config_dir()?.join(CONFIG_FILE);
        Self::load_from(&path)
    }

    /// Load from an explicit path, writing a template when the file is missing.
    ///
    /// `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` take precedence over the file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_or_create(path)?;
        config.apply_overrides(
            std::env::var(CLIENT_ID_ENV).ok(),
            std::env::var(CLIENT_SECRET_ENV).ok(),
        );
        Ok(config)
    }

    fn read_or_create(path: &Path) -> Result<Self> {
        debug!("Looking for config at: {}", path.display());

        if !path.exists() {
            warn!(
                "Config file not found! Creating default at {}",
                path.display()
            );
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            Error::Config(format!("Invalid config file {}: {e}", path.display()))
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_overrides(&mut self, client_id: Option<String>, client_secret: Option<String>) {
        if let Some(id) = client_id.filter(|v| !v.trim().is_empty()) {
            self.client_id = id;
        }
        if let Some(secret) = client_secret.filter(|v| !v.trim().is_empty()) {
            self.client_secret = secret;
        }
        self.client_id = self.client_id.trim().to_string();
        self.client_secret = self.client_secret.trim().to_string();
    }

    /// Check that credentials were filled in.
    pub fn validate(&self) -> Result<()> {
        let unset = |value: &str, placeholder: &str| value.is_empty() || value == placeholder;

        if unset(&self.client_id, PLACEHOLDER_CLIENT_ID)
            || unset(&self.client_secret, PLACEHOLDER_CLIENT_SECRET)
        {
            return Err(Error::Config(
                "Client ID or Secret is blank in config file".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Where the config lives by default.
    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::default_config_dir()?.join(CONFIG_FILE))
    }
}
