//! # overlay-store
//!
//! Local persistence for the Spotify overlay.
//!
//! This crate keeps:
//! - Application credentials (`config.json` in the platform config directory)
//! - OAuth tokens (`tokens.json` in the platform data directory)

pub mod config;
pub mod tokens;

use std::path::PathBuf;

use directories::ProjectDirs;
use overlay_core::{Error, Result};

pub use config::Config;
pub use tokens::TokenStore;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "karpen", "SpotifyOverlay")
        .ok_or_else(|| Error::Storage("Failed to determine home directory".to_string()))
}

/// Default directory holding `config.json`.
pub fn default_config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

/// Default directory holding `tokens.json`.
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}
