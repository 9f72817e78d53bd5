//! # overlay-spotify
//!
//! Spotify Web API client for the now-playing overlay.
//!
//! This crate covers the network side of the application: the OAuth 2.0
//! authorization-code flow (including the local listener that captures the
//! redirect), reading the currently playing item and sending playback
//! commands to the active device.

pub mod auth;
pub mod callback;
pub mod client;
pub mod endpoints;
pub mod parser;
pub mod types;

pub use auth::{authorize_url, AuthConfig, DEFAULT_REDIRECT_URI, DEFAULT_SCOPES};
pub use callback::{listen_target, parse_callback_query, CallbackParams, CallbackServer};
pub use client::SpotifyClient;
