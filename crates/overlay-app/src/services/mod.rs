//! Backend services integration.
//!
//! This module connects the UI to the Spotify session:
//! - Login and token lifecycle
//! - Now-playing polling and playback commands

pub mod browser;
pub mod spotify;

pub use spotify::SpotifySession;
