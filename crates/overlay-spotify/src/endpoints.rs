//! Spotify endpoint implementations.

pub mod player;
pub mod token;
