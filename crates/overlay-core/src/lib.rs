//! # overlay-core
//!
//! Core types and error handling for the Spotify now-playing overlay.

pub mod display;
pub mod error;
pub mod types;

pub use display::{truncate_message, OverlayText};
pub use error::{Error, HttpError, Result};
pub use types::*;
