//! Core domain types for the overlay.

pub mod common;
pub mod playback;
pub mod tokens;
pub mod track;

pub use common::*;
pub use playback::{CommandMethod, NowPlaying, PlaybackCommand};
pub use tokens::Tokens;
pub use track::{AlbumImage, Track};
