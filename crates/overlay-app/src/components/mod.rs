//! Overlay UI components.

mod album_art;
mod controls;
mod overlay;

pub use album_art::AlbumArt;
pub use controls::Controls;
pub use overlay::Overlay;
