//! Application state management.

pub mod overlay;

pub use overlay::OverlayState;
