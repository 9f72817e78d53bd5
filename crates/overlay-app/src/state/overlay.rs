//! Overlay state for the UI.

use dioxus::prelude::*;
use overlay_core::{truncate_message, Error, NowPlaying, OverlayText};

/// What the overlay currently shows.
///
/// Written by the poller and the control tasks, read by the components.
#[derive(Clone, Copy)]
pub struct OverlayState {
    /// Title and subtitle lines.
    pub text: Signal<OverlayText>,
    /// Album art URL, `None` shows the placeholder.
    pub art_url: Signal<Option<String>>,
    /// Whether Spotify reports playback as running.
    pub is_playing: Signal<bool>,
    /// Whether a usable token is available.
    pub authenticated: Signal<bool>,
}

impl OverlayState {
    /// Create a new overlay state.
    pub fn new() -> Self {
        Self {
            text: Signal::new(OverlayText::connecting()),
            art_url: Signal::new(None),
            is_playing: Signal::new(false),
            authenticated: Signal::new(false),
        }
    }

    pub fn set_text(&mut self, text: OverlayText) {
        self.text.set(text);
    }

    /// Show a fresh now-playing snapshot.
    pub fn apply_now_playing(&mut self, now_playing: &NowPlaying) {
        self.text.set(OverlayText::from_now_playing(now_playing));
        self.is_playing.set(now_playing.is_playing);
        self.art_url.set(
            now_playing
                .track
                .as_ref()
                .and_then(|t| t.art_url())
                .map(ToString::to_string),
        );
    }

    /// Show a polling or login failure.
    pub fn apply_error(&mut self, error: &Error) {
        self.text.set(OverlayText::from_error(error));
        self.is_playing.set(false);
        self.art_url.set(None);
    }

    /// Show a failed playback command in the subtitle, keeping the title.
    pub fn apply_control_error(&mut self, error: &Error) {
        let message = control_error_message(error);
        self.text.write().subtitle = message;
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new()
    }
}

/// Subtitle shown when a playback command fails.
pub fn control_error_message(error: &Error) -> String {
    match error {
        Error::Unauthorized => "Error: 401".to_string(),
        Error::Forbidden => "Error: 403".to_string(),
        Error::RateLimited { .. } => "Error: 429".to_string(),
        Error::Api { status, .. } => format!("Error: {status}"),
        other => format!("Control error: {}", truncate_message(&other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_error_message() {
        assert_eq!(
            control_error_message(&Error::Api {
                status: 404,
                message: "No active device found".into()
            }),
            "Error: 404"
        );
        assert_eq!(control_error_message(&Error::Forbidden), "Error: 403");
        assert_eq!(
            control_error_message(&Error::Network("connection reset by peer".into())),
            "Control error: Network error: connection rese..."
        );
    }
}
