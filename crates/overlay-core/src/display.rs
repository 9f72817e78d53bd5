//! The two lines of text the overlay shows.

use crate::{Error, HttpError, NowPlaying};

/// Longest subtitle shown before it is cut.
const MAX_MESSAGE_CHARS: usize = 30;

/// Title and subtitle shown next to the album art.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayText {
    pub title: String,
    pub subtitle: String,
}

impl OverlayText {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }

    pub fn connecting() -> Self {
        Self::new("Connecting to Spotify...", "")
    }

    pub fn connected() -> Self {
        Self::new("Connected!", "Ready to control Spotify")
    }

    pub fn not_authenticated() -> Self {
        Self::new("Not Authenticated", "Please login first")
    }

    pub fn from_now_playing(now_playing: &NowPlaying) -> Self {
        now_playing.track.as_ref().map_or_else(
            || Self::new("Not Playing", ""),
            |track| Self::new(track.title.clone(), track.artists_display()),
        )
    }

    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Unauthorized => Self::new("Auth Error", "Invalid or expired token"),
            Error::Forbidden => Self::new("Auth Error", "Insufficient permissions"),
            Error::RateLimited { .. } => Self::new("Error", "Rate limit exceeded"),
            Error::Api { status, message } => Self::new(
                "API Error",
                truncate_message(&format!("Status: {status}, {message}")),
            ),
            Error::Parse(_) | Error::Json(_) => Self::new("Error", "Could not parse track info"),
            Error::Http(HttpError::Timeout) => Self::new("Network Error", "Request timeout"),
            Error::Http(HttpError::ConnectionFailed(msg)) | Error::Network(msg) => {
                Self::new("Network Error", truncate_message(msg))
            }
            Error::Http(other) => Self::new("Network Error", truncate_message(&other.to_string())),
            Error::Auth(msg) => Self::new("Auth Error", truncate_message(msg)),
            Error::Config(msg) => Self::new("Config Error", truncate_message(msg)),
            other => Self::new("Update Error", truncate_message(&other.to_string())),
        }
    }
}

/// Cut a message to 30 characters, marking the cut with "...".
pub fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut cut: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
    cut.push_str("...");
    cut
}
